//! metis_{lm,n}_img_flat: master flat normalizado.
//!
//! Flats de una sola fuente (LAMP o TWILIGHT) y banda; se combinan, se les
//! resta el master dark del detector de la banda y se normalizan a media 1.
use metis_core::item::DataItem;
use metis_core::{InputSpec, ItemTemplate, ParameterSpec, PipelineError, ProcessContext, Product, ProductData, Recipe};
use metis_domain::{Band, Detector};

use super::{required, stacking_method, STACKING_METHOD};
use crate::items::{FlatRaw, MasterDark, MasterFlat};

#[derive(Debug, Clone)]
pub struct ImgFlat {
    band: Band,
    name: String,
}

impl ImgFlat {
    pub fn new(band: Band) -> Self {
        Self { band,
               name: format!("metis_{}_img_flat", band.as_str().to_lowercase()) }
    }

    pub fn band(&self) -> Band {
        self.band
    }
}

impl Recipe for ImgFlat {
    fn name(&self) -> &str {
        &self.name
    }

    fn synopsis(&self) -> &str {
        "Create a normalised master flat from lamp or twilight flats"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![stacking_method()]
    }

    fn inputs(&self) -> Result<Vec<InputSpec>, PipelineError> {
        let band = self.band.as_str();
        let detector = self.band.detector();
        Ok(vec![InputSpec::multiple("raw", FlatRaw::template().bind(Band::SLOT, band))?,
                InputSpec::single("dark", MasterDark::template().bind(Detector::SLOT, detector.as_str()))?])
    }

    fn products(&self) -> Vec<ItemTemplate> {
        vec![MasterFlat::template().bind(Band::SLOT, self.band.as_str())]
    }

    fn process(&self, ctx: &ProcessContext<'_>) -> Result<Vec<Product>, PipelineError> {
        let flats = ctx.load_all("raw")?;
        let combined = ctx.combine(&flats, STACKING_METHOD)?;
        let dark = required(ctx.load_one("dark")?, &self.name, "dark")?;
        let flat = combined.subtract(&dark).map_err(|e| PipelineError::from_domain(self.name.as_str(), e))?;
        let mean = flat.mean();
        if mean == 0.0 {
            return Err(PipelineError::processing(self.name.as_str(), "dark subtracted flat has zero mean"));
        }
        let template = MasterFlat::template().bind(Band::SLOT, self.band.as_str());
        let product = Product::new(&template, ctx.bindings(), ProductData::Image(flat.scale(1.0 / mean)))?
            .with_card("ESO QC FLAT MEAN", mean);
        Ok(vec![product])
    }
}
