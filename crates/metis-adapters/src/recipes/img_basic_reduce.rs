//! metis_{lm,n}_img_basic_reduce: un producto reducido por exposición.
use metis_core::item::DataItem;
use metis_core::{InputSpec, ItemTemplate, ParameterSpec, PipelineError, ProcessContext, Product, ProductData, Recipe};
use metis_domain::{Band, Detector, Target};

use super::{required, stacking_method};
use crate::items::{BasicReduced, ImageRaw, MasterDark, MasterFlat};

#[derive(Debug, Clone)]
pub struct ImgBasicReduce {
    band: Band,
    name: String,
}

impl ImgBasicReduce {
    pub fn new(band: Band) -> Self {
        Self { band,
               name: format!("metis_{}_img_basic_reduce", band.as_str().to_lowercase()) }
    }

    fn product_template(&self) -> ItemTemplate {
        BasicReduced::template().bind(Band::SLOT, self.band.as_str())
    }
}

impl Recipe for ImgBasicReduce {
    fn name(&self) -> &str {
        &self.name
    }

    fn synopsis(&self) -> &str {
        "Dark subtract and flat field science or standard exposures"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![stacking_method()]
    }

    fn inputs(&self) -> Result<Vec<InputSpec>, PipelineError> {
        let band = self.band.as_str();
        let raw = ImageRaw::template().bind(Band::SLOT, band)
                                      .restrict(Target::SLOT, [Target::Sci.as_str(), Target::Std.as_str()]);
        Ok(vec![InputSpec::multiple("raw", raw)?,
                InputSpec::single("dark", MasterDark::template().bind(Detector::SLOT, self.band.detector().as_str()))?,
                InputSpec::single("flat", MasterFlat::template().bind(Band::SLOT, band))?])
    }

    fn products(&self) -> Vec<ItemTemplate> {
        vec![self.product_template()]
    }

    fn process(&self, ctx: &ProcessContext<'_>) -> Result<Vec<Product>, PipelineError> {
        let raw = ctx.inputset.require("raw")?;
        let images = ctx.load_all("raw")?;
        let dark = required(ctx.load_one("dark")?, &self.name, "dark")?;
        let flat = required(ctx.load_one("flat")?, &self.name, "flat")?;
        let template = self.product_template();

        let stems: Vec<String> = raw.contents()
                                    .iter()
                                    .enumerate()
                                    .map(|(i, m)| {
                                        m.frame
                                         .path
                                         .file_stem()
                                         .map(|s| s.to_string_lossy().into_owned())
                                         .unwrap_or_else(|| format!("frame{}", i + 1))
                                    })
                                    .collect();

        let mut products = Vec::with_capacity(images.len());
        for (i, (matched, image)) in raw.contents().iter().zip(images).enumerate() {
            let reduced = image.subtract(&dark)
                               .and_then(|img| img.divide(&flat))
                               .map_err(|e| PipelineError::from_domain(self.name.as_str(), e))?;
            let stem = &stems[i];
            // Mismo nombre en directorios distintos: se desambigua por posición.
            let file_name = if stems.iter().filter(|s| *s == stem).count() > 1 {
                format!("{stem}_{}_basic_reduced.fits", i + 1)
            } else {
                format!("{stem}_basic_reduced.fits")
            };
            let bindings = matched.item.bindings.overlay(ctx.bindings());
            let product = Product::new(&template, &bindings, ProductData::Image(reduced))?
                .with_file_name(file_name)
                .with_card("ESO PRO REC1 RAW1 NAME", matched.frame.path.display().to_string());
            products.push(product);
        }
        Ok(products)
    }
}
