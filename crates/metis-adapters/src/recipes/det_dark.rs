//! metis_det_dark: master dark a partir de darks crudos.
//!
//! Los darks deben venir de un único detector (comprobado por la cabecera);
//! el detector resuelto da nombre al producto (`MASTER_DARK_{detector}`).
use metis_core::item::DataItem;
use metis_core::{InputSpec, ItemTemplate, ParameterSpec, PipelineError, ProcessContext, Product, ProductData, Recipe};

use super::{stacking_method, STACKING_METHOD};
use crate::items::{DarkRaw, GainMap, MasterDark, PersistenceMap};

pub const NAME: &str = "metis_det_dark";

#[derive(Debug, Clone, Copy, Default)]
pub struct DetDark;

impl Recipe for DetDark {
    fn name(&self) -> &str {
        NAME
    }

    fn synopsis(&self) -> &str {
        "Create a master dark from raw dark exposures"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![stacking_method()]
    }

    fn inputs(&self) -> Result<Vec<InputSpec>, PipelineError> {
        Ok(vec![InputSpec::multiple("raw", DarkRaw::template())?,
                InputSpec::single("persistence", PersistenceMap::template())?.optional(),
                InputSpec::single("gain", GainMap::template())?.optional()])
    }

    fn products(&self) -> Vec<ItemTemplate> {
        vec![MasterDark::template()]
    }

    fn process(&self, ctx: &ProcessContext<'_>) -> Result<Vec<Product>, PipelineError> {
        let raws = ctx.load_all("raw")?;
        let mut dark = ctx.combine(&raws, STACKING_METHOD)?;
        if let Some(persistence) = ctx.load_one("persistence")? {
            dark = dark.subtract(&persistence).map_err(|e| PipelineError::from_domain(NAME, e))?;
        }
        if let Some(gain) = ctx.load_one("gain")? {
            dark = dark.divide(&gain).map_err(|e| PipelineError::from_domain(NAME, e))?;
        }
        let mean = dark.mean();
        let product = Product::new(&MasterDark::template(), ctx.bindings(), ProductData::Image(dark))?
            .with_card("ESO QC DARK MEAN", mean)
            .with_card("ESO QC NCOMBINE", raws.len() as i64);
        Ok(vec![product])
    }
}
