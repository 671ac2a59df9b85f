//! Recetas del instrumento.

pub mod det_dark;
pub mod img_basic_reduce;
pub mod img_flat;

use metis_core::{ParameterSpec, PipelineError, Recipe};
use metis_domain::{Band, CombineMethod, Image};

pub use det_dark::DetDark;
pub use img_basic_reduce::ImgBasicReduce;
pub use img_flat::ImgFlat;

/// Parámetro común de combinación de frames.
pub const STACKING_METHOD: &str = "stacking.method";

pub fn stacking_method() -> ParameterSpec {
    ParameterSpec::new(STACKING_METHOD, "Method used to combine the input frames", CombineMethod::Median.as_str())
        .choices(CombineMethod::ALL.iter().map(|m| m.as_str()))
}

/// Todas las recetas disponibles.
pub fn all_recipes() -> Vec<Box<dyn Recipe>> {
    vec![Box::new(DetDark),
         Box::new(ImgFlat::new(Band::Lm)),
         Box::new(ImgFlat::new(Band::N)),
         Box::new(ImgBasicReduce::new(Band::Lm)),
         Box::new(ImgBasicReduce::new(Band::N))]
}

pub fn find_recipe(name: &str) -> Option<Box<dyn Recipe>> {
    all_recipes().into_iter().find(|r| r.name() == name)
}

// Un input requerido ya validado siempre trae imagen; si no, es un fallo
// de la propia receta.
fn required(image: Option<Image>, recipe: &str, input: &str) -> Result<Image, PipelineError> {
    image.ok_or_else(|| PipelineError::processing(recipe, format!("input '{input}' has no frame")))
}
