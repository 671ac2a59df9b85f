use metis_domain::{CombineMethod, FrameSet, Image, SlotBindings};

use crate::errors::PipelineError;
use crate::inputset::InputSet;
use crate::io::FrameIo;
use crate::params::ParameterList;

/// Vista de sólo lectura que recibe `Recipe::process`.
pub struct ProcessContext<'a> {
    pub recipe: &'a str,
    pub inputset: &'a InputSet,
    pub parameters: &'a ParameterList,
    pub io: &'a dyn FrameIo,
    pub frameset: &'a FrameSet,
}

impl<'a> ProcessContext<'a> {
    /// Bindings resueltos por la validación.
    pub fn bindings(&self) -> &SlotBindings {
        self.inputset.bindings()
    }

    /// Carga todas las imágenes de un input y lo marca como usado.
    pub fn load_all(&self, input: &str) -> Result<Vec<Image>, PipelineError> {
        let input = self.inputset.require(input)?;
        let images = input.frames()
                          .into_iter()
                          .map(|f| self.io.load_image(f))
                          .collect::<Result<Vec<_>, _>>()?;
        input.use_frames();
        Ok(images)
    }

    /// Imagen de un input Single; `None` si es opcional y está vacío.
    pub fn load_one(&self, input: &str) -> Result<Option<Image>, PipelineError> {
        let input = self.inputset.require(input)?;
        let Some(frame) = input.frame() else {
            return Ok(None);
        };
        let image = self.io.load_image(frame)?;
        input.use_frames();
        Ok(Some(image))
    }

    /// Combina con el método dado por el parámetro `param`.
    pub fn combine(&self, images: &[Image], param: &str) -> Result<Image, PipelineError> {
        let method = self.parameters
                         .get_str(param)
                         .ok_or_else(|| PipelineError::processing(self.recipe, format!("parameter '{param}' is not set")))?
                         .parse::<CombineMethod>()
                         .map_err(|e| PipelineError::from_domain(self.recipe, e))?;
        Ok(self.io.combine(images, method)?)
    }
}
