//! metisflow
//!
//! Librería fachada del workspace:
//! - `domain`: vocabulario del instrumento (slots, frames, cabeceras).
//! - `engine`: clasificación de inputs, registro de items y motor de recetas.
//! - `adapters`: catálogo de items, recetas concretas y I/O en memoria.
//! - `logging`: arranque del backend de log.

pub mod logging;

pub use metis_adapters as adapters;
pub use metis_core as engine;
pub use metis_domain as domain;

pub use metis_core::{describe, InputSpec, ItemRegistry, PipelineError, Recipe, RecipeEngine, Settings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_reexports_the_members() {
        let reg = ItemRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(domain::Band::Lm.detector(), domain::Detector::TwoRg);
        assert_eq!(adapters::recipes::all_recipes().len(), 5);
    }
}
