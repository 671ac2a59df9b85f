//! Contrato de receta y motor de ejecución en dos fases
//! (clasificar, luego procesar).

mod context;
mod engine;
mod state;

pub use context::ProcessContext;
pub use engine::RecipeEngine;
pub use state::RunState;

use crate::errors::PipelineError;
use crate::input::InputSpec;
use crate::item::ItemTemplate;
use crate::params::ParameterSpec;
use crate::product::Product;

/// Una receta declara inputs, productos y parámetros, e implementa
/// `process`. El motor hace el resto.
pub trait Recipe {
    fn name(&self) -> &str;

    /// Descripción de una línea.
    fn synopsis(&self) -> &str;

    fn version(&self) -> &str {
        "1.0"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    fn inputs(&self) -> Result<Vec<InputSpec>, PipelineError>;

    fn products(&self) -> Vec<ItemTemplate>;

    /// Se invoca una vez, tras validar. No modifica el `InputSet` salvo para
    /// marcar frames como usados.
    fn process(&self, ctx: &ProcessContext<'_>) -> Result<Vec<Product>, PipelineError>;
}
