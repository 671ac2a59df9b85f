//! Items de datos: templates, items concretos y registro.

pub mod macros;
mod registry;
mod resolved;
mod template;

pub use registry::ItemRegistry;
pub use resolved::ResolvedItem;
pub use template::{DataItem, Extension, ItemTemplate};
