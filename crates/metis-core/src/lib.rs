//! metis-core: clasificación de inputs y ejecución de recetas.
//!
//! Flujo de una ejecución:
//! 1. Los tags del frameset se emparejan con los patrones de cada input
//!    (`tag`) y se resuelven contra el registro de items (`item`).
//! 2. `InputSet::validate` comprueba presencia, cardinalidad, detector
//!    único y acuerdo de slots entre inputs.
//! 3. `RecipeEngine` invoca `Recipe::process` y guarda los productos a
//!    través del colaborador de I/O (`io`).
pub use metis_domain as domain;

pub mod config;
pub mod constants;
pub mod describe;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod input;
pub mod inputset;
pub mod io;
pub mod item;
pub mod params;
pub mod product;
pub mod recipe;
pub mod tag;

pub use config::EngineConfig;
pub use describe::describe;
pub use errors::{ErrorKind, FrameIoError, PipelineError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use input::{Cardinality, Input, InputSpec, InputState, MatchedFrame};
pub use inputset::InputSet;
pub use io::{FrameIo, HeaderReader, SaveRequest};
pub use item::{DataItem, Extension, ItemRegistry, ItemTemplate, ResolvedItem};
pub use params::{ParameterList, ParameterSpec, Settings};
pub use product::{Product, ProductData};
pub use recipe::{ProcessContext, Recipe, RecipeEngine, RunState};
pub use tag::TagPattern;
