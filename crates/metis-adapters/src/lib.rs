//! metis-adapters: catálogo del instrumento sobre el motor genérico.
//!
//! Este crate provee:
//! - Los items de datos del instrumento (`items`), declarados con
//!   `data_item!` y registrados en bloque con `register_catalogue`.
//! - Recetas concretas (`recipes`): master dark, master flat y reducción
//!   básica de imagen por banda.
//! - `MemoryFrameIo`: colaborador de I/O en memoria que hace legibles los
//!   productos guardados para recetas posteriores.
//!
//! Nota: los valores de slot viven en metis-domain; el core sólo los usa
//! como dominio por defecto y para leer el detector de `ESO DPR TECH`.
//! Aquí se declara qué items y recetas existen.

pub mod items;
pub mod memory_io;
pub mod recipes;

pub use items::{global_registry, register_catalogue};
pub use memory_io::MemoryFrameIo;
