//! Tipos de evento de una ejecución de receta.
//!
//! - Cada `RecipeEngine::run` emite eventos a un `EventStore` append-only.
//! - `RunState::replay` reconstruye el estado de la ejecución a partir de
//!   ellos, sin estructuras mutables compartidas.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de un `run_id`.
    RunStarted { recipe: String, version: String, frame_count: usize },
    /// Clave de ajuste desconocida (aviso, no fatal).
    SettingIgnored { key: String },
    /// Inputs instanciados contra el frameset.
    InputSetBuilt { inputs: Vec<String> },
    /// Validación completada con los bindings resueltos.
    Validated { bindings: Vec<(String, String)> },
    /// `process()` devolvió sus productos (tags).
    Processed { products: Vec<String> },
    ProductSaved { tag: String, path: String, hash: String },
    /// Cierre con fingerprint agregado y ficheros emitidos.
    RunCompleted { fingerprint: String, outputs: Vec<String> },
    /// Fallo terminal; `state` es el estado en el que se produjo.
    RunFailed { state: String, error: PipelineError },
}

impl RunEventKind {
    /// Código de una letra para aserciones compactas sobre la secuencia.
    pub fn code(&self) -> char {
        match self {
            RunEventKind::RunStarted { .. } => 'S',
            RunEventKind::SettingIgnored { .. } => 'W',
            RunEventKind::InputSetBuilt { .. } => 'I',
            RunEventKind::Validated { .. } => 'V',
            RunEventKind::Processed { .. } => 'P',
            RunEventKind::ProductSaved { .. } => 's',
            RunEventKind::RunCompleted { .. } => 'C',
            RunEventKind::RunFailed { .. } => 'F',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // orden de append
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
