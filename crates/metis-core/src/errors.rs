//! Errores del motor de clasificación y ejecución.
//!
//! La taxonomía es cerrada: quien llama decide por `ErrorKind` en vez de
//! inspeccionar texto libre. Todas las variantes nombran el componente de
//! origen (`subject`, `input`, `item`...) y un sujeto legible (título o tag).

use metis_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Clase de fallo, estable para el harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    NotFound,
    ValueConflict,
    DataNotFound,
    Io,
    Processing,
}

/// Errores del colaborador externo de I/O (ficheros, cabeceras, guardado).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameIoError {
    #[error("data not found: {path}")]
    DataNotFound { path: String },
    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("cannot write {path}: {reason}")]
    Write { path: String, reason: String },
    #[error("frame io: {0}")]
    Other(String),
}

#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineError {
    #[error("{item}: invalid tag pattern '{pattern}': {reason}")]
    InvalidPattern { item: String, pattern: String, reason: String },

    #[error("{item}: missing required attribute '{attribute}'")]
    MissingAttribute { item: String, attribute: String },

    #[error("{subject}: invalid declaration: {reason}")]
    InvalidDeclaration { subject: String, reason: String },

    #[error("{template}: no registered item '{name}' for bindings {bindings}")]
    Unresolvable { template: String, name: String, bindings: String },

    #[error("{subject}: invalid setting '{name}': {reason}")]
    InvalidSetting { subject: String, name: String, reason: String },

    #[error("{input}: required input '{title}' ({tag}) not found")]
    NotFound { input: String, title: String, tag: String },

    #[error("{subject}: conflicting values for '{attribute}': {}", .values.join(", "))]
    ValueConflict { subject: String, attribute: String, values: Vec<String> },

    #[error("{subject}: unmapped value '{value}' for '{attribute}' in {file}")]
    UnmappedValue { subject: String, attribute: String, value: String, file: String },

    #[error("{product}: no RAW frame among the used input frames")]
    NoRawFrame { product: String },

    #[error("{product}: output path {path} already written by this run")]
    DuplicateOutput { product: String, path: String },

    #[error("{subject}: '{operation}' not allowed in state {state}")]
    InvalidState { subject: String, operation: String, state: String },

    #[error("{recipe}: {message}")]
    Processing { recipe: String, message: String },

    #[error(transparent)]
    Io(#[from] FrameIoError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidPattern { .. }
            | PipelineError::MissingAttribute { .. }
            | PipelineError::InvalidDeclaration { .. }
            | PipelineError::Unresolvable { .. }
            | PipelineError::InvalidSetting { .. }
            | PipelineError::InvalidState { .. } => ErrorKind::Configuration,
            PipelineError::NotFound { .. } => ErrorKind::NotFound,
            PipelineError::ValueConflict { .. } | PipelineError::UnmappedValue { .. } => ErrorKind::ValueConflict,
            PipelineError::Io(FrameIoError::DataNotFound { .. }) => ErrorKind::DataNotFound,
            PipelineError::Io(_) => ErrorKind::Io,
            PipelineError::NoRawFrame { .. } | PipelineError::DuplicateOutput { .. } | PipelineError::Processing { .. } => {
                ErrorKind::Processing
            }
        }
    }

    pub fn is_data_not_found(&self) -> bool {
        self.kind() == ErrorKind::DataNotFound
    }

    /// Atajo para errores dentro de `process()`.
    pub fn processing(recipe: impl Into<String>, message: impl std::fmt::Display) -> Self {
        PipelineError::Processing { recipe: recipe.into(),
                                    message: message.to_string() }
    }

    /// Traduce un error de dominio atribuyéndolo a `subject`. Un conflicto
    /// de slots es un `ValueConflict`; el resto son fallos de proceso.
    pub fn from_domain(subject: impl Into<String>, err: DomainError) -> Self {
        match err {
            DomainError::SlotConflict { slot, values } => PipelineError::ValueConflict { subject: subject.into(),
                                                                                         attribute: slot,
                                                                                         values },
            other => PipelineError::processing(subject, other),
        }
    }
}
