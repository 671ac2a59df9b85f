use thiserror::Error;

/// Errores del vocabulario de dominio.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown value '{value}' for slot '{slot}'")]
    UnknownSlotValue { slot: String, value: String },

    #[error("conflicting values for slot '{slot}': {}", .values.join(", "))]
    SlotConflict { slot: String, values: Vec<String> },

    #[error("unknown combine method '{0}'")]
    UnknownCombineMethod(String),

    #[error("image data length mismatch: expected {expected} pixels, found {found}")]
    DataLength { expected: usize, found: usize },

    #[error("image shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
}
