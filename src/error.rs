use std::path::PathBuf;
use thiserror::Error;

use crate::generation::GenerationField;

/// Errors from undo/redo on the edit history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing to undo or redo
    #[error("nothing to {0}")]
    EmptyHistory(HistoryDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
        }
    }
}

/// A generation parameter rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no model path selected")]
    MissingModelPath,

    #[error("steps must be between {min} and {max}, got {value}")]
    Steps { value: u32, min: u32, max: u32 },

    #[error("guidance scale must be between {min} and {max}, got {value}")]
    GuidanceScale { value: f32, min: f32, max: f32 },

    #[error("image guidance scale must be between {min} and {max}, got {value}")]
    ImageGuidanceScale { value: f32, min: f32, max: f32 },

    #[error("seed must be at most {max}, got {value}")]
    Seed { value: u64, max: u64 },
}

impl ConfigError {
    /// The control the error belongs to, so it can be shown next to it.
    pub fn field(&self) -> GenerationField {
        match self {
            Self::MissingModelPath => GenerationField::ModelPath,
            Self::Steps { .. } => GenerationField::Steps,
            Self::GuidanceScale { .. } => GenerationField::GuidanceScale,
            Self::ImageGuidanceScale { .. } => GenerationField::ImageGuidanceScale,
            Self::Seed { .. } => GenerationField::Seed,
        }
    }
}

/// Typed failures reported by a generation backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("generation cancelled")]
    Cancelled,
}

/// Errors surfaced by the generation session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// A request is already in flight
    #[error("a generation is already in progress")]
    GenerationInProgress,

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors that can occur during save/load operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize session: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid session data: {0}")]
    InvalidState(String),

    #[error("Nothing to save")]
    NothingToSave,
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Any failure of a user-facing session operation
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
