use std::path::PathBuf;

/// Errors raised by the statistics subsystem.
///
/// `KeyNotFound`, `TypeMismatch`, `CounterOverflow` and `InvalidEntry` abort the operation
/// that hit them.
/// `MalformedKey` and `MetadataMissing` describe a single skipped leaderboard record and
/// are only logged. `StorageCorrupt` is logged when a document is replaced by its empty form.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("No view counter for key '{0}'")]
    KeyNotFound(String),

    #[error("Counter '{key}' holds {found} instead of a non-negative integer")]
    TypeMismatch { key: String, found: String },

    #[error("Counter '{0}' is at its maximum value")]
    CounterOverflow(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Leaderboard key '{0}' is not <letters><digits>")]
    MalformedKey(String),

    #[error("No article metadata for ({author}, {index}): {reason}")]
    MetadataMissing {
        author: String,
        index: u64,
        reason: String,
    },

    #[error("Document {path} is unreadable: {reason}")]
    StorageCorrupt { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StatsResult<T> = Result<T, StatsError>;
