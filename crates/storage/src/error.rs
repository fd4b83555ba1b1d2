//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("insufficient storage: {0}")]
    InsufficientStorage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<depot_core::Error> for StorageError {
    fn from(error: depot_core::Error) -> Self {
        Self::InvalidLocation(error.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
