//! Repository error taxonomy.

use depot_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by repository operations. Each variant corresponds to
/// one client-visible failure class; the HTTP layer maps them to status
/// codes.
#[derive(Debug, Error)]
pub enum MavenError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient storage: {0}")]
    InsufficientStorage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for MavenError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(message) => Self::NotFound(message),
            StorageError::InvalidLocation(message) => Self::BadRequest(message),
            StorageError::InsufficientStorage(message) => Self::InsufficientStorage(message),
            StorageError::Io(e) => Self::Internal(e.to_string()),
            StorageError::Config(message) => Self::Internal(message),
        }
    }
}

impl From<depot_core::Error> for MavenError {
    fn from(error: depot_core::Error) -> Self {
        match error {
            depot_core::Error::InvalidLocation(message) => Self::BadRequest(message),
            depot_core::Error::InvalidToken(message) => Self::Unauthorized(message),
            depot_core::Error::MetadataCodec(message) => Self::Internal(message),
        }
    }
}

/// Result type for repository operations.
pub type MavenResult<T> = std::result::Result<T, MavenError>;
