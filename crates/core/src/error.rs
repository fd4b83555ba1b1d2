//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("metadata codec error: {0}")]
    MetadataCodec(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
