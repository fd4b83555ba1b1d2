//! API error types.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use depot_maven::MavenError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Maven(#[from] MavenError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Internal(_) => "internal_error",
            Self::Maven(e) => match e {
                MavenError::BadRequest(_) => "bad_request",
                MavenError::Unauthorized(_) => "unauthorized",
                MavenError::Forbidden(_) => "forbidden",
                MavenError::NotFound(_) => "not_found",
                MavenError::Conflict(_) => "conflict",
                MavenError::InsufficientStorage(_) => "insufficient_storage",
                MavenError::Internal(_) => "internal_error",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Maven(e) => match e {
                MavenError::BadRequest(_) => StatusCode::BAD_REQUEST,
                MavenError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                MavenError::Forbidden(_) => StatusCode::FORBIDDEN,
                MavenError::NotFound(_) => StatusCode::NOT_FOUND,
                MavenError::Conflict(_) => StatusCode::CONFLICT,
                MavenError::InsufficientStorage(_) => StatusCode::INSUFFICIENT_STORAGE,
                MavenError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        // Maven clients prompt for credentials only when challenged.
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Basic realm=\"depot\""),
            );
        }
        response
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
