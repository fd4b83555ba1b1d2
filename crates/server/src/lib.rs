//! HTTP API server for the depot artifact repository.
//!
//! This crate provides the HTTP surface:
//! - Maven protocol endpoints: download, deploy, delete, directory browsing
//! - Management API: details, versions, latest, repository listing
//! - Basic authentication resolving statically configured access tokens

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::AuthenticatedUser;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
