//! HTTP request handlers.

pub mod api;
pub mod maven;

pub use api::*;
pub use maven::*;
