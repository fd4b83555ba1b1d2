//! Core domain types and shared logic for the depot artifact repository.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Normalized storage locations (GAV paths)
//! - File and directory details
//! - Maven metadata structure and its XML codec
//! - Version-aware ordering
//! - Access tokens and route permissions
//! - Configuration types

pub mod config;
pub mod details;
pub mod error;
pub mod location;
pub mod metadata;
pub mod token;
pub mod version;

pub use details::{DirectoryInfo, DocumentInfo, FileDetails, SimpleDirectoryInfo};
pub use error::{Error, Result};
pub use location::Location;
pub use metadata::{
    METADATA_FILE, Metadata, Snapshot, SnapshotVersion, SnapshotVersions, Versioning, Versions,
};
pub use token::{AccessToken, Route, RoutePermission};
pub use version::{Version, compare_versions};
