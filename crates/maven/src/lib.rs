//! Repository engine: registry, security, metadata, and proxying.
//!
//! This crate ties the storage layer to the domain model:
//! - `Repository` instances built from configuration
//! - `RepositoryService` registry with wholesale hot reload
//! - `MetadataService` for `maven-metadata.xml` generation and merging
//! - `ProxyService` for ordered remote fallback with store-back
//! - `MavenFacade`, the single entry point the HTTP layer consumes

pub mod error;
pub mod facade;
pub mod metadata_service;
pub mod proxy;
pub mod repository;
pub mod security;
pub mod service;
pub mod statistics;

pub use error::{MavenError, MavenResult};
pub use facade::{DeleteRequest, DeployRequest, LookupRequest, MavenFacade, VersionLookupRequest};
pub use metadata_service::MetadataService;
pub use proxy::ProxyService;
pub use repository::{ProxiedHost, ProxyReference, Repository};
pub use security::RepositorySecurityProvider;
pub use service::RepositoryService;
pub use statistics::{InMemoryStatistics, NoopStatistics, StatisticsHook};
