//! Repository storage abstraction and backends.
//!
//! This crate provides:
//! - Atomic, location-addressed file storage with per-location locking
//! - Quota enforcement at write time
//! - Backends: local filesystem and in-memory

pub mod backends;
pub mod error;
pub mod lockmap;
pub mod traits;

pub use backends::{filesystem::FilesystemStorage, memory::MemoryStorage};
pub use error::{StorageError, StorageResult};
pub use lockmap::LocationLocks;
pub use traits::{ByteStream, StorageProvider};

use depot_core::config::StorageConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Create a storage provider for a repository from configuration.
///
/// Filesystem repositories without an explicit path land under
/// `{working_directory}/repositories/{repository_id}`.
pub async fn from_config(
    config: &StorageConfig,
    working_directory: &Path,
    repository_id: &str,
    lock_lifetime: Duration,
) -> StorageResult<Arc<dyn StorageProvider>> {
    match config {
        StorageConfig::Filesystem { path, quota } => {
            let root = match path {
                Some(path) => path.clone(),
                None => working_directory.join("repositories").join(repository_id),
            };
            let backend = FilesystemStorage::new(root, *quota, lock_lifetime).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Memory { quota } => Ok(Arc::new(MemoryStorage::new(*quota))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use depot_core::Location;
    use tempfile::tempdir;

    #[tokio::test]
    async fn from_config_filesystem_defaults_under_working_directory() {
        let temp = tempdir().unwrap();
        let config = StorageConfig::Filesystem {
            path: None,
            quota: None,
        };

        let store = from_config(&config, temp.path(), "releases", Duration::from_secs(60))
            .await
            .unwrap();
        let target = Location::parse("hello.txt").unwrap();
        store
            .put_file(&target, Bytes::from_static(b"hi"))
            .await
            .unwrap();

        assert!(store.exists(&target).await);
        assert!(
            temp.path()
                .join("repositories/releases/hello.txt")
                .is_file()
        );
    }

    #[tokio::test]
    async fn from_config_memory_ok() {
        let config = StorageConfig::Memory { quota: Some(1024) };
        let store = from_config(
            &config,
            Path::new("/nonexistent"),
            "snapshots",
            Duration::from_secs(60),
        )
        .await
        .unwrap();
        assert_eq!(store.backend_name(), "memory");
    }
}
