//! In-memory storage backend.
//!
//! Backed by an ordered map so directory semantics fall out of prefix
//! scans. Useful for tests and for ephemeral repositories that should not
//! survive a restart.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ByteStream, StorageProvider};
use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{DirectoryInfo, DocumentInfo, FileDetails, Location, SimpleDirectoryInfo};
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Clone)]
struct MemoryEntry {
    data: Bytes,
    modified: OffsetDateTime,
}

/// In-memory storage.
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<Location, MemoryEntry>>,
    quota: Option<u64>,
}

impl MemoryStorage {
    pub fn new(quota: Option<u64>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota,
        }
    }

    fn total_size(entries: &BTreeMap<Location, MemoryEntry>) -> u64 {
        entries.values().map(|e| e.data.len() as u64).sum()
    }

    /// A location is a directory when entries exist strictly below it.
    fn is_directory(entries: &BTreeMap<Location, MemoryEntry>, location: &Location) -> bool {
        entries
            .keys()
            .any(|key| key != location && key.starts_with(location))
    }

    fn directory_details(
        entries: &BTreeMap<Location, MemoryEntry>,
        location: &Location,
    ) -> FileDetails {
        let depth = location.segments().count();
        let mut directories = BTreeSet::new();
        let mut files = Vec::new();

        for (key, entry) in entries {
            if !key.starts_with(location) || key == location {
                continue;
            }
            let mut remainder = key.segments().skip(depth);
            let Some(child) = remainder.next() else {
                continue;
            };
            if remainder.next().is_some() {
                directories.insert(child.to_string());
            } else {
                files.push(FileDetails::File(DocumentInfo::new(
                    child,
                    entry.data.len() as u64,
                    entry.modified,
                )));
            }
        }

        let mut children: Vec<FileDetails> = directories
            .into_iter()
            .map(|name| FileDetails::SimpleDirectory(SimpleDirectoryInfo { name }))
            .collect();
        children.extend(files);

        let name = location.file_name().unwrap_or_default();
        FileDetails::Directory(DirectoryInfo::new(name, children))
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    #[instrument(skip(self, data), fields(backend = "memory", size = data.len()))]
    async fn put_file(&self, location: &Location, data: Bytes) -> StorageResult<()> {
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota {
            let replaced = entries
                .get(location)
                .map(|e| e.data.len() as u64)
                .unwrap_or(0);
            let usage = Self::total_size(&entries);
            if usage - replaced + data.len() as u64 > quota {
                return Err(StorageError::InsufficientStorage(format!(
                    "{} bytes exceed quota ({}/{quota} bytes used)",
                    data.len(),
                    usage - replaced
                )));
            }
        }

        entries.insert(
            location.clone(),
            MemoryEntry {
                data,
                modified: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn get_file(&self, location: &Location) -> StorageResult<ByteStream> {
        let data = self.get_file_content(location).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn get_file_content(&self, location: &Location) -> StorageResult<Bytes> {
        let entries = self.entries.read().await;
        entries
            .get(location)
            .map(|e| e.data.clone())
            .ok_or_else(|| StorageError::NotFound(location.to_string()))
    }

    async fn get_file_details(&self, location: &Location) -> StorageResult<FileDetails> {
        let entries = self.entries.read().await;
        if let Some(entry) = entries.get(location) {
            let name = location.file_name().unwrap_or_default();
            return Ok(FileDetails::File(DocumentInfo::new(
                name,
                entry.data.len() as u64,
                entry.modified,
            )));
        }
        if location.is_root() || Self::is_directory(&entries, location) {
            return Ok(Self::directory_details(&entries, location));
        }
        Err(StorageError::NotFound(location.to_string()))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn remove_file(&self, location: &Location) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(location).is_some() {
            return Ok(());
        }
        if !Self::is_directory(&entries, location) {
            return Err(StorageError::NotFound(location.to_string()));
        }
        entries.retain(|key, _| !key.starts_with(location));
        Ok(())
    }

    async fn get_files(&self, location: &Location) -> StorageResult<Vec<Location>> {
        let entries = self.entries.read().await;
        if entries.contains_key(location) {
            return Ok(Vec::new());
        }
        if !location.is_root() && !Self::is_directory(&entries, location) {
            return Err(StorageError::NotFound(location.to_string()));
        }

        let depth = location.segments().count();
        let mut children = BTreeSet::new();
        for key in entries.keys() {
            if !key.starts_with(location) || key == location {
                continue;
            }
            if let Some(child) = key.segments().nth(depth) {
                children.insert(location.join(child)?);
            }
        }
        Ok(children.into_iter().collect())
    }

    async fn exists(&self, location: &Location) -> bool {
        let entries = self.entries.read().await;
        location.is_root()
            || entries.contains_key(location)
            || Self::is_directory(&entries, location)
    }

    async fn get_file_size(&self, location: &Location) -> StorageResult<u64> {
        let entries = self.entries.read().await;
        entries
            .get(location)
            .map(|e| e.data.len() as u64)
            .ok_or_else(|| StorageError::NotFound(location.to_string()))
    }

    async fn get_last_modified(&self, location: &Location) -> StorageResult<OffsetDateTime> {
        let entries = self.entries.read().await;
        entries
            .get(location)
            .map(|e| e.modified)
            .ok_or_else(|| StorageError::NotFound(location.to_string()))
    }

    async fn usage(&self) -> StorageResult<u64> {
        let entries = self.entries.read().await;
        Ok(Self::total_size(&entries))
    }

    async fn shutdown(&self) {}

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let storage = MemoryStorage::new(None);
        let target = location("g/a/1.0/a-1.0.jar");

        storage
            .put_file(&target, Bytes::from("content"))
            .await
            .unwrap();
        assert!(storage.exists(&target).await);
        assert_eq!(
            storage.get_file_content(&target).await.unwrap(),
            Bytes::from("content")
        );
    }

    #[tokio::test]
    async fn directory_semantics_from_prefixes() {
        let storage = MemoryStorage::new(None);
        storage
            .put_file(&location("g/a/1.0/a-1.0.jar"), Bytes::from("j"))
            .await
            .unwrap();
        storage
            .put_file(&location("g/a/maven-metadata.xml"), Bytes::from("<x/>"))
            .await
            .unwrap();

        assert!(storage.exists(&location("g/a")).await);
        let details = storage.get_file_details(&location("g/a")).await.unwrap();
        let FileDetails::Directory(listing) = details else {
            panic!("expected directory details");
        };
        let names: Vec<&str> = listing.files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["1.0", "maven-metadata.xml"]);
    }

    #[tokio::test]
    async fn remove_directory_removes_subtree() {
        let storage = MemoryStorage::new(None);
        storage
            .put_file(&location("g/a/1.0/a-1.0.jar"), Bytes::from("j"))
            .await
            .unwrap();
        storage
            .put_file(&location("g/a/1.1/a-1.1.jar"), Bytes::from("j"))
            .await
            .unwrap();

        storage.remove_file(&location("g/a")).await.unwrap();
        assert!(!storage.exists(&location("g/a")).await);
        assert_eq!(storage.usage().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn get_files_on_missing_location_is_not_found() {
        let storage = MemoryStorage::new(None);
        storage
            .put_file(&location("g/a/1.0/a-1.0.jar"), Bytes::from("j"))
            .await
            .unwrap();

        let missing = storage.get_files(&location("g/missing")).await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));

        // A file has no children; the root always exists.
        assert_eq!(
            storage
                .get_files(&location("g/a/1.0/a-1.0.jar"))
                .await
                .unwrap(),
            vec![]
        );
        assert_eq!(
            storage.get_files(&Location::root()).await.unwrap(),
            vec![location("g")]
        );
    }

    #[tokio::test]
    async fn quota_enforced() {
        let storage = MemoryStorage::new(Some(5));
        let result = storage
            .put_file(&location("big.bin"), Bytes::from("123456"))
            .await;
        assert!(matches!(result, Err(StorageError::InsufficientStorage(_))));

        storage
            .put_file(&location("ok.bin"), Bytes::from("12345"))
            .await
            .unwrap();
        // Overwrite at the same size still fits.
        storage
            .put_file(&location("ok.bin"), Bytes::from("54321"))
            .await
            .unwrap();
    }
}
