//! Local filesystem storage backend.

use crate::error::{StorageError, StorageResult};
use crate::lockmap::LocationLocks;
use crate::traits::{ByteStream, StorageProvider};
use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{DirectoryInfo, DocumentInfo, FileDetails, Location, SimpleDirectoryInfo};
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// Default chunk size for streaming reads (64 KiB).
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Infix of in-flight temporary files, excluded from listings and usage.
const TEMP_INFIX: &str = ".tmp.";

/// Local filesystem storage.
pub struct FilesystemStorage {
    root: PathBuf,
    quota: Option<u64>,
    locks: LocationLocks,
}

impl FilesystemStorage {
    /// Create a new filesystem storage rooted at `root`.
    pub async fn new(
        root: impl AsRef<Path>,
        quota: Option<u64>,
        lock_lifetime: Duration,
    ) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            quota,
            locks: LocationLocks::new(lock_lifetime),
        })
    }

    fn resolve(&self, location: &Location) -> PathBuf {
        location.to_path(&self.root)
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Size of the file at `location`, or zero if absent. Used to credit
    /// overwrites against the quota.
    async fn existing_size(&self, path: &Path) -> StorageResult<u64> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
            Ok(_) => Ok(0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn check_quota(&self, path: &Path, incoming: u64) -> StorageResult<()> {
        let Some(quota) = self.quota else {
            return Ok(());
        };
        let usage = self.usage().await?;
        let replaced = self.existing_size(path).await?;
        if usage - replaced + incoming > quota {
            return Err(StorageError::InsufficientStorage(format!(
                "{incoming} bytes exceed quota ({}/{quota} bytes used)",
                usage - replaced
            )));
        }
        Ok(())
    }

    /// Only names carrying the exact generated suffix (`.tmp.` + UUID)
    /// are in-flight temp files; an artifact that merely contains `.tmp.`
    /// is ordinary content.
    fn is_temp_name(name: &str) -> bool {
        name.rsplit_once(TEMP_INFIX)
            .is_some_and(|(_, suffix)| Uuid::try_parse(suffix).is_ok())
    }

    async fn metadata_of(&self, location: &Location) -> StorageResult<std::fs::Metadata> {
        let path = self.resolve(location);
        fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(location.to_string())
            } else {
                StorageError::Io(e)
            }
        })
    }

    async fn directory_details(&self, location: &Location) -> StorageResult<FileDetails> {
        let path = self.resolve(location);
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if Self::is_temp_name(&name) {
                continue;
            }
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                files.push(FileDetails::SimpleDirectory(SimpleDirectoryInfo { name }));
            } else if file_type.is_file() {
                let metadata = entry.metadata().await?;
                let modified = modified_time(&metadata);
                files.push(FileDetails::File(DocumentInfo::new(
                    &name,
                    metadata.len(),
                    modified,
                )));
            }
            // Symlinks are ignored: everything under the root is written
            // by this process and never as a link.
        }

        let name = location.file_name().unwrap_or_default();
        Ok(FileDetails::Directory(DirectoryInfo::new(name, files)))
    }
}

fn modified_time(metadata: &std::fs::Metadata) -> OffsetDateTime {
    metadata
        .modified()
        .map(OffsetDateTime::from)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

#[async_trait]
impl StorageProvider for FilesystemStorage {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn put_file(&self, location: &Location, data: Bytes) -> StorageResult<()> {
        let path = self.resolve(location);
        let _guard = self.locks.write(location).await;

        self.check_quota(&path, data.len() as u64).await?;
        self.ensure_parent(&path).await?;

        // Write to a unique temp file, fsync, then rename. Readers either
        // see the previous content or the full new content, never a torn
        // write, and a crash leaves at worst an orphaned temp file.
        let temp_name = format!("{TEMP_INFIX}{}", Uuid::new_v4());
        let temp_path = path.with_file_name(
            path.file_name()
                .map(|n| format!("{}{temp_name}", n.to_string_lossy()))
                .unwrap_or_else(|| temp_name.clone()),
        );
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_file(&self, location: &Location) -> StorageResult<ByteStream> {
        use tokio::io::AsyncReadExt;

        let path = self.resolve(location);
        let guard = self.locks.read(location).await;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(location.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;

        // The read guard rides inside the stream, holding off writers to
        // this location until the consumer finishes or drops it.
        let stream = async_stream::try_stream! {
            let _guard = guard;
            let mut file = file;
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                yield Bytes::copy_from_slice(&buf[..n]);
            }
        };

        Ok(Box::pin(stream))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_file_content(&self, location: &Location) -> StorageResult<Bytes> {
        let path = self.resolve(location);
        let _guard = self.locks.read(location).await;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(location.to_string())
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_file_details(&self, location: &Location) -> StorageResult<FileDetails> {
        let metadata = self.metadata_of(location).await?;
        if metadata.is_dir() {
            return self.directory_details(location).await;
        }

        let name = location.file_name().unwrap_or_default();
        Ok(FileDetails::File(DocumentInfo::new(
            name,
            metadata.len(),
            modified_time(&metadata),
        )))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn remove_file(&self, location: &Location) -> StorageResult<()> {
        let path = self.resolve(location);
        let _guard = self.locks.write(location).await;

        let metadata = self.metadata_of(location).await?;
        if metadata.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_files(&self, location: &Location) -> StorageResult<Vec<Location>> {
        let metadata = self.metadata_of(location).await?;
        if !metadata.is_dir() {
            return Ok(Vec::new());
        }

        let base = self.resolve(location);
        let mut results = Vec::new();
        let mut entries = fs::read_dir(&base).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if Self::is_temp_name(&name) {
                continue;
            }
            results.push(location.join(&name)?);
        }
        results.sort();

        Ok(results)
    }

    async fn exists(&self, location: &Location) -> bool {
        let path = self.resolve(location);
        fs::try_exists(&path).await.unwrap_or(false)
    }

    async fn get_file_size(&self, location: &Location) -> StorageResult<u64> {
        let metadata = self.metadata_of(location).await?;
        if metadata.is_dir() {
            return Err(StorageError::NotFound(location.to_string()));
        }
        Ok(metadata.len())
    }

    async fn get_last_modified(&self, location: &Location) -> StorageResult<OffsetDateTime> {
        let metadata = self.metadata_of(location).await?;
        Ok(modified_time(&metadata))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn usage(&self) -> StorageResult<u64> {
        let mut total = 0u64;
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if Self::is_temp_name(&name) {
                        continue;
                    }
                    total += entry.metadata().await?.len();
                }
            }
        }
        Ok(total)
    }

    async fn shutdown(&self) {}

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
