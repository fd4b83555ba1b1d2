//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{FileDetails, Location};
use futures::Stream;
use std::pin::Pin;
use time::OffsetDateTime;

/// A boxed stream of bytes for streaming reads.
///
/// The stream may hold a read lock on the underlying location; the lock is
/// released when the stream is dropped, so consumers should not keep streams
/// alive longer than the transfer.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Repository storage abstraction.
///
/// Locations are normalized at construction, so providers may resolve them
/// against their root without further validation. Writes to a location are
/// exclusive against concurrent reads and writes of the same location;
/// distinct locations never contend.
#[async_trait]
pub trait StorageProvider: Send + Sync + 'static {
    /// Store a file atomically, replacing any previous content.
    async fn put_file(&self, location: &Location, data: Bytes) -> StorageResult<()>;

    /// Get a file's content as a byte stream.
    async fn get_file(&self, location: &Location) -> StorageResult<ByteStream>;

    /// Get a file's full content.
    async fn get_file_content(&self, location: &Location) -> StorageResult<Bytes>;

    /// Get details of a file or directory listing.
    async fn get_file_details(&self, location: &Location) -> StorageResult<FileDetails>;

    /// Remove a file, or a directory with everything under it.
    async fn remove_file(&self, location: &Location) -> StorageResult<()>;

    /// List the immediate children of a directory as locations.
    async fn get_files(&self, location: &Location) -> StorageResult<Vec<Location>>;

    /// Check if a file or directory exists.
    async fn exists(&self, location: &Location) -> bool;

    /// Get a file's size without fetching content.
    async fn get_file_size(&self, location: &Location) -> StorageResult<u64>;

    /// Get a file's last modification time.
    async fn get_last_modified(&self, location: &Location) -> StorageResult<OffsetDateTime>;

    /// Total bytes currently stored.
    async fn usage(&self) -> StorageResult<u64>;

    /// Release resources. Called when the provider is replaced or the
    /// server stops; pending operations are allowed to finish first.
    async fn shutdown(&self);

    /// Static identifier of the backend type, for logging.
    fn backend_name(&self) -> &'static str;
}
