//! Ordered remote fallback for local misses.

use crate::error::{MavenError, MavenResult};
use crate::repository::{ProxyReference, Repository};
use crate::service::RepositoryService;
use bytes::Bytes;
use depot_core::{DocumentInfo, FileDetails, Location};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Queries a repository's proxied hosts in configured order.
///
/// A host is either another local repository (resolved through the current
/// registry snapshot) or a remote HTTP endpoint. First success wins; every
/// failure is absorbed, logged, and the iteration continues. The caller
/// only ever sees `NotFound`, carrying the last underlying error.
pub struct ProxyService {
    repositories: Arc<RepositoryService>,
}

impl ProxyService {
    pub fn new(repositories: Arc<RepositoryService>) -> Self {
        Self { repositories }
    }

    /// Fetch a file from the first proxied host that has it. When the
    /// winning host has `store` enabled, the bytes are written into the
    /// repository's storage once and the same bytes are served; the fetch
    /// is never repeated for one request.
    pub async fn find_remote_file(
        &self,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<Bytes> {
        let mut last_error = None;

        for host in &repository.proxied {
            if !host.allows(gav) {
                continue;
            }

            let result = match &host.reference {
                ProxyReference::Local(id) => self.local_content(id, gav).await,
                ProxyReference::Remote(_) => host.fetch(gav).await,
            };

            match result {
                Ok(bytes) => {
                    if host.store
                        && let Err(e) = repository.storage.put_file(gav, bytes.clone()).await
                    {
                        // Serving still succeeds; only the cache write is lost.
                        warn!(
                            repository = %repository.id,
                            path = %gav,
                            error = %e,
                            "failed to store proxied artifact"
                        );
                    }
                    return Ok(bytes);
                }
                Err(e) => {
                    debug!(repository = %repository.id, path = %gav, error = %e, "proxy miss");
                    last_error = Some(e);
                }
            }
        }

        Err(Self::not_found(gav, last_error))
    }

    /// Resolve file details from the first proxied host that has the file.
    /// First success is authoritative; listings are not merged here.
    pub async fn find_remote_details(
        &self,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<FileDetails> {
        let mut last_error = None;

        for host in &repository.proxied {
            if !host.allows(gav) {
                continue;
            }

            let result = match &host.reference {
                ProxyReference::Local(id) => self.local_details(id, gav).await,
                ProxyReference::Remote(_) => match host.fetch_size(gav).await {
                    Ok(size) => Ok(FileDetails::File(DocumentInfo::new(
                        gav.file_name().unwrap_or_default(),
                        size,
                        OffsetDateTime::now_utc(),
                    ))),
                    Err(e) => Err(e),
                },
            };

            match result {
                Ok(details) => return Ok(details),
                Err(e) => {
                    debug!(repository = %repository.id, path = %gav, error = %e, "proxy miss");
                    last_error = Some(e);
                }
            }
        }

        Err(Self::not_found(gav, last_error))
    }

    async fn local_content(&self, id: &str, gav: &Location) -> MavenResult<Bytes> {
        let referenced = self.referenced(id).await?;
        Ok(referenced.storage.get_file_content(gav).await?)
    }

    async fn local_details(&self, id: &str, gav: &Location) -> MavenResult<FileDetails> {
        let referenced = self.referenced(id).await?;
        Ok(referenced.storage.get_file_details(gav).await?)
    }

    async fn referenced(&self, id: &str) -> MavenResult<Arc<Repository>> {
        self.repositories
            .get_repository(id)
            .await
            .ok_or_else(|| MavenError::NotFound(format!("proxied repository not found: {id}")))
    }

    fn not_found(gav: &Location, last_error: Option<MavenError>) -> MavenError {
        match last_error {
            Some(e) => MavenError::NotFound(format!("{gav} not found in any proxy: {e}")),
            None => MavenError::NotFound(format!("{gav} not found in any proxy")),
        }
    }
}
