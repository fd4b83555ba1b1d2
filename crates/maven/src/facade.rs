//! The facade consumed by the HTTP layer.

use crate::error::{MavenError, MavenResult};
use crate::metadata_service::MetadataService;
use crate::proxy::ProxyService;
use crate::service::RepositoryService;
use crate::statistics::StatisticsHook;
use bytes::Bytes;
use depot_core::{AccessToken, DirectoryInfo, DocumentInfo, FileDetails, Location, METADATA_FILE};
use depot_storage::ByteStream;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

/// File name suffixes excluded from resolved-artifact statistics:
/// checksums, descriptors, and documentation companions.
const IGNORED_EXTENSIONS: &[&str] = &[
    ".md5",
    ".sha1",
    ".sha256",
    ".sha512",
    ".pom",
    ".xml",
    "-sources.jar",
    "-javadoc.jar",
];

/// A read request for a file or directory.
pub struct LookupRequest {
    pub repository: String,
    pub gav: Location,
    pub token: Option<AccessToken>,
}

/// A read request for version listings.
pub struct VersionLookupRequest {
    pub repository: String,
    pub gav: Location,
    pub token: Option<AccessToken>,
    pub filter: Option<String>,
}

/// A deploy request. Authorization happens before this is constructed;
/// `by` names the deployer for the audit log.
pub struct DeployRequest {
    pub repository: String,
    pub gav: Location,
    pub by: String,
    pub content: Bytes,
}

/// A delete request.
pub struct DeleteRequest {
    pub repository: String,
    pub gav: Location,
    pub token: Option<AccessToken>,
}

/// Entry point for all repository operations: resolves the repository,
/// enforces access rules, serves locally with proxy fallback, and feeds
/// the statistics hook.
pub struct MavenFacade {
    repositories: Arc<RepositoryService>,
    metadata: MetadataService,
    proxy: ProxyService,
    statistics: Arc<dyn StatisticsHook>,
}

impl MavenFacade {
    pub fn new(repositories: Arc<RepositoryService>, statistics: Arc<dyn StatisticsHook>) -> Self {
        let proxy = ProxyService::new(repositories.clone());
        Self {
            repositories,
            metadata: MetadataService,
            proxy,
            statistics,
        }
    }

    pub fn repositories(&self) -> &Arc<RepositoryService> {
        &self.repositories
    }

    pub fn metadata(&self) -> &MetadataService {
        &self.metadata
    }

    pub fn proxy(&self) -> &ProxyService {
        &self.proxy
    }

    /// Details of a file or directory, falling back to proxies on local
    /// miss. Directory listings require browse permission.
    pub async fn find_details(&self, request: &LookupRequest) -> MavenResult<FileDetails> {
        let repository = self.repositories.find_repository(&request.repository).await?;
        let security = self.repositories.security();
        security.can_access_resource(request.token.as_ref(), &repository, &request.gav)?;

        let details = match repository.storage.get_file_details(&request.gav).await {
            Ok(details) => details,
            Err(depot_storage::StorageError::NotFound(_)) => {
                self.proxy
                    .find_remote_details(&repository, &request.gav)
                    .await?
            }
            Err(e) => return Err(e.into()),
        };

        match &details {
            FileDetails::File(_) => {
                self.record_resolved(&repository.id, &request.gav);
            }
            FileDetails::Directory(_) | FileDetails::SimpleDirectory(_) => {
                security.can_browse_resource(request.token.as_ref(), &repository, &request.gav)?;
            }
        }

        Ok(details)
    }

    /// A file's content, falling back to proxies on local miss.
    pub async fn find_file(
        &self,
        request: &LookupRequest,
    ) -> MavenResult<(DocumentInfo, ByteStream)> {
        let repository = self.repositories.find_repository(&request.repository).await?;
        self.repositories.security().can_access_resource(
            request.token.as_ref(),
            &repository,
            &request.gav,
        )?;

        let result = match repository.storage.get_file_details(&request.gav).await {
            Ok(FileDetails::File(info)) => {
                let stream = repository.storage.get_file(&request.gav).await?;
                Ok((info, stream))
            }
            Ok(_) => Err(MavenError::BadRequest(format!(
                "{} is a directory",
                request.gav
            ))),
            Err(depot_storage::StorageError::NotFound(_)) => {
                let bytes = self
                    .proxy
                    .find_remote_file(&repository, &request.gav)
                    .await?;
                let info = DocumentInfo::new(
                    request.gav.file_name().unwrap_or_default(),
                    bytes.len() as u64,
                    OffsetDateTime::now_utc(),
                );
                let stream: ByteStream =
                    Box::pin(futures::stream::once(async move { Ok(bytes) }));
                Ok((info, stream))
            }
            Err(e) => Err(e.into()),
        };

        if result.is_ok() {
            self.record_resolved(&repository.id, &request.gav);
        }
        result
    }

    /// Store a file. Overwriting an existing file requires the repository's
    /// redeployment flag; `maven-metadata.xml` is always replaceable.
    pub async fn deploy_file(&self, request: &DeployRequest) -> MavenResult<()> {
        let repository = self.repositories.find_repository(&request.repository).await?;

        if !repository.redeployment
            && request.gav.file_name() != Some(METADATA_FILE)
            && repository.storage.exists(&request.gav).await
        {
            return Err(MavenError::Conflict(format!(
                "redeployment of {} is not allowed",
                request.gav
            )));
        }

        repository
            .storage
            .put_file(&request.gav, request.content.clone())
            .await?;
        info!(
            repository = %repository.id,
            path = %request.gav,
            by = %request.by,
            size = request.content.len(),
            "artifact deployed"
        );
        Ok(())
    }

    /// Delete a file or directory. Requires write permission on the path.
    pub async fn delete_file(&self, request: &DeleteRequest) -> MavenResult<()> {
        let repository = self.repositories.find_repository(&request.repository).await?;
        self.repositories.security().can_modify_resource(
            request.token.as_ref(),
            &repository,
            &request.gav,
        )?;

        repository.storage.remove_file(&request.gav).await?;
        info!(repository = %repository.id, path = %request.gav, "artifact deleted");
        Ok(())
    }

    pub async fn find_versions(&self, request: &VersionLookupRequest) -> MavenResult<Vec<String>> {
        let repository = self.repositories.find_repository(&request.repository).await?;
        self.repositories.security().can_access_resource(
            request.token.as_ref(),
            &repository,
            &request.gav,
        )?;

        self.metadata
            .find_versions(
                &repository,
                Some(&self.proxy),
                &request.gav,
                request.filter.as_deref(),
            )
            .await
    }

    pub async fn find_latest(&self, request: &VersionLookupRequest) -> MavenResult<String> {
        let repository = self.repositories.find_repository(&request.repository).await?;
        self.repositories.security().can_access_resource(
            request.token.as_ref(),
            &repository,
            &request.gav,
        )?;

        self.metadata
            .find_latest(
                &repository,
                Some(&self.proxy),
                &request.gav,
                request.filter.as_deref(),
            )
            .await
    }

    /// Repositories visible to the token, as a root directory listing.
    pub async fn find_repositories(&self, token: Option<&AccessToken>) -> DirectoryInfo {
        self.repositories.get_root_directory(token).await
    }

    fn record_resolved(&self, repository: &str, gav: &Location) {
        let Some(name) = gav.file_name() else {
            return;
        };
        if IGNORED_EXTENSIONS.iter().any(|suffix| name.ends_with(suffix)) {
            return;
        }
        self.statistics.record_resolved(repository, gav);
    }
}
