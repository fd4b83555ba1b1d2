//! Maven metadata generation, lookup, and merging.

use crate::error::{MavenError, MavenResult};
use crate::proxy::ProxyService;
use crate::repository::Repository;
use bytes::Bytes;
use depot_core::{FileDetails, Location, METADATA_FILE, Metadata, compare_versions};
use time::OffsetDateTime;
use tracing::debug;

/// Computes and merges `maven-metadata.xml` version data.
#[derive(Default)]
pub struct MetadataService;

impl MetadataService {
    /// Normalize and write metadata at the canonical path under the GAV
    /// directory, stamping `lastUpdated` unless the document carries one.
    /// Returns the normalized document.
    pub async fn save_metadata(
        &self,
        repository: &Repository,
        gav: &Location,
        metadata: Metadata,
    ) -> MavenResult<Metadata> {
        let mut metadata = metadata.normalized();
        if let Some(versioning) = metadata.versioning.as_mut()
            && versioning.last_updated.is_none()
        {
            versioning.last_updated = Some(Self::last_updated_stamp(OffsetDateTime::now_utc()));
        }
        let xml = metadata.to_xml()?;
        let target = gav.join(METADATA_FILE)?;
        repository
            .storage
            .put_file(&target, Bytes::from(xml))
            .await?;
        Ok(metadata)
    }

    /// Read and parse the metadata file at the GAV directory.
    pub async fn find_metadata(
        &self,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<Metadata> {
        let target = gav.join(METADATA_FILE)?;
        let content = repository.storage.get_file_content(&target).await?;
        let text = std::str::from_utf8(&content)
            .map_err(|e| MavenError::Internal(format!("metadata is not UTF-8: {e}")))?;
        Ok(Metadata::from_xml(text)?)
    }

    /// All versions available for a GAV, ascending by the version-aware
    /// comparator. Local version directories are merged with version lists
    /// from proxied metadata; an optional filter keeps versions with the
    /// given prefix.
    pub async fn find_versions(
        &self,
        repository: &Repository,
        proxy: Option<&ProxyService>,
        gav: &Location,
        filter: Option<&str>,
    ) -> MavenResult<Vec<String>> {
        let mut versions = self.local_versions(repository, gav).await?;

        if let Some(proxy) = proxy
            && !repository.proxied.is_empty()
        {
            match self.remote_versions(repository, proxy, gav).await {
                Ok(remote) => versions.extend(remote),
                Err(e) => {
                    debug!(repository = %repository.id, path = %gav, error = %e, "no proxied metadata");
                }
            }
        }

        versions.sort_by(|a, b| compare_versions(a, b));
        versions.dedup();
        if let Some(filter) = filter {
            versions.retain(|version| version.starts_with(filter));
        }
        Ok(versions)
    }

    /// The maximum version by the comparator, or `NotFound` when none.
    pub async fn find_latest(
        &self,
        repository: &Repository,
        proxy: Option<&ProxyService>,
        gav: &Location,
        filter: Option<&str>,
    ) -> MavenResult<String> {
        self.find_versions(repository, proxy, gav, filter)
            .await?
            .pop()
            .ok_or_else(|| MavenError::NotFound(format!("no versions found for {gav}")))
    }

    /// Resolve the concrete timestamped file value for a snapshot version
    /// directory, matching the requested extension and classifier against
    /// the snapshot manifest.
    pub async fn resolve_snapshot(
        &self,
        repository: &Repository,
        gav: &Location,
        extension: &str,
        classifier: Option<&str>,
    ) -> MavenResult<String> {
        let metadata = self.find_metadata(repository, gav).await?;
        metadata
            .snapshot_versions()
            .iter()
            .find(|entry| {
                entry.extension.as_deref() == Some(extension)
                    && entry.classifier.as_deref() == classifier
            })
            .and_then(|entry| entry.value.clone())
            .ok_or_else(|| {
                MavenError::NotFound(format!(
                    "no snapshot of {gav} for extension {extension}, classifier {}",
                    classifier.unwrap_or("none")
                ))
            })
    }

    /// `lastUpdated` timestamp in the `yyyyMMddHHmmss` form Maven expects.
    fn last_updated_stamp(now: OffsetDateTime) -> String {
        format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            now.year(),
            now.month() as u8,
            now.day(),
            now.hour(),
            now.minute(),
            now.second()
        )
    }

    async fn local_versions(
        &self,
        repository: &Repository,
        gav: &Location,
    ) -> MavenResult<Vec<String>> {
        let details = match repository.storage.get_file_details(gav).await {
            Ok(details) => details,
            Err(depot_storage::StorageError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let FileDetails::Directory(listing) = details else {
            return Err(MavenError::BadRequest(format!("{gav} is not a directory")));
        };

        Ok(listing
            .files
            .iter()
            .filter(|entry| entry.is_directory())
            .map(|entry| entry.name().to_string())
            .collect())
    }

    async fn remote_versions(
        &self,
        repository: &Repository,
        proxy: &ProxyService,
        gav: &Location,
    ) -> MavenResult<Vec<String>> {
        let target = gav.join(METADATA_FILE)?;
        let content = proxy.find_remote_file(repository, &target).await?;
        let text = std::str::from_utf8(&content)
            .map_err(|e| MavenError::NotFound(format!("proxied metadata is not UTF-8: {e}")))?;
        Ok(Metadata::from_xml(text)?.versions().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::config::{RepositoryConfig, StorageConfig};
    use depot_core::{Snapshot, SnapshotVersion, SnapshotVersions, Versioning, Versions};
    use std::time::Duration;

    fn location(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    async fn memory_repository() -> Repository {
        let config = RepositoryConfig {
            storage: StorageConfig::Memory { quota: None },
            ..RepositoryConfig::default()
        };
        Repository::from_config(
            "releases",
            &config,
            std::path::Path::new("/unused"),
            Duration::from_secs(60),
        )
        .await
        .unwrap()
    }

    async fn deploy(repository: &Repository, path: &str) {
        repository
            .storage
            .put_file(&location(path), Bytes::from("x"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn versions_come_from_directories_sorted_ascending() {
        let repository = memory_repository().await;
        let service = MetadataService;
        let gav = location("com/example/app");

        deploy(&repository, "com/example/app/1.0.10/app-1.0.10.jar").await;
        deploy(&repository, "com/example/app/1.0.2/app-1.0.2.jar").await;
        deploy(&repository, "com/example/app/1.0.2-SNAPSHOT/app.jar").await;
        deploy(&repository, "com/example/app/maven-metadata.xml").await;

        let versions = service
            .find_versions(&repository, None, &gav, None)
            .await
            .unwrap();
        assert_eq!(versions, vec!["1.0.2-SNAPSHOT", "1.0.2", "1.0.10"]);

        let latest = service
            .find_latest(&repository, None, &gav, None)
            .await
            .unwrap();
        assert_eq!(latest, "1.0.10");
    }

    #[tokio::test]
    async fn filter_keeps_matching_versions() {
        let repository = memory_repository().await;
        let service = MetadataService;
        let gav = location("com/example/app");

        deploy(&repository, "com/example/app/1.0.2/app.jar").await;
        deploy(&repository, "com/example/app/2.0.0/app.jar").await;

        let versions = service
            .find_versions(&repository, None, &gav, Some("1."))
            .await
            .unwrap();
        assert_eq!(versions, vec!["1.0.2"]);

        let latest = service
            .find_latest(&repository, None, &gav, Some("3."))
            .await;
        assert!(matches!(latest, Err(MavenError::NotFound(_))));
    }

    #[tokio::test]
    async fn metadata_roundtrip_through_storage() {
        let repository = memory_repository().await;
        let service = MetadataService;
        let gav = location("com/example/app");

        let metadata = Metadata {
            group_id: Some("com.example".to_string()),
            artifact_id: Some("app".to_string()),
            version: None,
            versioning: Some(Versioning {
                versions: Some(Versions {
                    versions: vec!["1.0.1".to_string(), "1.0.0".to_string()],
                }),
                ..Versioning::default()
            }),
        };

        let saved = service
            .save_metadata(&repository, &gav, metadata)
            .await
            .unwrap();
        assert_eq!(
            saved.versioning.as_ref().unwrap().latest.as_deref(),
            Some("1.0.1")
        );

        // Saving stamps lastUpdated in Maven's yyyyMMddHHmmss form.
        let stamp = saved
            .versioning
            .as_ref()
            .unwrap()
            .last_updated
            .clone()
            .unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));

        let read_back = service.find_metadata(&repository, &gav).await.unwrap();
        assert_eq!(read_back.versions(), &["1.0.0", "1.0.1"]);
        assert_eq!(
            read_back.versioning.as_ref().unwrap().last_updated,
            Some(stamp)
        );
    }

    #[tokio::test]
    async fn snapshot_resolution_matches_extension_and_classifier() {
        let repository = memory_repository().await;
        let service = MetadataService;
        let gav = location("com/example/app/1.0.0-SNAPSHOT");

        let metadata = Metadata {
            group_id: Some("com.example".to_string()),
            artifact_id: Some("app".to_string()),
            version: Some("1.0.0-SNAPSHOT".to_string()),
            versioning: Some(Versioning {
                snapshot: Some(Snapshot {
                    timestamp: Some("20240102.030405".to_string()),
                    build_number: Some(3),
                    local_copy: None,
                }),
                snapshot_versions: Some(SnapshotVersions {
                    snapshot_versions: vec![
                        SnapshotVersion {
                            extension: Some("jar".to_string()),
                            classifier: None,
                            value: Some("1.0.0-20240102.030405-3".to_string()),
                            updated: None,
                        },
                        SnapshotVersion {
                            extension: Some("jar".to_string()),
                            classifier: Some("sources".to_string()),
                            value: Some("1.0.0-20240102.030405-3".to_string()),
                            updated: None,
                        },
                    ],
                }),
                ..Versioning::default()
            }),
        };
        service
            .save_metadata(&repository, &gav, metadata)
            .await
            .unwrap();

        let value = service
            .resolve_snapshot(&repository, &gav, "jar", None)
            .await
            .unwrap();
        assert_eq!(value, "1.0.0-20240102.030405-3");

        let sources = service
            .resolve_snapshot(&repository, &gav, "jar", Some("sources"))
            .await
            .unwrap();
        assert_eq!(sources, "1.0.0-20240102.030405-3");

        let missing = service
            .resolve_snapshot(&repository, &gav, "war", None)
            .await;
        assert!(matches!(missing, Err(MavenError::NotFound(_))));
    }
}
