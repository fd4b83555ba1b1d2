//! Repository registry with hot reload.

use crate::error::{MavenError, MavenResult};
use crate::repository::Repository;
use crate::security::RepositorySecurityProvider;
use depot_core::config::AppConfig;
use depot_core::{AccessToken, DirectoryInfo, FileDetails, Location, SimpleDirectoryInfo};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

type Registry = Arc<HashMap<String, Arc<Repository>>>;

/// Owns the set of configured repositories.
///
/// The registry is an immutable snapshot behind a pointer; reload builds a
/// fresh set, swaps the pointer, then shuts the old repositories down.
/// Readers see either the fully-old or the fully-new set, never a mix.
pub struct RepositoryService {
    repositories: RwLock<Registry>,
    security: RepositorySecurityProvider,
    working_directory: PathBuf,
    lock_lifetime: Duration,
}

impl RepositoryService {
    /// Build the registry from configuration.
    pub async fn load(config: &AppConfig) -> MavenResult<Self> {
        let working_directory = config.server.working_directory.clone();
        let lock_lifetime = config.server.lock_lifetime();
        let registry = Self::build(config, &working_directory, lock_lifetime).await?;

        Ok(Self {
            repositories: RwLock::new(registry),
            security: RepositorySecurityProvider,
            working_directory,
            lock_lifetime,
        })
    }

    async fn build(
        config: &AppConfig,
        working_directory: &std::path::Path,
        lock_lifetime: Duration,
    ) -> MavenResult<Registry> {
        let mut repositories = HashMap::with_capacity(config.repositories.len());
        for (id, repository_config) in &config.repositories {
            let repository =
                Repository::from_config(id, repository_config, working_directory, lock_lifetime)
                    .await?;
            info!(repository = %id, backend = repository.storage.backend_name(), "repository ready");
            repositories.insert(id.clone(), Arc::new(repository));
        }
        Ok(Arc::new(repositories))
    }

    /// Replace the registry with one built from the new configuration.
    /// Old repositories are shut down after the swap.
    pub async fn reload(&self, config: &AppConfig) -> MavenResult<()> {
        let fresh = Self::build(config, &self.working_directory, self.lock_lifetime).await?;

        let previous = {
            let mut registry = self.repositories.write().await;
            std::mem::replace(&mut *registry, fresh)
        };

        for repository in previous.values() {
            repository.shutdown().await;
        }
        info!(repositories = config.repositories.len(), "registry reloaded");
        Ok(())
    }

    /// Current registry snapshot.
    pub async fn snapshot(&self) -> Registry {
        self.repositories.read().await.clone()
    }

    pub async fn get_repository(&self, id: &str) -> Option<Arc<Repository>> {
        self.repositories.read().await.get(id).cloned()
    }

    pub async fn find_repository(&self, id: &str) -> MavenResult<Arc<Repository>> {
        self.get_repository(id)
            .await
            .ok_or_else(|| MavenError::NotFound(format!("repository not found: {id}")))
    }

    /// Top-level listing of repositories visible to the token.
    pub async fn get_root_directory(&self, token: Option<&AccessToken>) -> DirectoryInfo {
        let registry = self.snapshot().await;
        let visible = registry
            .values()
            .filter(|repository| {
                self.security
                    .can_browse_resource(token, repository, &Location::root())
                    .is_ok()
            })
            .map(|repository| {
                FileDetails::SimpleDirectory(SimpleDirectoryInfo {
                    name: repository.id.clone(),
                })
            })
            .collect();
        DirectoryInfo::new("", visible)
    }

    pub fn security(&self) -> &RepositorySecurityProvider {
        &self.security
    }

    /// Shut down all repositories. Used on server exit.
    pub async fn shutdown(&self) {
        let registry = self.snapshot().await;
        for repository in registry.values() {
            repository.shutdown().await;
        }
    }
}
