//! Configured repository instances.

use crate::error::{MavenError, MavenResult};
use bytes::Bytes;
use depot_core::config::{ProxiedHostConfig, ProxyCredentials, RepositoryConfig, RepositoryVisibility};
use depot_core::Location;
use depot_storage::StorageProvider;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A named, configured view over one storage provider.
///
/// Repositories are built from configuration and replaced wholesale on
/// reload, never mutated in place.
pub struct Repository {
    pub id: String,
    pub visibility: RepositoryVisibility,
    pub redeployment: bool,
    pub preserve_snapshots: bool,
    pub storage: Arc<dyn StorageProvider>,
    pub proxied: Vec<ProxiedHost>,
}

impl Repository {
    pub async fn from_config(
        id: &str,
        config: &RepositoryConfig,
        working_directory: &Path,
        lock_lifetime: Duration,
    ) -> MavenResult<Self> {
        let storage =
            depot_storage::from_config(&config.storage, working_directory, id, lock_lifetime)
                .await?;

        let mut proxied = Vec::with_capacity(config.proxied.len());
        for host in &config.proxied {
            proxied.push(ProxiedHost::from_config(host)?);
        }

        Ok(Self {
            id: id.to_string(),
            visibility: config.visibility,
            redeployment: config.redeployment,
            preserve_snapshots: config.preserve_snapshots,
            storage,
            proxied,
        })
    }

    pub fn is_private(&self) -> bool {
        self.visibility == RepositoryVisibility::Private
    }

    pub async fn shutdown(&self) {
        self.storage.shutdown().await;
    }
}

/// Where a proxied host points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProxyReference {
    /// Another repository on this server, by id.
    Local(String),
    /// A remote HTTP endpoint.
    Remote(String),
}

impl ProxyReference {
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::Remote(reference.trim_end_matches('/').to_string())
        } else {
            Self::Local(reference.to_string())
        }
    }
}

/// A single proxied upstream with its fetch policy.
pub struct ProxiedHost {
    pub reference: ProxyReference,
    pub store: bool,
    allowed_groups: Vec<Location>,
    authorization: Option<ProxyCredentials>,
    /// Present for remote references only.
    client: Option<reqwest::Client>,
}

impl ProxiedHost {
    pub fn from_config(config: &ProxiedHostConfig) -> MavenResult<Self> {
        let reference = ProxyReference::parse(&config.reference);
        let client = match &reference {
            ProxyReference::Remote(_) => Some(
                reqwest::Client::builder()
                    .connect_timeout(config.connect_timeout())
                    .timeout(config.read_timeout())
                    .build()
                    .map_err(|e| MavenError::Internal(format!("proxy client setup: {e}")))?,
            ),
            ProxyReference::Local(_) => None,
        };

        let mut allowed_groups = Vec::with_capacity(config.allowed_groups.len());
        for group in &config.allowed_groups {
            // Groups are configured in dotted form, matched as path prefixes.
            allowed_groups.push(Location::parse(&group.replace('.', "/"))?);
        }

        Ok(Self {
            reference,
            store: config.store,
            allowed_groups,
            authorization: config.authorization.clone(),
            client,
        })
    }

    /// Whether this host serves the given artifact path.
    pub fn allows(&self, gav: &Location) -> bool {
        self.allowed_groups.is_empty()
            || self.allowed_groups.iter().any(|group| gav.starts_with(group))
    }

    /// Fetch a file from the remote endpoint.
    pub async fn fetch(&self, gav: &Location) -> MavenResult<Bytes> {
        let (client, url) = self.remote(gav)?;
        let mut request = client.get(&url);
        if let Some(credentials) = &self.authorization {
            request = request.basic_auth(&credentials.login, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| MavenError::NotFound(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(MavenError::NotFound(format!(
                "{url}: status {}",
                response.status()
            )));
        }
        response
            .bytes()
            .await
            .map_err(|e| MavenError::NotFound(format!("{url}: {e}")))
    }

    /// Probe a remote file's existence and size without fetching content.
    pub async fn fetch_size(&self, gav: &Location) -> MavenResult<u64> {
        let (client, url) = self.remote(gav)?;
        let mut request = client.head(&url);
        if let Some(credentials) = &self.authorization {
            request = request.basic_auth(&credentials.login, Some(&credentials.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| MavenError::NotFound(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(MavenError::NotFound(format!(
                "{url}: status {}",
                response.status()
            )));
        }
        Ok(response.content_length().unwrap_or(0))
    }

    fn remote(&self, gav: &Location) -> MavenResult<(&reqwest::Client, String)> {
        let (ProxyReference::Remote(base), Some(client)) = (&self.reference, &self.client) else {
            return Err(MavenError::Internal(
                "fetch on a local proxy reference".to_string(),
            ));
        };
        Ok((client, format!("{base}/{gav}")))
    }
}
