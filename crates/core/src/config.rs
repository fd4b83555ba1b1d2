//! Configuration types shared across crates.

use crate::token::RoutePermission;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Working directory for repository storage roots.
    #[serde(default = "default_working_directory")]
    pub working_directory: PathBuf,
    /// Idle lifetime in seconds for per-location file locks.
    #[serde(default = "default_lock_lifetime_secs")]
    pub lock_lifetime_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_working_directory() -> PathBuf {
    PathBuf::from("./data")
}

fn default_lock_lifetime_secs() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            working_directory: default_working_directory(),
            lock_lifetime_secs: default_lock_lifetime_secs(),
        }
    }
}

impl ServerConfig {
    pub fn lock_lifetime(&self) -> Duration {
        Duration::from_secs(self.lock_lifetime_secs)
    }
}

/// Repository visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryVisibility {
    /// Anonymous read access is allowed.
    #[default]
    Public,
    /// All access requires a token with a matching route.
    Private,
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory. Defaults to
        /// `{working_directory}/repositories/{repository_id}` when unset.
        #[serde(default)]
        path: Option<PathBuf>,
        /// Storage quota in bytes. Unlimited when unset.
        #[serde(default)]
        quota: Option<u64>,
    },
    /// In-memory storage (testing and ephemeral repositories).
    Memory {
        /// Storage quota in bytes. Unlimited when unset.
        #[serde(default)]
        quota: Option<u64>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: None,
            quota: None,
        }
    }
}

/// Configuration of a single repository.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub visibility: RepositoryVisibility,
    /// Whether an existing (non-metadata) file may be overwritten.
    #[serde(default)]
    pub redeployment: bool,
    /// Keep deprecated snapshot build files instead of pruning them.
    #[serde(default)]
    pub preserve_snapshots: bool,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upstream repositories consulted on local miss, in order.
    #[serde(default)]
    pub proxied: Vec<ProxiedHostConfig>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            visibility: RepositoryVisibility::Public,
            redeployment: false,
            preserve_snapshots: false,
            storage: StorageConfig::default(),
            proxied: Vec::new(),
        }
    }
}

/// Configuration of a proxied upstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxiedHostConfig {
    /// Either the id of another local repository or a remote URL.
    pub reference: String,
    /// Store fetched artifacts locally.
    #[serde(default)]
    pub store: bool,
    /// Connection establishment timeout.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Response read timeout.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Credentials for the remote host.
    #[serde(default)]
    pub authorization: Option<ProxyCredentials>,
    /// Allowed artifact groups (e.g., "com.example"). Empty means all.
    #[serde(default)]
    pub allowed_groups: Vec<String>,
}

fn default_connect_timeout_secs() -> u64 {
    3
}

fn default_read_timeout_secs() -> u64 {
    15
}

impl ProxiedHostConfig {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            store: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            authorization: None,
            allowed_groups: Vec::new(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Basic credentials for a proxied host.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyCredentials {
    pub login: String,
    pub password: String,
}

/// A statically configured access token.
///
/// The secret is stored as a SHA-256 hex digest, never in the clear.
/// Generate with: `echo -n "your-secret" | sha256sum`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    /// SHA-256 hex digest of the token secret (64 characters).
    pub secret_hash: String,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// A route grant in token configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path prefix in `{repository}/{gav}` space.
    pub path: String,
    pub permission: RoutePermission,
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Repositories by id. Iteration order is the listing order.
    #[serde(default = "default_repositories")]
    pub repositories: BTreeMap<String, RepositoryConfig>,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

fn default_repositories() -> BTreeMap<String, RepositoryConfig> {
    BTreeMap::from([
        ("releases".to_string(), RepositoryConfig::default()),
        ("snapshots".to_string(), RepositoryConfig::default()),
        (
            "private".to_string(),
            RepositoryConfig {
                visibility: RepositoryVisibility::Private,
                ..RepositoryConfig::default()
            },
        ),
    ])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            repositories: default_repositories(),
            tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        for token in &self.tokens {
            if token.secret_hash.len() != 64
                || !token.secret_hash.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(format!(
                    "token '{}': secret_hash must be a SHA-256 hex digest (64 hex characters)",
                    token.name
                ));
            }
        }
        for (id, repository) in &self.repositories {
            if id.is_empty() || id.contains('/') {
                return Err(format!("invalid repository id: {id:?}"));
            }
            for proxied in &repository.proxied {
                if proxied.reference.is_empty() {
                    return Err(format!("repository '{id}': empty proxy reference"));
                }
            }
        }
        Ok(())
    }
}
