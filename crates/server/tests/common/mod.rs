//! Server test utilities.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use depot_core::RoutePermission;
use depot_core::config::{
    AppConfig, RepositoryConfig, RepositoryVisibility, RouteConfig, ServerConfig, TokenConfig,
};
use depot_maven::{InMemoryStatistics, MavenFacade, RepositoryService};
use depot_server::{AppState, create_router};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with temporary storage.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server with the standard test configuration.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    ///
    /// The base configuration has three repositories (`releases`,
    /// `snapshots` with redeployment, `private`) and three tokens:
    /// `admin` (write everywhere), `reader` (read on `private`), and
    /// `outsider` (read on `releases` only).
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("failed to create temp directory");

        let mut config = AppConfig {
            server: ServerConfig {
                working_directory: temp_dir.path().to_path_buf(),
                ..ServerConfig::default()
            },
            repositories: BTreeMap::from([
                ("releases".to_string(), RepositoryConfig::default()),
                (
                    "snapshots".to_string(),
                    RepositoryConfig {
                        redeployment: true,
                        ..RepositoryConfig::default()
                    },
                ),
                (
                    "private".to_string(),
                    RepositoryConfig {
                        visibility: RepositoryVisibility::Private,
                        ..RepositoryConfig::default()
                    },
                ),
            ]),
            tokens: vec![
                token_config(
                    "admin",
                    "admin-secret",
                    &[
                        ("releases", RoutePermission::Write),
                        ("snapshots", RoutePermission::Write),
                        ("private", RoutePermission::Write),
                    ],
                ),
                token_config(
                    "reader",
                    "reader-secret",
                    &[("private", RoutePermission::Read)],
                ),
                token_config(
                    "outsider",
                    "outsider-secret",
                    &[("releases", RoutePermission::Read)],
                ),
            ],
        };
        modifier(&mut config);
        config.validate().expect("invalid test configuration");

        let repositories = Arc::new(
            RepositoryService::load(&config)
                .await
                .expect("failed to load repositories"),
        );
        let facade = Arc::new(MavenFacade::new(
            repositories,
            Arc::new(InMemoryStatistics::new()),
        ));
        let state = AppState::new(config, facade).expect("invalid token configuration");
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }
}

/// Build a token entry whose stored digest matches the given secret.
#[allow(dead_code)]
pub fn token_config(name: &str, secret: &str, routes: &[(&str, RoutePermission)]) -> TokenConfig {
    TokenConfig {
        name: name.to_string(),
        secret_hash: sha256_hex(secret),
        routes: routes
            .iter()
            .map(|(path, permission)| RouteConfig {
                path: path.to_string(),
                permission: *permission,
            })
            .collect(),
    }
}

#[allow(dead_code)]
pub fn sha256_hex(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// `Authorization` header value for basic credentials.
#[allow(dead_code)]
pub fn basic_auth(name: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{name}:{secret}")))
}
