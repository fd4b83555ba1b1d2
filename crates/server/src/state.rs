//! Shared application state.

use depot_core::config::AppConfig;
use depot_core::{AccessToken, Location, Route};
use depot_maven::MavenFacade;
use std::sync::Arc;

/// A configured token resolved into its runtime form: the stored secret
/// digest plus the access token handed to authenticated requests.
#[derive(Clone)]
pub struct ResolvedToken {
    pub name: String,
    /// Lowercase SHA-256 hex digest of the token secret.
    pub secret_hash: String,
    pub token: AccessToken,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub facade: Arc<MavenFacade>,
    pub tokens: Arc<Vec<ResolvedToken>>,
}

impl AppState {
    /// Build state from a validated configuration and an initialized facade.
    pub fn new(config: AppConfig, facade: Arc<MavenFacade>) -> depot_core::Result<Self> {
        let tokens = resolve_tokens(&config)?;
        Ok(Self {
            config: Arc::new(config),
            facade,
            tokens: Arc::new(tokens),
        })
    }
}

fn resolve_tokens(config: &AppConfig) -> depot_core::Result<Vec<ResolvedToken>> {
    config
        .tokens
        .iter()
        .map(|token| {
            let routes = token
                .routes
                .iter()
                .map(|route| Ok(Route::new(Location::parse(&route.path)?, route.permission)))
                .collect::<depot_core::Result<Vec<_>>>()?;
            Ok(ResolvedToken {
                name: token.name.clone(),
                secret_hash: token.secret_hash.to_ascii_lowercase(),
                token: AccessToken::new(&token.name, routes),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::RoutePermission;
    use depot_core::config::{RouteConfig, TokenConfig};

    #[test]
    fn tokens_resolve_routes_and_normalize_hash_case() {
        let mut config = AppConfig::default();
        config.tokens.push(TokenConfig {
            name: "deployer".to_string(),
            secret_hash: "ABC123".repeat(10) + "ABCD",
            routes: vec![RouteConfig {
                path: "releases/com/example".to_string(),
                permission: RoutePermission::Write,
            }],
        });

        let tokens = resolve_tokens(&config).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].secret_hash, "abc123".repeat(10) + "abcd");
        assert!(
            tokens[0]
                .token
                .can_write(&Location::parse("releases/com/example/app/1.0.0/app.jar").unwrap())
        );
    }

    #[test]
    fn invalid_route_path_is_rejected() {
        let mut config = AppConfig::default();
        config.tokens.push(TokenConfig {
            name: "bad".to_string(),
            secret_hash: "0".repeat(64),
            routes: vec![RouteConfig {
                path: "releases/../escape".to_string(),
                permission: RoutePermission::Read,
            }],
        });
        assert!(resolve_tokens(&config).is_err());
    }
}
