//! Authentication middleware.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use depot_core::AccessToken;
use sha2::{Digest, Sha256};

/// Authenticated request extension. Absent on anonymous requests.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    /// The resolved token.
    pub token: AccessToken,
}

/// Parse a `Basic` authorization header into name and secret.
/// Per RFC 7617, the scheme is case-insensitive.
fn parse_basic(header: &str) -> Option<(String, String)> {
    if header.len() < 6 || !header[..6].eq_ignore_ascii_case("basic ") {
        return None;
    }
    let decoded = STANDARD.decode(header[6..].trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (name, secret) = decoded.split_once(':')?;
    Some((name.to_string(), secret.to_string()))
}

/// Hash a token secret for comparison against stored digests.
fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Authentication middleware that resolves configured tokens.
///
/// Requests without an `Authorization` header pass through anonymously;
/// per-route access rules decide what anonymous requests may do. A header
/// that fails to resolve is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(value) = req.headers().get(AUTHORIZATION) {
        let header = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("malformed authorization header".to_string()))?;
        let (name, secret) = parse_basic(header).ok_or_else(|| {
            ApiError::Unauthorized("only basic authentication is supported".to_string())
        })?;

        let secret_hash = hash_secret(&secret);
        let resolved = state
            .tokens
            .iter()
            .find(|token| token.name == name && token.secret_hash == secret_hash)
            .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

        tracing::debug!(token = %resolved.name, "request authenticated");
        req.extensions_mut().insert(AuthenticatedUser {
            token: resolved.token.clone(),
        });
    }

    Ok(next.run(req).await)
}
