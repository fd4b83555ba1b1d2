//! Management API endpoints.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use depot_core::{DirectoryInfo, FileDetails, Location};
use depot_maven::{LookupRequest, MavenError, VersionLookupRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Query parameters for version lookups.
#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    /// Keep only versions starting with this prefix.
    pub filter: Option<String>,
}

/// Version listing response.
#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    pub versions: Vec<String>,
}

/// Latest version response.
#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub version: String,
}

fn parse_gav(raw: &str) -> ApiResult<Location> {
    Location::parse(raw).map_err(|e| ApiError::from(MavenError::from(e)))
}

/// GET /api/health - liveness probe, intentionally unauthenticated.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/maven/repositories - repositories visible to the caller.
pub async fn list_repositories(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Json<DirectoryInfo> {
    let token = user.as_deref().map(|u| &u.token);
    Json(state.facade.find_repositories(token).await)
}

/// GET /api/maven/details/{repository}/{*gav} - file or directory details.
pub async fn get_details(
    State(state): State<AppState>,
    Path((repository, gav)): Path<(String, String)>,
    user: Option<Extension<AuthenticatedUser>>,
) -> ApiResult<Json<FileDetails>> {
    let request = LookupRequest {
        repository,
        gav: parse_gav(&gav)?,
        token: user.map(|Extension(u)| u.token),
    };
    Ok(Json(state.facade.find_details(&request).await?))
}

/// GET /api/maven/versions/{repository}/{*gav} - all versions of a GAV,
/// ascending, merged with proxied metadata.
pub async fn get_versions(
    State(state): State<AppState>,
    Path((repository, gav)): Path<(String, String)>,
    Query(query): Query<VersionQuery>,
    user: Option<Extension<AuthenticatedUser>>,
) -> ApiResult<Json<VersionsResponse>> {
    let request = VersionLookupRequest {
        repository,
        gav: parse_gav(&gav)?,
        token: user.map(|Extension(u)| u.token),
        filter: query.filter,
    };
    let versions = state.facade.find_versions(&request).await?;
    Ok(Json(VersionsResponse { versions }))
}

/// GET /api/maven/latest/{repository}/{*gav} - the highest version of a GAV.
pub async fn get_latest(
    State(state): State<AppState>,
    Path((repository, gav)): Path<(String, String)>,
    Query(query): Query<VersionQuery>,
    user: Option<Extension<AuthenticatedUser>>,
) -> ApiResult<Json<LatestResponse>> {
    let request = VersionLookupRequest {
        repository,
        gav: parse_gav(&gav)?,
        token: user.map(|Extension(u)| u.token),
        filter: query.filter,
    };
    let version = state.facade.find_latest(&request).await?;
    Ok(Json(LatestResponse { version }))
}
