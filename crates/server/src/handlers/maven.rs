//! Maven protocol endpoints (download, deploy, delete, browsing).

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use depot_core::Location;
use depot_maven::{DeleteRequest, DeployRequest, LookupRequest, MavenError};

fn parse_gav(raw: &str) -> ApiResult<Location> {
    Location::parse(raw).map_err(|e| ApiError::from(MavenError::from(e)))
}

fn lookup_request(
    repository: String,
    gav: Location,
    user: Option<&AuthenticatedUser>,
) -> LookupRequest {
    LookupRequest {
        repository,
        gav,
        token: user.map(|u| u.token.clone()),
    }
}

async fn serve_resource(
    state: &AppState,
    repository: String,
    gav: Location,
    user: Option<&AuthenticatedUser>,
) -> ApiResult<Response> {
    let request = lookup_request(repository, gav, user);
    match state.facade.find_file(&request).await {
        Ok((info, stream)) => Ok((
            StatusCode::OK,
            [
                (CONTENT_TYPE, info.content_type),
                (CONTENT_LENGTH, info.content_length.to_string()),
            ],
            Body::from_stream(stream),
        )
            .into_response()),
        // The path names a directory; serve its listing instead.
        Err(MavenError::BadRequest(_)) => {
            let details = state.facade.find_details(&request).await?;
            Ok(Json(details).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /{repository}/{*gav} - a file's content, or a directory listing
/// when the path names a directory.
pub async fn get_resource(
    State(state): State<AppState>,
    Path((repository, gav)): Path<(String, String)>,
    user: Option<Extension<AuthenticatedUser>>,
) -> ApiResult<Response> {
    let gav = parse_gav(&gav)?;
    serve_resource(&state, repository, gav, user.as_deref()).await
}

/// GET /{repository} - the repository's root directory listing.
pub async fn get_repository_root(
    State(state): State<AppState>,
    Path(repository): Path<String>,
    user: Option<Extension<AuthenticatedUser>>,
) -> ApiResult<Response> {
    serve_resource(&state, repository, Location::root(), user.as_deref()).await
}

/// PUT /{repository}/{*gav} - deploy an artifact. Requires a token with
/// write permission on the path.
pub async fn deploy_resource(
    State(state): State<AppState>,
    Path((repository, gav)): Path<(String, String)>,
    user: Option<Extension<AuthenticatedUser>>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let gav = parse_gav(&gav)?;
    let token = user.as_deref().map(|u| &u.token);

    let repo = state
        .facade
        .repositories()
        .find_repository(&repository)
        .await?;
    state
        .facade
        .repositories()
        .security()
        .can_modify_resource(token, &repo, &gav)?;

    state
        .facade
        .deploy_file(&DeployRequest {
            repository,
            gav,
            // can_modify_resource rejected anonymous requests above.
            by: token.map(|t| t.name.clone()).unwrap_or_default(),
            content: body,
        })
        .await?;
    Ok(StatusCode::OK)
}

/// DELETE /{repository}/{*gav} - remove a file or directory. Requires a
/// token with write permission on the path.
pub async fn delete_resource(
    State(state): State<AppState>,
    Path((repository, gav)): Path<(String, String)>,
    user: Option<Extension<AuthenticatedUser>>,
) -> ApiResult<StatusCode> {
    let request = DeleteRequest {
        repository,
        gav: parse_gav(&gav)?,
        token: user.map(|Extension(u)| u.token),
    };
    state.facade.delete_file(&request).await?;
    Ok(StatusCode::NO_CONTENT)
}
