//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers)
        .route("/api/health", get(handlers::health_check))
        .route("/api/maven/repositories", get(handlers::list_repositories))
        .route(
            "/api/maven/details/{repository}/{*gav}",
            get(handlers::get_details),
        )
        .route(
            "/api/maven/versions/{repository}/{*gav}",
            get(handlers::get_versions),
        )
        .route(
            "/api/maven/latest/{repository}/{*gav}",
            get(handlers::get_latest),
        );

    let maven_routes = Router::new()
        .route("/", get(handlers::list_repositories))
        .route("/{repository}", get(handlers::get_repository_root))
        .route(
            "/{repository}/{*gav}",
            get(handlers::get_resource)
                .put(handlers::deploy_resource)
                .delete(handlers::delete_resource),
        );

    // Static /api segments take precedence over the {repository} capture,
    // so a repository named "api" would be unreachable.
    Router::new()
        .merge(api_routes)
        .merge(maven_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
