#![forbid(unsafe_code)]

//! HTTP presentation layer: routes, wire DTOs, and error-to-status mapping
//! over the progress service.

pub mod error;
mod handlers;
mod responses;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use services::ProgressService;

/// Builds the JSON API router.
///
/// CORS is wide open so the lesson pages can be served from anywhere.
pub fn router(service: Arc<ProgressService>) -> Router {
    Router::new()
        .route("/api/users", post(handlers::enroll_user))
        .route(
            "/api/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/api/users/{id}/complete/{day}", post(handlers::complete_day))
        .route("/api/global-count/{day}", get(handlers::day_count))
        .route("/api/global-counts", get(handlers::all_counts))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serves the lesson pages for every path the API does not claim.
pub fn with_static_assets(router: Router, assets_dir: impl AsRef<Path>) -> Router {
    router.fallback_service(ServeDir::new(assets_dir))
}
