//! HTTP router construction.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::api;
use crate::state::AppState;

/// Assemble all routes and middleware into the application router.
///
/// `/data` serves the artifact directory directly; consumers read the
/// published JSON files without touching the sync engine.
pub fn build_router(state: Arc<AppState>) -> Router {
    let artifacts = ServeDir::new(&state.artifact_dir);
    Router::new()
        .route("/health", get(api::health))
        .route("/update", get(api::update_index).post(api::update_all))
        .route("/update/{feed}", get(api::update_feed).post(api::update_feed))
        .nest_service("/data", artifacts)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
