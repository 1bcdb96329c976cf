//! Route definitions for the API.

use axum::{routing::get, Router};

use super::handlers;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        // Health endpoint (no auth, fixed response)
        .route("/health", get(handlers::health::health_check))
        // Download surface
        .nest("/download", handlers::downloads::router())
        // Metadata + management API
        .nest("/api/resolve", handlers::downloads::resolve_router())
        .nest("/api/assets", handlers::assets::router(max_upload_bytes))
        .nest("/api/releases", handlers::releases::router())
        .with_state(state)
}
