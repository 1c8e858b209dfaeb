//! Axum router construction.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! browser client and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete router.
///
/// - `GET /health`
/// - `GET /api/config`
/// - `POST /api/players`
/// - `GET /api/players/{id}/state`
/// - `PUT /api/players/{id}/state`
/// - `POST /api/players/{id}/actions`
/// - `POST /api/players/{id}/selection`
/// - `POST /api/players/{id}/reset`
/// - `DELETE /api/players/{id}`
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/config", get(handlers::get_config))
        .route("/api/players", post(handlers::create_player))
        .route("/api/players/{id}", delete(handlers::delete_player))
        .route(
            "/api/players/{id}/state",
            get(handlers::get_state).put(handlers::put_state),
        )
        .route("/api/players/{id}/actions", post(handlers::post_action))
        .route("/api/players/{id}/selection", post(handlers::select_item))
        .route("/api/players/{id}/reset", post(handlers::reset_player))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
