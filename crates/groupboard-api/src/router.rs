//! Axum router construction for the API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled so a separately hosted client page can call it.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/session` -- `WebSocket` session stream
/// - `GET /api/health` -- liveness and counters
/// - `GET /api/session` -- current session snapshot
/// - `POST /api/create-session`, `/api/update-settings`, `/api/reset-members`
/// - `POST /api/join`, `/api/remove-member`
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/session", get(ws::ws_session))
        // Reads
        .route("/api/health", get(handlers::health))
        .route("/api/session", get(handlers::get_session))
        // Participant operations
        .route("/api/join", post(handlers::join))
        // Admin operations
        .route("/api/create-session", post(handlers::create_session))
        .route("/api/update-settings", post(handlers::update_settings))
        .route("/api/reset-members", post(handlers::reset_members))
        .route("/api/remove-member", post(handlers::remove_member))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
