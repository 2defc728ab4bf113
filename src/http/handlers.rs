//! Health and shutdown endpoints.

use axum::{extract::State, http::StatusCode};

use crate::http::server::AppState;

/// GET /health
///
/// Empty 200 while running. A request that reaches it in any other state
/// (a kept-alive connection during the drain) gets 503.
pub async fn health(State(state): State<AppState>) -> StatusCode {
    if state.server_state.is_running() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET|POST /shutdown
///
/// Fires the shutdown trigger and answers right away; the lifecycle
/// coordinator does the actual teardown.
pub async fn shutdown(State(state): State<AppState>) -> (StatusCode, &'static str) {
    state.shutdown.trigger();
    (StatusCode::OK, "shutting down\n")
}
