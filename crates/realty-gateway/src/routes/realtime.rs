//! Realtime endpoints.

use axum::{extract::State, routing::get, Json, Router};

use realty_core::RegistryStats;

use crate::ws::ws_handler;
use crate::AppState;

/// Realtime routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/realtime/stats", get(stats))
}

/// Connection and subscription counts.
async fn stats(State(state): State<AppState>) -> Json<RegistryStats> {
    Json(state.dispatcher.registry().stats())
}
