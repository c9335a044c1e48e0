//! Health and root endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use realty_proto::Stream;

use crate::error::AppError;
use crate::AppState;

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Data store kind (`memory` or `rest`).
    pub store: &'static str,
    /// Live websocket connections.
    pub connections: usize,
}

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(property_count))
        .route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        store: state.service.store_kind(),
        connections: state.dispatcher.connection_count(),
    })
}

/// Number of listed properties, as plain text.
async fn property_count(State(state): State<AppState>) -> Result<String, AppError> {
    Ok(state.service.count(Stream::Properties).await?.to_string())
}
