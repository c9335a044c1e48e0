//! CRUD endpoints for the three streams.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use realty_proto::Entity;

use super::stream;
use crate::error::AppError;
use crate::AppState;

/// Listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/:stream", get(list).post(create))
        .route("/api/:stream/:id", get(fetch).patch(update))
}

async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Vec<Entity>>, AppError> {
    let stream = stream(&segment)?;
    Ok(Json(state.service.list(stream).await?))
}

async fn fetch(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
) -> Result<Json<Entity>, AppError> {
    let stream = stream(&segment)?;
    Ok(Json(state.service.get(stream, &id).await?))
}

async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Entity>), AppError> {
    let stream = stream(&segment)?;
    let Json(payload) = payload?;
    let entity = state.service.create(stream, payload).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn update(
    State(state): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Entity>, AppError> {
    let stream = stream(&segment)?;
    let Json(payload) = payload?;
    Ok(Json(state.service.update(stream, &id, payload).await?))
}
