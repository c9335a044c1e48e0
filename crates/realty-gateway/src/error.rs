//! Error handling for the gateway.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use realty_proto::ValidationError;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown stream or entity.
    #[error("{0}")]
    NotFound(String),

    /// The data layer failed.
    #[error("{0}")]
    Store(String),

    /// The data layer did not answer in time.
    #[error("data store timed out")]
    Timeout,

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: &'static str,
    /// Error message.
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Store(_) => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "STORE_TIMEOUT"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: true,
            code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<realty_client::Error> for AppError {
    fn from(err: realty_client::Error) -> Self {
        match err {
            realty_client::Error::NotFound { .. } => AppError::NotFound(err.to_string()),
            realty_client::Error::InvalidPayload(msg) => AppError::BadRequest(msg),
            other => AppError::Store(other.to_string()),
        }
    }
}

impl From<realty_proto::Error> for AppError {
    fn from(err: realty_proto::Error) -> Self {
        match err {
            realty_proto::Error::UnknownStream(_) => AppError::NotFound(err.to_string()),
            realty_proto::Error::Validation(e) => AppError::Validation(e),
            other => AppError::Store(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
