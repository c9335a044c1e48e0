//! Protocol error types.

use thiserror::Error;

use crate::stream::Stream;

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A stream name outside the known set.
    #[error("unknown stream: {0}")]
    UnknownStream(String),

    /// A data-layer row that does not decode into a snapshot.
    #[error("invalid {stream} snapshot: {message}")]
    InvalidSnapshot { stream: Stream, message: String },

    /// Payload validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Payload validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The payload does not have the expected shape.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// A field is present but violates its rule.
    #[error("invalid field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
