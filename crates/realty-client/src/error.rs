//! Data-layer error types.

use realty_proto::Stream;
use thiserror::Error;

/// Data-layer errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be completed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The database answered with a non-success status.
    #[error("database returned {status}: {message}")]
    Status { status: u16, message: String },

    /// No row with this id exists.
    #[error("{stream} {id} not found")]
    NotFound { stream: Stream, id: String },

    /// A write returned no representation.
    #[error("database returned no rows for {0}")]
    EmptyResponse(Stream),

    /// A returned row is not a valid snapshot.
    #[error("decode error: {0}")]
    Decode(#[from] realty_proto::Error),

    /// The payload handed to the store is not a JSON object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Store misconfiguration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(stream: Stream, id: impl Into<String>) -> Self {
        Error::NotFound {
            stream,
            id: id.into(),
        }
    }
}
