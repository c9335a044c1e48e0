//! HTTP route handlers.

pub mod health;
pub mod listings;
pub mod realtime;

use realty_proto::Stream;

use crate::error::AppError;

/// Resolve a `:stream` path segment. Unknown names are 404s.
pub(crate) fn stream(segment: &str) -> Result<Stream, AppError> {
    segment.parse::<Stream>().map_err(AppError::from)
}
