//! Delivery errors.

use thiserror::Error;

/// Why an event could not be handed to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The connection's outbound queue is full.
    #[error("outbound queue full")]
    QueueFull,

    /// The connection is gone.
    #[error("connection closed")]
    Closed,

    /// Transport-specific failure.
    #[error("transport error: {0}")]
    Transport(String),
}
