//! Per-connection delivery endpoints.

use std::sync::Arc;

use tokio::sync::mpsc;

use realty_proto::ChangeEvent;

use crate::error::DeliveryError;

/// Receiving half of a [`ChannelSink`], drained by the connection's writer.
pub type EventReceiver = mpsc::Receiver<Arc<ChangeEvent>>;

/// Something that can accept an event on behalf of one connection.
///
/// `send` must not block: implementations enqueue and return.
pub trait ConnectionSink: Send + Sync {
    fn send(&self, event: &Arc<ChangeEvent>) -> Result<(), DeliveryError>;
}

/// Sink backed by a bounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<ChangeEvent>>,
}

impl ChannelSink {
    /// Create a sink with room for `capacity` undelivered events.
    pub fn channel(capacity: usize) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ConnectionSink for ChannelSink {
    fn send(&self, event: &Arc<ChangeEvent>) -> Result<(), DeliveryError> {
        self.tx.try_send(Arc::clone(event)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
