//! Change events and websocket envelopes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::Entity;
use crate::filter::Filter;
use crate::stream::Stream;

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
}

impl ChangeKind {
    fn prefix(self) -> &'static str {
        match self {
            ChangeKind::Created => "new",
            ChangeKind::Updated => "updated",
        }
    }

    /// Outbound event name, e.g. `new-property`.
    pub fn event_name(self, stream: Stream) -> String {
        format!("{}-{}", self.prefix(), stream.noun())
    }
}

/// A committed mutation, carrying the resulting snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Created or updated.
    pub kind: ChangeKind,
    /// Snapshot after the change, shared across recipients.
    pub entity: Arc<Entity>,
}

impl ChangeEvent {
    /// Wrap a committed snapshot.
    pub fn new(kind: ChangeKind, entity: Entity) -> Self {
        Self {
            kind,
            entity: Arc::new(entity),
        }
    }

    /// Event for a newly inserted entity.
    pub fn created(entity: Entity) -> Self {
        Self::new(ChangeKind::Created, entity)
    }

    /// Event for an updated entity.
    pub fn updated(entity: Entity) -> Self {
        Self::new(ChangeKind::Updated, entity)
    }

    /// Stream the entity belongs to.
    pub fn stream(&self) -> Stream {
        self.entity.stream()
    }

    /// Outbound event name for this change.
    pub fn event_name(&self) -> String {
        self.kind.event_name(self.stream())
    }

    /// Wire frame for this event.
    pub fn envelope(&self) -> Result<Envelope, serde_json::Error> {
        Ok(Envelope {
            event: self.event_name(),
            data: serde_json::to_value(self.entity.as_ref())?,
        })
    }
}

/// Frame exchanged over the websocket in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name, e.g. `new-property` or `properties-subscribe`.
    pub event: String,
    /// Snapshot or filter; absent data reads as `null`.
    #[serde(default)]
    pub data: Value,
}

/// A recognized client request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Subscribe { stream: Stream, filter: Filter },
    Unsubscribe { stream: Stream },
}

impl ClientMessage {
    /// Interpret an inbound envelope. Unknown event names yield `None`.
    pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
        let (stream, action) = envelope.event.rsplit_once('-')?;
        let stream = stream.parse::<Stream>().ok()?;

        match action {
            "subscribe" => Some(ClientMessage::Subscribe {
                stream,
                filter: Filter::from_json(&envelope.data),
            }),
            "unsubscribe" => Some(ClientMessage::Unsubscribe { stream }),
            _ => None,
        }
    }
}
