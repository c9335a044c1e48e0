//! Subscription registry.
//!
//! Tracks, per live connection, the current filter for each stream. A
//! missing slot means "not subscribed"; an empty filter means "everything".

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use realty_proto::{Filter, Stream};

/// Stable identifier of a client connection.
pub type ConnectionId = String;

/// Per-connection filter slots, indexed by [`Stream::index`].
#[derive(Debug, Default)]
struct Slots {
    filters: [Option<Arc<Filter>>; 3],
}

impl Slots {
    fn is_subscribed(&self, stream: Stream) -> bool {
        self.filters[stream.index()].is_some()
    }
}

/// A connection eligible for a dispatch on some stream.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Connection holding the filter.
    pub connection_id: ConnectionId,
    /// The connection's filter for the stream at snapshot time.
    pub filter: Arc<Filter>,
}

/// Point-in-time registry counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Registered connections, subscribed or not.
    pub connections: usize,
    /// Connections subscribed to `properties`.
    pub properties: usize,
    /// Connections subscribed to `realtors`.
    pub realtors: usize,
    /// Connections subscribed to `persons`.
    pub persons: usize,
}

/// Registry of live connections and their stream filters.
///
/// Mutations take the write lock for a single map operation; `candidates`
/// copies out `Arc` handles under the read lock, so no caller ever holds
/// the lock while delivering.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    connections: RwLock<HashMap<ConnectionId, Slots>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection with no subscriptions.
    ///
    /// Returns `false` if the connection was already registered.
    pub fn connect(&self, connection_id: impl Into<ConnectionId>) -> bool {
        let connection_id = connection_id.into();
        let mut connections = self.connections.write();
        if connections.contains_key(&connection_id) {
            return false;
        }
        connections.insert(connection_id, Slots::default());
        true
    }

    /// Install `filter` for `(connection, stream)`, replacing any previous one.
    ///
    /// No-op for connections that are not registered. Returns whether the
    /// filter was stored.
    pub fn subscribe(&self, connection_id: &str, stream: Stream, filter: Filter) -> bool {
        let stored = {
            let mut connections = self.connections.write();
            match connections.get_mut(connection_id) {
                Some(slots) => {
                    slots.filters[stream.index()] = Some(Arc::new(filter));
                    true
                }
                None => false,
            }
        };

        if stored {
            tracing::debug!(connection_id, stream = %stream, "filter installed");
        } else {
            tracing::debug!(connection_id, stream = %stream, "subscribe for unknown connection ignored");
        }
        stored
    }

    /// Drop the filter for `(connection, stream)`. Returns whether one existed.
    pub fn unsubscribe(&self, connection_id: &str, stream: Stream) -> bool {
        let removed = self
            .connections
            .write()
            .get_mut(connection_id)
            .and_then(|slots| slots.filters[stream.index()].take())
            .is_some();

        if removed {
            tracing::debug!(connection_id, stream = %stream, "filter removed");
        }
        removed
    }

    /// Forget a connection and every filter it holds. Idempotent.
    pub fn disconnect(&self, connection_id: &str) -> bool {
        let removed = self.connections.write().remove(connection_id).is_some();
        if removed {
            tracing::debug!(connection_id, "connection filters discarded");
        }
        removed
    }

    /// Snapshot of the connections currently holding a filter for `stream`.
    pub fn candidates(&self, stream: Stream) -> Vec<Candidate> {
        let connections = self.connections.read();
        connections
            .iter()
            .filter_map(|(id, slots)| {
                slots.filters[stream.index()].as_ref().map(|filter| Candidate {
                    connection_id: id.clone(),
                    filter: Arc::clone(filter),
                })
            })
            .collect()
    }

    /// Current filter for `(connection, stream)`, if any.
    pub fn filter(&self, connection_id: &str, stream: Stream) -> Option<Arc<Filter>> {
        self.connections
            .read()
            .get(connection_id)
            .and_then(|slots| slots.filters[stream.index()].clone())
    }

    /// Whether the connection is registered.
    pub fn is_connected(&self, connection_id: &str) -> bool {
        self.connections.read().contains_key(connection_id)
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }

    /// Connection count and per-stream subscriber counts.
    pub fn stats(&self) -> RegistryStats {
        let connections = self.connections.read();
        let count = |stream: Stream| connections.values().filter(|s| s.is_subscribed(stream)).count();

        RegistryStats {
            connections: connections.len(),
            properties: count(Stream::Properties),
            realtors: count(Stream::Realtors),
            persons: count(Stream::Persons),
        }
    }
}
