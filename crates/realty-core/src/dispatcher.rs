//! Filtered fan-out of change events.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use realty_proto::ChangeEvent;

use crate::filter::matches;
use crate::registry::{ConnectionId, SubscriptionRegistry};
use crate::sink::ConnectionSink;

/// Outcome of a single [`Dispatcher::notify`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Connections subscribed to the event's stream.
    pub candidates: usize,
    /// Candidates whose filter accepted the snapshot.
    pub matched: usize,
    /// Matched connections whose sink accepted the event.
    pub delivered: usize,
    /// Matched connections whose sink refused the event.
    pub failed: usize,
}

/// Routes committed changes to interested connections.
pub struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
    sinks: DashMap<ConnectionId, Arc<dyn ConnectionSink>>,
}

impl Dispatcher {
    /// Create a dispatcher over an existing registry.
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self {
            registry,
            sinks: DashMap::new(),
        }
    }

    /// The registry holding connection filters.
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Register a connection together with the sink its events go to.
    pub fn connect(&self, connection_id: impl Into<ConnectionId>, sink: Arc<dyn ConnectionSink>) {
        let connection_id = connection_id.into();
        self.sinks.insert(connection_id.clone(), sink);
        self.registry.connect(connection_id.clone());
        tracing::debug!(connection_id = %connection_id, "connection registered");
    }

    /// Drop a connection, its sink, and all of its filters. Idempotent.
    pub fn disconnect(&self, connection_id: &str) {
        let had_filters = self.registry.disconnect(connection_id);
        let had_sink = self.sinks.remove(connection_id).is_some();
        if had_filters || had_sink {
            tracing::debug!(connection_id, "connection released");
        }
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Deliver `event` to every connection whose filter for its stream matches.
    ///
    /// A refusing sink is logged and skipped; it never prevents delivery to
    /// other connections.
    pub fn notify(&self, event: ChangeEvent) -> DispatchReport {
        let stream = event.stream();
        let event = Arc::new(event);
        let candidates = self.registry.candidates(stream);

        let mut report = DispatchReport {
            candidates: candidates.len(),
            ..DispatchReport::default()
        };

        for candidate in candidates {
            if !matches(&event.entity, Some(&candidate.filter)) {
                continue;
            }

            // Clone the handle out so no shard lock is held during send.
            let sink = match self.sinks.get(&candidate.connection_id) {
                Some(entry) => Arc::clone(entry.value()),
                None => continue,
            };
            report.matched += 1;

            match sink.send(&event) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(
                        connection_id = %candidate.connection_id,
                        stream = %stream,
                        event = %event.event_name(),
                        %error,
                        "dropping event for connection"
                    );
                }
            }
        }

        tracing::debug!(
            stream = %stream,
            event = %event.event_name(),
            entity_id = %event.entity.id(),
            candidates = report.candidates,
            matched = report.matched,
            delivered = report.delivered,
            "change dispatched"
        );

        report
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(SubscriptionRegistry::new()))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
