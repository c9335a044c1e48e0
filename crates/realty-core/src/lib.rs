//! Realty core - filtered change fan-out.
//!
//! Clients hold at most one filter per [`Stream`](realty_proto::Stream).
//! When the data layer commits a mutation it hands the snapshot to the
//! [`Dispatcher`], which asks the [`SubscriptionRegistry`] for the current
//! candidates of that stream, evaluates each candidate's filter with
//! [`matches`], and pushes the event to the matching connections' sinks.
//!
//! Nothing here performs I/O; delivery only enqueues onto per-connection
//! sinks, so `notify` never waits on a slow client.

pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod registry;
pub mod sink;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::DeliveryError;
pub use filter::matches;
pub use registry::{Candidate, ConnectionId, RegistryStats, SubscriptionRegistry};
pub use sink::{ChannelSink, ConnectionSink, EventReceiver};
