//! Realty data layer.
//!
//! The gateway talks to its database through the [`DataStore`] trait. Two
//! implementations ship here:
//!
//! - [`RestStore`] for a hosted PostgREST-compatible database
//! - [`MemoryStore`] for local runs and tests
//!
//! Stores accept payloads that have already been validated by
//! [`realty_proto::validate_create`] / [`realty_proto::validate_update`] and
//! return full entity snapshots.

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

pub use config::RestConfig;
pub use error::Error;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::DataStore;
