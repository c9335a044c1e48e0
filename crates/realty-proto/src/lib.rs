//! Realty protocol types.
//!
//! This crate defines the data shared between the data layer, the change
//! dispatcher and websocket clients.
//!
//! # Modules
//!
//! - [`stream`] - The three subscribable entity streams
//! - [`entity`] - Complete entity snapshots as returned by the data layer
//! - [`payload`] - Create/update payload schemas and their validation
//! - [`filter`] - Subscription filter vocabulary
//! - [`event`] - Change events and websocket envelopes
//! - [`error`] - Protocol error types

pub mod entity;
pub mod error;
pub mod event;
pub mod filter;
pub mod payload;
pub mod stream;

pub use entity::{Audit, Coordinates, Entity, Field, Person, Property, PropertyState, PropertyType, Realtor};
pub use error::{Error, ValidationError};
pub use event::{ChangeEvent, ChangeKind, ClientMessage, Envelope};
pub use filter::{Constraint, FieldConstraint, Filter};
pub use payload::{validate_create, validate_update};
pub use stream::Stream;
