//! The data-layer seam.

use async_trait::async_trait;
use serde_json::Value;

use realty_proto::{Entity, Stream};

use crate::error::Error;

/// Storage for the three listing streams.
///
/// Payloads are normalized JSON objects produced by payload validation.
/// Every successful call returns complete snapshots.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn list(&self, stream: Stream) -> Result<Vec<Entity>, Error>;

    async fn get(&self, stream: Stream, id: &str) -> Result<Entity, Error>;

    async fn create(&self, stream: Stream, payload: Value) -> Result<Entity, Error>;

    /// Apply a partial update. Fails with [`Error::NotFound`] if no row has `id`.
    async fn update(&self, stream: Stream, id: &str, payload: Value) -> Result<Entity, Error>;

    /// Short name for logs.
    fn kind(&self) -> &'static str;
}
