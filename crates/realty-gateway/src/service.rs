//! Listing service: the write path that feeds the dispatcher.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use realty_client::DataStore;
use realty_core::Dispatcher;
use realty_proto::{validate_create, validate_update, ChangeEvent, Entity, Stream};

use crate::error::AppError;

/// Validates payloads, forwards them to the data store and announces
/// committed changes.
///
/// Notification happens only after the store reports success, and always
/// carries the snapshot the store returned.
pub struct ListingService {
    store: Arc<dyn DataStore>,
    dispatcher: Arc<Dispatcher>,
    request_timeout: Duration,
}

impl ListingService {
    /// Create a service writing to `store` and notifying through `dispatcher`.
    pub fn new(store: Arc<dyn DataStore>, dispatcher: Arc<Dispatcher>, request_timeout: Duration) -> Self {
        Self {
            store,
            dispatcher,
            request_timeout,
        }
    }

    /// Kind of the underlying data store.
    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, realty_client::Error>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::Timeout),
        }
    }

    pub async fn list(&self, stream: Stream) -> Result<Vec<Entity>, AppError> {
        self.bounded(self.store.list(stream)).await
    }

    pub async fn get(&self, stream: Stream, id: &str) -> Result<Entity, AppError> {
        self.bounded(self.store.get(stream, id)).await
    }

    pub async fn count(&self, stream: Stream) -> Result<usize, AppError> {
        Ok(self.list(stream).await?.len())
    }

    pub async fn create(&self, stream: Stream, payload: Value) -> Result<Entity, AppError> {
        let payload = validate_create(stream, payload)?;
        let entity = self.bounded(self.store.create(stream, payload)).await?;

        let report = self.dispatcher.notify(ChangeEvent::created(entity.clone()));
        tracing::info!(
            stream = %stream,
            id = %entity.id(),
            delivered = report.delivered,
            "entity created"
        );
        Ok(entity)
    }

    pub async fn update(&self, stream: Stream, id: &str, payload: Value) -> Result<Entity, AppError> {
        let payload = validate_update(stream, payload)?;
        let entity = self.bounded(self.store.update(stream, id, payload)).await?;

        let report = self.dispatcher.notify(ChangeEvent::updated(entity.clone()));
        tracing::info!(
            stream = %stream,
            id = %entity.id(),
            delivered = report.delivered,
            "entity updated"
        );
        Ok(entity)
    }
}
