//! Realty HTTP and websocket gateway.
//!
//! Serves the listing REST API and the realtime websocket. Every
//! successful create or update goes through [`ListingService`], which
//! hands the resulting snapshot to the shared [`Dispatcher`]; websocket
//! connections register with the same dispatcher and receive the events
//! their filters select.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod ws;

pub use config::{Args, GatewayConfig, StoreConfig};
pub use error::AppError;
pub use service::ListingService;

use std::sync::Arc;

use axum::Router;
use realty_client::DataStore;
use realty_core::Dispatcher;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Write path and reads.
    pub service: Arc<ListingService>,
    /// Realtime fan-out shared with the websocket handlers.
    pub dispatcher: Arc<Dispatcher>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state around a data store.
    pub fn new(store: Arc<dyn DataStore>, config: GatewayConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::default());
        let service = ListingService::new(store, Arc::clone(&dispatcher), config.request_timeout);
        Self {
            service: Arc::new(service),
            dispatcher,
            config,
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::listings::routes())
        .merge(routes::realtime::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
