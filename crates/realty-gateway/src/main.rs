//! Realty gateway binary.

use std::sync::Arc;

use clap::Parser;
use realty_client::{DataStore, MemoryStore, RestStore};
use realty_gateway::{create_router, AppState, Args, GatewayConfig, StoreConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "realty_gateway=info,realty_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line args
    let args = Args::parse();

    // Initialize tracing
    let filter = match &args.log_level {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let config = GatewayConfig::try_from(&args)?;

    let store: Arc<dyn DataStore> = match &config.store {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Rest(rest) => Arc::new(RestStore::new(rest.clone())?),
    };
    info!(
        listen = %config.listen_addr,
        store = store.kind(),
        outbound_queue = config.outbound_queue,
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        "Starting realty gateway"
    );

    let state = AppState::new(store, config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
