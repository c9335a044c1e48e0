//! Gateway configuration.

use std::time::Duration;

use clap::Parser;
use realty_client::RestConfig;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

/// Default per-connection outbound queue depth.
pub const DEFAULT_OUTBOUND_QUEUE: usize = 64;

/// Default data-layer request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Realty gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "realty-gateway")]
#[command(about = "Realty listing service with realtime change notifications")]
pub struct Args {
    /// Address to listen on for HTTP and websocket requests.
    #[arg(short, long, env = "REALTY_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Hosted database project URL.
    #[arg(long, env = "SUPABASE_PROJECT_URL")]
    pub supabase_url: Option<String>,

    /// Hosted database anonymous API key.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Keep data in memory instead of the hosted database.
    #[arg(long)]
    pub memory: bool,

    /// Events buffered per websocket connection before new ones are dropped.
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_QUEUE)]
    pub outbound_queue: usize,

    /// Data-layer request timeout (ms).
    #[arg(long, default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Log filter directive, e.g. `debug` or `realty_core=trace`. Overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Which data store backs the gateway.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    Rest(RestConfig),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on.
    pub listen_addr: String,
    /// Data store selection.
    pub store: StoreConfig,
    /// Outbound queue depth per websocket connection.
    pub outbound_queue: usize,
    /// Timeout applied to every data-layer call.
    pub request_timeout: Duration,
}

/// Invalid command line or environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SUPABASE_PROJECT_URL and SUPABASE_ANON_KEY are required unless --memory is set")]
    MissingDatabase,

    #[error("outbound queue depth must be at least 1")]
    EmptyQueue,
}

impl TryFrom<&Args> for GatewayConfig {
    type Error = ConfigError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        if args.outbound_queue == 0 {
            return Err(ConfigError::EmptyQueue);
        }
        let request_timeout = Duration::from_millis(args.request_timeout_ms);

        let store = if args.memory {
            StoreConfig::Memory
        } else {
            match (&args.supabase_url, &args.supabase_key) {
                (Some(url), Some(key)) => {
                    StoreConfig::Rest(RestConfig::new(url, key).with_timeout(request_timeout))
                }
                _ => return Err(ConfigError::MissingDatabase),
            }
        };

        Ok(Self {
            listen_addr: args.listen.clone(),
            store,
            outbound_queue: args.outbound_queue,
            request_timeout,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN.to_string(),
            store: StoreConfig::Memory,
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
