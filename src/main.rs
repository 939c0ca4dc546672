//! Influx Broker API Server
//!
//! Run with: cargo run --bin influx-broker
//!
//! # Configuration
//!
//! Read from the first existing `config.toml` in the user config directory,
//! `/etc/influx-broker/` or the working directory, then overridden by
//! `INFLUX_BROKER_*` environment variables. `RUST_LOG` takes precedence over
//! the configured log level.

use anyhow::Context;
use influx_broker::api::{serve, AppState};
use influx_broker::config::{Config, LoggingConfig};
use influx_broker::influx::{InfluxClient, QueryBackend};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting influx-broker v{}", env!("CARGO_PKG_VERSION"));

    let client = InfluxClient::new((&config.influx).into()).context("invalid InfluxDB configuration")?;
    tracing::info!("InfluxDB at {}", client.config().url);

    match client.ping().await {
        Ok(()) => tracing::info!("InfluxDB connection verified"),
        Err(e) => tracing::warn!("InfluxDB not available: {} (queries will fail until it is)", e),
    }

    let api_config = (&config.api).into();
    let state = AppState::new(Arc::new(client), api_config);
    let api_config = state.config.clone();

    tracing::info!(
        "Database selector header: {}",
        api_config.user_header
    );
    serve(state, &api_config).await.context("server failed")?;

    tracing::info!("influx-broker stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("influx_broker={},tower_http=info", logging.level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
