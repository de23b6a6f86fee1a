//! Monitor Server - Telemetry collector
//!
//! Accepts multiplexed log and usage streams over gRPC, buffers the records
//! in a dual-trigger batch accumulator, and commits them to Postgres.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use monitor_lib::{batch, ingest, BatchAccumulator, PostgresStore, StructuredLogger};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting monitor-server");

    let config = config::ServerConfig::load()?;
    info!(
        grpc_port = config.grpc_port,
        batch_size = config.batch_size,
        flush_interval_secs = config.flush_interval_secs,
        "Server configured"
    );

    let logger = StructuredLogger::new("monitor-server");
    logger.log_startup(SERVER_VERSION);

    // Connect to Postgres, retrying with backoff
    let store = PostgresStore::connect(
        &config.database_url,
        config.connect_attempts,
        Duration::from_secs(config.connect_delay_secs),
    )
    .await
    .context("database connection failed")?;

    let accumulator = Arc::new(BatchAccumulator::new(
        Arc::new(store),
        config.batch_size,
    )?);

    // Periodic flush covers slow streams that never hit the size trigger
    let flush_handle = batch::spawn_periodic_flush(
        accumulator.clone(),
        Duration::from_secs(config.flush_interval_secs),
    );

    // Health and metrics API
    let app_state = Arc::new(api::AppState::new(accumulator.clone()));
    let api_port = config.api_port;
    let api_handle = tokio::spawn(async move {
        if let Err(err) = api::serve(api_port, app_state).await {
            error!(error = %err, port = api_port, "API server failed");
        }
    });

    // gRPC ingest services, running until SIGINT
    let grpc_addr: SocketAddr = format!("0.0.0.0:{}", config.grpc_port).parse()?;
    ingest::serve(grpc_addr, accumulator.clone(), async {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("Shutdown signal received");
    })
    .await?;

    flush_handle.abort();
    api_handle.abort();

    // Drain whatever is still buffered before exiting
    accumulator
        .flush_all()
        .await
        .context("final flush failed")?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
