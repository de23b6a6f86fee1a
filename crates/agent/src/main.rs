//! Monitor Agent - Container telemetry shipper
//!
//! Reads log lines from stdin and ships them to the collector over a pooled
//! gRPC uplink. If the uplink cannot be established at startup the agent
//! falls back to per-line REST delivery.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use monitor_lib::rest::BackendClient;
use monitor_lib::uplink::worker;
use monitor_lib::{LogMetadata, StructuredLogger, UplinkClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Depth of the stdin-to-worker line buffer.
const LINE_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting monitor-agent");

    let config = config::AgentConfig::load()?;
    info!(
        endpoint = %config.server_endpoint,
        connections = config.connections,
        container = %config.container_name,
        "Agent configured"
    );

    let logger = StructuredLogger::new("monitor-agent");
    logger.log_startup(AGENT_VERSION);

    let metadata = LogMetadata {
        container_id: config.container_id.clone(),
        container_name: config.container_name.clone(),
        image: config.image.clone(),
        state: config.state.clone(),
        log_path: config.log_path.clone(),
        log_driver: config.log_driver.clone(),
    };

    match UplinkClient::connect(&config.server_endpoint, config.connections).await {
        Ok(client) => {
            let client = Arc::new(client);
            run_grpc(client.clone(), metadata).await;
            client.close().await;
        }
        Err(err) => {
            warn!(error = %err, "gRPC uplink unavailable, falling back to REST delivery");
            run_rest(&config, &metadata).await?;
        }
    }

    logger.log_shutdown("log source exhausted");
    info!("Shutting down");

    Ok(())
}

/// Ship stdin lines over the pooled gRPC uplink until stdin closes or SIGINT.
async fn run_grpc(client: Arc<UplinkClient>, metadata: LogMetadata) {
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let worker = tokio::spawn(worker::stream_container_logs(client, metadata, rx));

    let mut reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut reader => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            // Drops the line sender so the worker drains and exits.
            reader.abort();
        }
    }

    // Dropping the reader closed the channel; let the worker drain.
    let _ = worker.await;
}

/// Ship stdin lines one request at a time over REST.
async fn run_rest(config: &config::AgentConfig, metadata: &LogMetadata) -> Result<()> {
    let client = BackendClient::new(
        config.backend_url.clone(),
        config.rest_attempts,
        Duration::from_secs(config.rest_delay_secs),
    )?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(err) = client.send_log(metadata, &line).await {
                        warn!(error = %err, "REST delivery failed, dropping line");
                    }
                }
                Ok(None) | Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
