//! Collector-side gRPC ingest services
//!
//! Implements the bidirectional streaming services the uplink talks to. Each
//! accepted record is handed to the shared [`BatchAccumulator`] and answered
//! with a per-record acknowledgement on the response stream. A store error
//! while buffering never terminates the stream; the record loss is logged
//! and the next acknowledgement still goes out.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, error, info, warn};

use crate::batch::BatchAccumulator;
use crate::observability::PipelineMetrics;
use crate::proto::{
    ContainerUsageStats, LogData, LogResponse, LogStreamingService, LogStreamingServiceServer,
    UsageResponse, UsageStreamingService, UsageStreamingServiceServer,
};
use crate::store::{LogRow, UsageRow};

/// Depth of the per-stream acknowledgement channel.
const ACK_CHANNEL_CAPACITY: usize = 128;

/// Strip NUL bytes that some log drivers leave embedded in log lines;
/// Postgres rejects them in text columns.
fn sanitize(text: &str) -> String {
    text.replace('\0', "")
}

pub struct LogIngestService {
    accumulator: Arc<BatchAccumulator>,
    metrics: PipelineMetrics,
}

impl LogIngestService {
    pub fn new(accumulator: Arc<BatchAccumulator>) -> Self {
        Self {
            accumulator,
            metrics: PipelineMetrics::new(),
        }
    }
}

#[tonic::async_trait]
impl LogStreamingService for LogIngestService {
    type StreamLogsStream = ReceiverStream<Result<LogResponse, Status>>;

    async fn stream_logs(
        &self,
        request: Request<Streaming<LogData>>,
    ) -> Result<Response<Self::StreamLogsStream>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(ACK_CHANNEL_CAPACITY);
        let accumulator = self.accumulator.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            loop {
                match inbound.message().await {
                    Ok(Some(data)) => {
                        metrics.inc_records_received("log");
                        let container_name = data
                            .metadata
                            .as_ref()
                            .map(|m| m.container_name.clone())
                            .unwrap_or_default();

                        let row = LogRow {
                            timestamp: Utc::now(),
                            container_name: sanitize(&container_name),
                            log_message: sanitize(&data.log),
                        };
                        accumulator.add_log(row).await;

                        let ack = LogResponse {
                            message: format!("Received log from container {container_name}"),
                        };
                        if tx.send(Ok(ack)).await.is_err() {
                            debug!("log ack receiver dropped, closing stream");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("log stream closed by client");
                        break;
                    }
                    Err(status) => {
                        warn!(error = %status, "log stream terminated with error");
                        let _ = tx.send(Err(status)).await;
                        break;
                    }
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

pub struct UsageIngestService {
    accumulator: Arc<BatchAccumulator>,
    metrics: PipelineMetrics,
}

impl UsageIngestService {
    pub fn new(accumulator: Arc<BatchAccumulator>) -> Self {
        Self {
            accumulator,
            metrics: PipelineMetrics::new(),
        }
    }
}

#[tonic::async_trait]
impl UsageStreamingService for UsageIngestService {
    type StreamUsageStream = ReceiverStream<Result<UsageResponse, Status>>;

    async fn stream_usage(
        &self,
        request: Request<Streaming<ContainerUsageStats>>,
    ) -> Result<Response<Self::StreamUsageStream>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(ACK_CHANNEL_CAPACITY);
        let accumulator = self.accumulator.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            loop {
                match inbound.message().await {
                    Ok(Some(stats)) => {
                        metrics.inc_records_received("usage");
                        let container_id = sanitize(&stats.container_id);

                        let row = UsageRow {
                            timestamp: Utc::now(),
                            container_id: container_id.clone(),
                            cpu_percent: stats.cpu_percent,
                            memory_percent: stats.memory_percent,
                        };
                        accumulator.add_usage(row).await;

                        let ack = UsageResponse {
                            message: format!(
                                "Received usage stats from container {container_id}"
                            ),
                        };
                        if tx.send(Ok(ack)).await.is_err() {
                            debug!("usage ack receiver dropped, closing stream");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("usage stream closed by client");
                        break;
                    }
                    Err(status) => {
                        warn!(error = %status, "usage stream terminated with error");
                        let _ = tx.send(Err(status)).await;
                        break;
                    }
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Serve both ingest services on `addr` until `shutdown` resolves.
pub async fn serve(
    addr: SocketAddr,
    accumulator: Arc<BatchAccumulator>,
    shutdown: impl std::future::Future<Output = ()>,
) -> anyhow::Result<()> {
    info!(%addr, "starting ingest server");

    tonic::transport::Server::builder()
        .add_service(LogStreamingServiceServer::new(LogIngestService::new(
            accumulator.clone(),
        )))
        .add_service(UsageStreamingServiceServer::new(UsageIngestService::new(
            accumulator,
        )))
        .serve_with_shutdown(addr, shutdown)
        .await
        .map_err(|err| {
            error!(error = %err, "ingest server failed");
            anyhow::anyhow!(err)
        })
}
