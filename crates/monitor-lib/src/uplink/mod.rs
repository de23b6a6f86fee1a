//! Multiplexed gRPC uplink
//!
//! The [`UplinkClient`] owns a fixed pool of connections to the collector and
//! spreads records across them round-robin. Streams are lazy: the first send
//! routed to a slot opens its stream, and a slot whose stream failed opens a
//! fresh one on the next send routed to it. Every send waits for the
//! collector's per-record acknowledgement before returning.

mod pool;
pub mod worker;


use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use thiserror::Error;
use tracing::debug;

use crate::models::{LogMetadata, UsageRecord};
use crate::observability::PipelineMetrics;
use crate::proto::{
    LogData, LogStreamingServiceClient, UsageStreamingServiceClient,
};
use pool::{ConnectionPool, LogStreamHandle, Slot, UsageStreamHandle};

/// Depth of the outbound buffer between a sender and its stream.
const STREAM_BUFFER: usize = 16;

/// Which of the two record streams an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Log,
    Usage,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Log => f.write_str("log"),
            StreamKind::Usage => f.write_str("usage"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("failed to connect to collector: {0}")]
    Connect(#[source] tonic::transport::Error),

    #[error("connection pool must have at least one connection")]
    EmptyPool,

    #[error("uplink is closed")]
    Closed,

    #[error("failed to open {kind} stream: {source}")]
    OpenStream {
        kind: StreamKind,
        #[source]
        source: tonic::Status,
    },

    #[error("{kind} stream rejected the record")]
    Send { kind: StreamKind },

    #[error("{kind} acknowledgement failed: {source}")]
    Ack {
        kind: StreamKind,
        #[source]
        source: tonic::Status,
    },

    #[error("collector closed the {kind} acknowledgement stream")]
    AckStreamClosed { kind: StreamKind },
}

/// Client side of the telemetry uplink.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct UplinkClient {
    pool: ConnectionPool,
    closed: AtomicBool,
    metrics: PipelineMetrics,
}

impl UplinkClient {
    /// Open `connections` channels to the collector at `endpoint`
    /// (e.g. `http://localhost:8888`). All connections are established before
    /// this returns; no streams are opened yet.
    pub async fn connect(endpoint: &str, connections: usize) -> Result<Self, UplinkError> {
        let pool = ConnectionPool::open(endpoint, connections).await?;
        Ok(Self {
            pool,
            closed: AtomicBool::new(false),
            metrics: PipelineMetrics::new(),
        })
    }

    /// Number of pooled connections.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Send one log line and wait for the collector's acknowledgement,
    /// returning its message.
    ///
    /// On failure the slot's stream handle is discarded, so the next send
    /// routed to that slot starts a fresh stream over the same connection.
    pub async fn send_log(&self, metadata: &LogMetadata, log: &str) -> Result<String, UplinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(UplinkError::Closed);
        }

        let slot = self.pool.next_slot();
        let mut guard = slot.log_stream.lock().await;
        let mut handle = match guard.take() {
            Some(handle) => handle,
            None => self.open_log_stream(slot).await?,
        };

        let data = LogData {
            metadata: Some(metadata.into()),
            log: log.to_string(),
        };

        match Self::log_roundtrip(&mut handle, data).await {
            Ok(ack) => {
                *guard = Some(handle);
                self.metrics.inc_records_sent("log");
                Ok(ack)
            }
            Err(err) => {
                // Handle dropped: the slot reinitializes lazily.
                self.metrics.inc_delivery_failures("log");
                Err(err)
            }
        }
    }

    /// Send one usage sample and wait for the collector's acknowledgement.
    pub async fn send_usage(&self, record: &UsageRecord) -> Result<String, UplinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(UplinkError::Closed);
        }

        let slot = self.pool.next_slot();
        let mut guard = slot.usage_stream.lock().await;
        let mut handle = match guard.take() {
            Some(handle) => handle,
            None => self.open_usage_stream(slot).await?,
        };

        match Self::usage_roundtrip(&mut handle, record.into()).await {
            Ok(ack) => {
                *guard = Some(handle);
                self.metrics.inc_records_sent("usage");
                Ok(ack)
            }
            Err(err) => {
                self.metrics.inc_delivery_failures("usage");
                Err(err)
            }
        }
    }

    /// Stop accepting sends and drop every live stream. Connections close
    /// when the client is dropped.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.pool.close_streams().await;
        debug!("uplink closed");
    }

    async fn open_log_stream(&self, slot: &Slot) -> Result<LogStreamHandle, UplinkError> {
        let mut client = LogStreamingServiceClient::new(slot.channel.clone());
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        let response = client
            .stream_logs(ReceiverStream::new(rx))
            .await
            .map_err(|source| UplinkError::OpenStream {
                kind: StreamKind::Log,
                source,
            })?;

        debug!(slot = slot.index, "opened log stream");
        self.metrics.inc_streams_opened("log");
        Ok(LogStreamHandle {
            tx,
            inbound: response.into_inner(),
        })
    }

    async fn open_usage_stream(&self, slot: &Slot) -> Result<UsageStreamHandle, UplinkError> {
        let mut client = UsageStreamingServiceClient::new(slot.channel.clone());
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        let response = client
            .stream_usage(ReceiverStream::new(rx))
            .await
            .map_err(|source| UplinkError::OpenStream {
                kind: StreamKind::Usage,
                source,
            })?;

        debug!(slot = slot.index, "opened usage stream");
        self.metrics.inc_streams_opened("usage");
        Ok(UsageStreamHandle {
            tx,
            inbound: response.into_inner(),
        })
    }

    async fn log_roundtrip(
        handle: &mut LogStreamHandle,
        data: LogData,
    ) -> Result<String, UplinkError> {
        handle
            .tx
            .send(data)
            .await
            .map_err(|_| UplinkError::Send {
                kind: StreamKind::Log,
            })?;

        match handle.inbound.message().await {
            Ok(Some(response)) => Ok(response.message),
            Ok(None) => Err(UplinkError::AckStreamClosed {
                kind: StreamKind::Log,
            }),
            Err(source) => Err(UplinkError::Ack {
                kind: StreamKind::Log,
                source,
            }),
        }
    }

    async fn usage_roundtrip(
        handle: &mut UsageStreamHandle,
        stats: crate::proto::ContainerUsageStats,
    ) -> Result<String, UplinkError> {
        handle
            .tx
            .send(stats)
            .await
            .map_err(|_| UplinkError::Send {
                kind: StreamKind::Usage,
            })?;

        match handle.inbound.message().await {
            Ok(Some(response)) => Ok(response.message),
            Ok(None) => Err(UplinkError::AckStreamClosed {
                kind: StreamKind::Usage,
            }),
            Err(source) => Err(UplinkError::Ack {
                kind: StreamKind::Usage,
                source,
            }),
        }
    }
}
