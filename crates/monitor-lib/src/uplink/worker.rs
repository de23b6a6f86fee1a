//! Per-container streaming workers
//!
//! One worker task per container per record kind. Workers pull records from
//! a channel fed by the record source and push them through the shared
//! [`UplinkClient`]. A failed delivery drops that record; the stream behind
//! it reinitializes on the next send.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::UplinkClient;
use crate::models::LogMetadata;
use crate::stats::{self, CpuSnapshot, RawUsageSnapshot};

/// Forward log lines for one container until the source channel closes.
pub async fn stream_container_logs(
    client: Arc<UplinkClient>,
    metadata: LogMetadata,
    mut lines: mpsc::Receiver<String>,
) {
    while let Some(line) = lines.recv().await {
        match client.send_log(&metadata, &line).await {
            Ok(ack) => debug!(container = %metadata.container_name, ack = %ack, "log delivered"),
            Err(err) => warn!(
                container = %metadata.container_name,
                error = %err,
                "log delivery failed, dropping line"
            ),
        }
    }
    debug!(container = %metadata.container_name, "log source closed");
}

/// Forward usage samples for one container until the source channel closes.
///
/// Keeps the previous sample's CPU counters so each delivered record carries
/// a utilisation percentage derived from consecutive snapshots; the first
/// sample reports zero CPU.
pub async fn stream_container_usage(
    client: Arc<UplinkClient>,
    container_id: String,
    mut samples: mpsc::Receiver<RawUsageSnapshot>,
) {
    let mut previous_cpu: Option<CpuSnapshot> = None;

    while let Some(raw) = samples.recv().await {
        let record = stats::derive_usage(&container_id, previous_cpu.as_ref(), &raw);
        previous_cpu = Some(raw.cpu);

        match client.send_usage(&record).await {
            Ok(ack) => debug!(container = %container_id, ack = %ack, "usage delivered"),
            Err(err) => warn!(
                container = %container_id,
                error = %err,
                "usage delivery failed, dropping sample"
            ),
        }
    }
    debug!(container = %container_id, "usage source closed");
}
