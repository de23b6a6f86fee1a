//! Batched persistence
//!
//! [`BatchAccumulator`] buffers incoming rows and commits them to the store
//! in batches. A commit fires when either trigger is hit: the buffer reaches
//! the configured batch size, or the periodic flush timer ticks. On a failed
//! commit the buffered rows are retained and retried by the next trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::observability::PipelineMetrics;
use crate::store::{LogRow, RecordStore, StoreError, UsageRow};

#[derive(Default)]
struct Buffers {
    logs: Vec<LogRow>,
    usage: Vec<UsageRow>,
}

/// Number of rows currently buffered, per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub logs: usize,
    pub usage: usize,
}

/// Dual-trigger batching front of a [`RecordStore`].
///
/// Both buffers live behind one async mutex, held across the append and any
/// size-triggered commit. This keeps the size trigger exact: a buffer can
/// never grow past `batch_size` between the check and the flush, and the
/// periodic timer cannot race a size-triggered commit of the same rows.
pub struct BatchAccumulator {
    store: Arc<dyn RecordStore>,
    batch_size: usize,
    buffers: Mutex<Buffers>,
    metrics: PipelineMetrics,
}

impl BatchAccumulator {
    /// Create an accumulator committing to `store` whenever a buffer reaches
    /// `batch_size` rows. `batch_size` must be at least 1.
    pub fn new(store: Arc<dyn RecordStore>, batch_size: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(batch_size > 0, "batch_size must be at least 1");
        Ok(Self {
            store,
            batch_size,
            buffers: Mutex::new(Buffers::default()),
            metrics: PipelineMetrics::new(),
        })
    }

    /// Buffer one log row, committing the log buffer if it reached the batch
    /// size. A failed size-triggered commit keeps the rows buffered; the
    /// error is logged and not surfaced to the producer.
    pub async fn add_log(&self, row: LogRow) {
        let mut buffers = self.buffers.lock().await;
        buffers.logs.push(row);
        self.metrics
            .set_batch_pending("log", buffers.logs.len() as i64);

        if buffers.logs.len() >= self.batch_size {
            if let Err(err) = self.commit_logs(&mut buffers).await {
                warn!(error = %err, pending = buffers.logs.len(), "log batch commit failed, retaining rows");
            }
        }
    }

    /// Buffer one usage row, committing the usage buffer if it reached the
    /// batch size.
    pub async fn add_usage(&self, row: UsageRow) {
        let mut buffers = self.buffers.lock().await;
        buffers.usage.push(row);
        self.metrics
            .set_batch_pending("usage", buffers.usage.len() as i64);

        if buffers.usage.len() >= self.batch_size {
            if let Err(err) = self.commit_usage(&mut buffers).await {
                warn!(error = %err, pending = buffers.usage.len(), "usage batch commit failed, retaining rows");
            }
        }
    }

    /// Commit whatever is buffered, both kinds. Used by the periodic timer
    /// and for the final drain at shutdown.
    pub async fn flush_all(&self) -> Result<(), StoreError> {
        let mut buffers = self.buffers.lock().await;
        self.commit_logs(&mut buffers).await?;
        self.commit_usage(&mut buffers).await?;
        Ok(())
    }

    /// Current buffer depths.
    pub async fn pending(&self) -> Pending {
        let buffers = self.buffers.lock().await;
        Pending {
            logs: buffers.logs.len(),
            usage: buffers.usage.len(),
        }
    }

    async fn commit_logs(&self, buffers: &mut Buffers) -> Result<(), StoreError> {
        if buffers.logs.is_empty() {
            return Ok(());
        }

        let start = std::time::Instant::now();
        match self.store.insert_logs(&buffers.logs).await {
            Ok(()) => {
                debug!(rows = buffers.logs.len(), "flushed log batch");
                self.metrics.inc_batch_flushes("log");
                self.metrics
                    .observe_flush_duration(start.elapsed().as_secs_f64());
                buffers.logs.clear();
                self.metrics.set_batch_pending("log", 0);
                Ok(())
            }
            Err(err) => {
                self.metrics.inc_flush_errors("log");
                Err(err)
            }
        }
    }

    async fn commit_usage(&self, buffers: &mut Buffers) -> Result<(), StoreError> {
        if buffers.usage.is_empty() {
            return Ok(());
        }

        let start = std::time::Instant::now();
        match self.store.insert_usage(&buffers.usage).await {
            Ok(()) => {
                debug!(rows = buffers.usage.len(), "flushed usage batch");
                self.metrics.inc_batch_flushes("usage");
                self.metrics
                    .observe_flush_duration(start.elapsed().as_secs_f64());
                buffers.usage.clear();
                self.metrics.set_batch_pending("usage", 0);
                Ok(())
            }
            Err(err) => {
                self.metrics.inc_flush_errors("usage");
                Err(err)
            }
        }
    }
}

/// Spawn the periodic flush task. Every `interval` it commits whatever is
/// buffered; commit failures are logged and the rows stay buffered for the
/// next tick. The task runs until the accumulator is dropped and the handle
/// aborted.
pub fn spawn_periodic_flush(
    accumulator: Arc<BatchAccumulator>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The immediate first tick flushes empty buffers, which is a no-op.
        loop {
            ticker.tick().await;
            if let Err(err) = accumulator.flush_all().await {
                warn!(error = %err, "periodic flush failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemoryStore;
    use chrono::Utc;
    use std::sync::atomic::Ordering;

    fn log_row(message: &str) -> LogRow {
        LogRow {
            timestamp: Utc::now(),
            container_name: "web".to_string(),
            log_message: message.to_string(),
        }
    }

    fn usage_row(container_id: &str) -> UsageRow {
        UsageRow {
            timestamp: Utc::now(),
            container_id: container_id.to_string(),
            cpu_percent: 10.0,
            memory_percent: 20.0,
        }
    }

    #[tokio::test]
    async fn test_size_trigger_commits_exactly_at_batch_size() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 3).unwrap();

        acc.add_log(log_row("1")).await;
        acc.add_log(log_row("2")).await;
        assert_eq!(store.log_count(), 0);
        assert_eq!(acc.pending().await.logs, 2);

        acc.add_log(log_row("3")).await;
        assert_eq!(store.log_count(), 3);
        assert_eq!(acc.pending().await.logs, 0);
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_size_one_commits_every_row() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 1).unwrap();

        acc.add_log(log_row("a")).await;
        acc.add_log(log_row("b")).await;

        assert_eq!(store.log_count(), 2);
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_size_trigger_fires_once_per_full_batch() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 10).unwrap();

        for i in 0..25 {
            acc.add_log(log_row(&i.to_string())).await;
        }

        // Two full batches committed, five rows still pending.
        assert_eq!(store.log_count(), 20);
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 2);
        assert_eq!(acc.pending().await.logs, 5);
    }

    #[tokio::test]
    async fn test_log_and_usage_buffers_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 2).unwrap();

        acc.add_log(log_row("a")).await;
        acc.add_usage(usage_row("c1")).await;
        assert_eq!(store.log_count(), 0);
        assert_eq!(store.usage_count(), 0);

        acc.add_usage(usage_row("c2")).await;
        assert_eq!(store.usage_count(), 2);
        assert_eq!(store.log_count(), 0);
        assert_eq!(acc.pending().await.logs, 1);
    }

    #[tokio::test]
    async fn test_flush_all_drains_partial_buffers() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 1000).unwrap();

        acc.add_log(log_row("a")).await;
        acc.add_usage(usage_row("c1")).await;

        acc.flush_all().await.unwrap();
        assert_eq!(store.log_count(), 1);
        assert_eq!(store.usage_count(), 1);
        let pending = acc.pending().await;
        assert_eq!(pending.logs, 0);
        assert_eq!(pending.usage, 0);
    }

    #[tokio::test]
    async fn test_flush_all_on_empty_buffers_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 10).unwrap();

        acc.flush_all().await.unwrap();
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 0);
        assert_eq!(store.usage_transactions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_commit_retains_rows_for_retry() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 2).unwrap();

        store.fail_logs(true);
        acc.add_log(log_row("a")).await;
        acc.add_log(log_row("b")).await;

        // Size trigger fired and failed; rows stay buffered.
        assert_eq!(store.log_count(), 0);
        assert_eq!(acc.pending().await.logs, 2);

        store.fail_logs(false);
        acc.flush_all().await.unwrap();
        assert_eq!(store.log_count(), 2);
        assert_eq!(acc.pending().await.logs, 0);
    }

    #[tokio::test]
    async fn test_size_trigger_at_production_batch_size() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 1000).unwrap();

        for i in 0..999 {
            acc.add_log(log_row(&i.to_string())).await;
        }
        assert_eq!(store.log_count(), 0);
        assert_eq!(acc.pending().await.logs, 999);

        acc.add_log(log_row("999")).await;
        assert_eq!(store.log_count(), 1000);
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 1);
        assert_eq!(acc.pending().await.logs, 0);
    }

    #[tokio::test]
    async fn test_failed_mid_batch_commit_persists_no_rows() {
        let store = Arc::new(MemoryStore::new());
        let acc = BatchAccumulator::new(store.clone(), 5).unwrap();

        // Row index 3 errors mid-transaction; the whole batch rolls back.
        store.fail_logs_at_row(Some(3));
        for i in 0..5 {
            acc.add_log(log_row(&i.to_string())).await;
        }

        // Nothing persisted, not even the rows inserted before the failure.
        assert_eq!(store.log_count(), 0);
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 0);
        assert_eq!(acc.pending().await.logs, 5);

        store.fail_logs_at_row(None);
        acc.flush_all().await.unwrap();
        assert_eq!(store.log_count(), 5);
        assert_eq!(store.log_transactions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        assert!(BatchAccumulator::new(store, 0).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_flush_commits_partial_buffer() {
        let store = Arc::new(MemoryStore::new());
        let acc = Arc::new(BatchAccumulator::new(store.clone(), 1000).unwrap());

        acc.add_log(log_row("a")).await;
        let handle = spawn_periodic_flush(acc.clone(), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(store.log_count(), 1);
        assert_eq!(acc.pending().await.logs, 0);

        handle.abort();
    }

    /// Concurrent producers never lose a row: every row ends up committed
    /// exactly once, through either trigger.
    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 8;
        const ROWS_EACH: usize = 50;

        let store = Arc::new(MemoryStore::new());
        let acc = Arc::new(BatchAccumulator::new(store.clone(), 7).unwrap());
        let flusher = spawn_periodic_flush(acc.clone(), Duration::from_millis(1));

        let mut tasks = Vec::new();
        for p in 0..PRODUCERS {
            let acc = acc.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..ROWS_EACH {
                    acc.add_log(log_row(&format!("{p}-{i}"))).await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        flusher.abort();
        acc.flush_all().await.unwrap();
        assert_eq!(store.log_count(), PRODUCERS * ROWS_EACH);
    }
}
