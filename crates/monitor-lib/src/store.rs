//! Record persistence
//!
//! The [`RecordStore`] trait is the seam between the batching layer and the
//! database. [`PostgresStore`] is the production implementation; tests use
//! the in-memory store defined at the bottom of this module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::retry;

/// Upper bound on concurrent connections held by the Postgres pool.
const MAX_POOL_CONNECTIONS: u32 = 25;

/// One log line ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub timestamp: DateTime<Utc>,
    pub container_name: String,
    pub log_message: String,
}

/// One usage sample ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRow {
    pub timestamp: DateTime<Utc>,
    pub container_id: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("database ping failed: {0}")]
    Ping(#[source] sqlx::Error),

    #[error("transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),
}

/// Transactional sink for telemetry records.
///
/// Implementations must commit each call atomically: either every row in the
/// slice is persisted or none is, so a failed batch can be retried whole.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_logs(&self, rows: &[LogRow]) -> Result<(), StoreError>;
    async fn insert_usage(&self, rows: &[UsageRow]) -> Result<(), StoreError>;
}

/// Postgres-backed [`RecordStore`].
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to Postgres and verify the connection with a ping.
    ///
    /// Connection attempts are retried with exponential backoff; the error
    /// returned after exhaustion carries the final attempt's failure.
    pub async fn connect(
        database_url: &str,
        max_attempts: u32,
        initial_delay: Duration,
    ) -> Result<Self, retry::RetryExhausted<StoreError>> {
        let pool = retry::with_backoff(max_attempts, initial_delay, || async {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_POOL_CONNECTIONS)
                .connect(database_url)
                .await
                .map_err(StoreError::Connect)?;

            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(StoreError::Ping)?;

            Ok::<_, StoreError>(pool)
        })
        .await?;

        info!(max_connections = MAX_POOL_CONNECTIONS, "connected to database");
        Ok(Self { pool })
    }

    /// Wrap an existing pool, for callers that manage their own connection.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn insert_logs(&self, rows: &[LogRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT INTO container_logs (timestamp, container_name, log_message) \
                 VALUES ($1, $2, $3)",
            )
            .bind(row.timestamp)
            .bind(&row.container_name)
            .bind(&row.log_message)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(rows = rows.len(), "committed log batch");
        Ok(())
    }

    async fn insert_usage(&self, rows: &[UsageRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT INTO container_usage (timestamp, container_id, cpu_percent, memory_percent) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(row.timestamp)
            .bind(&row.container_id)
            .bind(row.cpu_percent)
            .bind(row.memory_percent)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(rows = rows.len(), "committed usage batch");
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! In-memory [`RecordStore`] for tests, with failure injection.

    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryStore {
        pub logs: Mutex<Vec<LogRow>>,
        pub usage: Mutex<Vec<UsageRow>>,
        pub log_transactions: AtomicUsize,
        pub usage_transactions: AtomicUsize,
        fail_logs: AtomicBool,
        fail_usage: AtomicBool,
        fail_logs_at_row: Mutex<Option<usize>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_logs(&self, fail: bool) {
            self.fail_logs.store(fail, Ordering::SeqCst);
        }

        pub fn fail_usage(&self, fail: bool) {
            self.fail_usage.store(fail, Ordering::SeqCst);
        }

        /// Fail any log batch whose per-row inserts would reach row index
        /// `k`. Mimics a mid-transaction insert error: the whole batch rolls
        /// back, so rows before `k` are not persisted either.
        pub fn fail_logs_at_row(&self, k: Option<usize>) {
            *self.fail_logs_at_row.lock().unwrap() = k;
        }

        pub fn log_count(&self) -> usize {
            self.logs.lock().unwrap().len()
        }

        pub fn usage_count(&self) -> usize {
            self.usage.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn insert_logs(&self, rows: &[LogRow]) -> Result<(), StoreError> {
            if rows.is_empty() {
                return Ok(());
            }
            if self.fail_logs.load(Ordering::SeqCst) {
                return Err(StoreError::Transaction(sqlx::Error::PoolClosed));
            }
            if let Some(k) = *self.fail_logs_at_row.lock().unwrap() {
                if rows.len() > k {
                    return Err(StoreError::Transaction(sqlx::Error::PoolClosed));
                }
            }
            self.log_transactions.fetch_add(1, Ordering::SeqCst);
            self.logs.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }

        async fn insert_usage(&self, rows: &[UsageRow]) -> Result<(), StoreError> {
            if rows.is_empty() {
                return Ok(());
            }
            if self.fail_usage.load(Ordering::SeqCst) {
                return Err(StoreError::Transaction(sqlx::Error::PoolClosed));
            }
            self.usage_transactions.fetch_add(1, Ordering::SeqCst);
            self.usage.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;

    fn log_row(message: &str) -> LogRow {
        LogRow {
            timestamp: Utc::now(),
            container_name: "web".to_string(),
            log_message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_records_rows_and_transactions() {
        let store = MemoryStore::new();
        store
            .insert_logs(&[log_row("a"), log_row("b")])
            .await
            .unwrap();
        store.insert_logs(&[log_row("c")]).await.unwrap();

        assert_eq!(store.log_count(), 3);
        assert_eq!(
            store
                .log_transactions
                .load(std::sync::atomic::Ordering::SeqCst),
            2
        );
    }

    #[tokio::test]
    async fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        store.fail_logs(true);

        let err = store.insert_logs(&[log_row("a")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Transaction(_)));
        assert_eq!(store.log_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let store = MemoryStore::new();
        store.fail_logs(true);

        // Empty slices never touch the store, even with failures armed.
        store.insert_logs(&[]).await.unwrap();
        store.insert_usage(&[]).await.unwrap();
        assert_eq!(
            store
                .log_transactions
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    /// Exercises the real Postgres path. Requires a reachable database:
    /// `DATABASE_URL=postgres://... cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_postgres_store_round_trip() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresStore::connect(&url, 3, Duration::from_millis(100))
            .await
            .expect("connect");

        store
            .insert_logs(&[log_row("integration test line")])
            .await
            .expect("insert_logs");

        store
            .insert_usage(&[UsageRow {
                timestamp: Utc::now(),
                container_id: "itest".to_string(),
                cpu_percent: 12.5,
                memory_percent: 40.0,
            }])
            .await
            .expect("insert_usage");
    }
}
