//! Connection pool and slot selection
//!
//! The pool holds a fixed set of gRPC channels, opened eagerly at startup.
//! Streams are per-slot and lazy: a slot carries at most one live log stream
//! and one live usage stream, created on first use and replaced on failure.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tonic::codec::Streaming;
use tonic::transport::{Channel, Endpoint};
use tracing::info;

use super::UplinkError;
use crate::proto::{ContainerUsageStats, LogData, LogResponse, UsageResponse};

/// A live bidirectional log stream: the outbound sender half and the inbound
/// acknowledgement half. Dropped wholesale on any send or ack failure.
pub(super) struct LogStreamHandle {
    pub tx: mpsc::Sender<LogData>,
    pub inbound: Streaming<LogResponse>,
}

/// A live bidirectional usage stream.
pub(super) struct UsageStreamHandle {
    pub tx: mpsc::Sender<ContainerUsageStats>,
    pub inbound: Streaming<UsageResponse>,
}

/// One pooled connection plus its lazily created streams.
///
/// Each stream slot is an `Option` behind its own async mutex. The mutex is
/// held for the whole take-send-acknowledge sequence, so a handle is never
/// shared between two in-flight sends and acknowledgements stay paired with
/// the record they answer.
pub(super) struct Slot {
    pub index: usize,
    pub channel: Channel,
    pub log_stream: Mutex<Option<LogStreamHandle>>,
    pub usage_stream: Mutex<Option<UsageStreamHandle>>,
}

/// Lock-free rotor over pool slots.
///
/// Advancing moves to the next slot and returns it, so consecutive sends from
/// any mix of tasks spread across the pool without coordination.
pub(super) struct RoundRobin {
    current: AtomicUsize,
    len: usize,
}

impl RoundRobin {
    pub fn new(len: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            len,
        }
    }

    /// Advance to the next slot index and return it.
    pub fn advance(&self) -> usize {
        let previous = self
            .current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| {
                Some((i + 1) % self.len)
            })
            .unwrap_or(0);
        (previous + 1) % self.len
    }
}

/// Fixed-size pool of connections to one collector endpoint.
pub(super) struct ConnectionPool {
    slots: Vec<Slot>,
    rotor: RoundRobin,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl ConnectionPool {
    /// Open `size` connections to `endpoint`. Fails fast: any connection
    /// error aborts the whole pool, dropping the channels opened so far.
    pub async fn open(endpoint: &str, size: usize) -> Result<Self, UplinkError> {
        if size == 0 {
            return Err(UplinkError::EmptyPool);
        }

        let mut slots = Vec::with_capacity(size);
        for index in 0..size {
            let channel = Endpoint::from_shared(endpoint.to_string())
                .map_err(UplinkError::Connect)?
                .connect()
                .await
                .map_err(UplinkError::Connect)?;

            slots.push(Slot {
                index,
                channel,
                log_stream: Mutex::new(None),
                usage_stream: Mutex::new(None),
            });
        }

        info!(endpoint, connections = size, "connection pool established");
        Ok(Self {
            rotor: RoundRobin::new(slots.len()),
            slots,
        })
    }

    /// Pick the next slot in rotation.
    pub fn next_slot(&self) -> &Slot {
        &self.slots[self.rotor.advance()]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Drop every live stream handle. Channels stay open until the pool
    /// itself is dropped.
    pub async fn close_streams(&self) {
        for slot in &self.slots {
            slot.log_stream.lock().await.take();
            slot.usage_stream.lock().await.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_round_robin_rotates_through_all_slots() {
        let rotor = RoundRobin::new(3);
        assert_eq!(rotor.advance(), 1);
        assert_eq!(rotor.advance(), 2);
        assert_eq!(rotor.advance(), 0);
        assert_eq!(rotor.advance(), 1);
    }

    #[test]
    fn test_round_robin_is_exact_over_many_slots() {
        let rotor = RoundRobin::new(100);
        for round in 0..3 {
            for expected in 1..100 {
                assert_eq!(rotor.advance(), expected, "round {round}");
            }
            assert_eq!(rotor.advance(), 0, "round {round}");
        }
    }

    #[test]
    fn test_round_robin_single_slot() {
        let rotor = RoundRobin::new(1);
        assert_eq!(rotor.advance(), 0);
        assert_eq!(rotor.advance(), 0);
    }

    #[tokio::test]
    async fn test_round_robin_concurrent_advances_stay_in_bounds() {
        let rotor = Arc::new(RoundRobin::new(5));
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let rotor = rotor.clone();
            tasks.push(tokio::spawn(async move {
                let mut seen = HashSet::new();
                for _ in 0..100 {
                    seen.insert(rotor.advance());
                }
                seen
            }));
        }

        let mut all = HashSet::new();
        for task in tasks {
            all.extend(task.await.unwrap());
        }
        assert!(all.iter().all(|&i| i < 5));
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_pool_is_rejected() {
        let err = ConnectionPool::open("http://localhost:1", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, UplinkError::EmptyPool));
    }
}
