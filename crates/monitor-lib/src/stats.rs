//! Usage sample derivation
//!
//! Pure functions that turn two consecutive raw counter snapshots into the
//! derived percentage fields of a [`UsageRecord`]. Kept free of any transport
//! or storage dependency so the arithmetic is testable in isolation.

use crate::models::UsageRecord;
use chrono::{DateTime, Utc};

/// Raw CPU counters read from one stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    /// Total CPU time consumed by the container, in nanoseconds.
    pub total_usage: u64,
    /// Total CPU time consumed by the whole host, in nanoseconds.
    pub system_usage: u64,
}

/// One raw stats snapshot as produced by the record source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawUsageSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuSnapshot,
    /// Number of CPUs available to the container at sampling time.
    pub online_cpus: u32,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_cache: u64,
}

/// CPU utilisation as a percentage of total host capacity, scaled by the
/// number of online CPUs (so a container saturating 2 of 4 cores reads 200%).
///
/// Returns 0 unless both the container and system counters moved forward
/// between the two snapshots.
pub fn cpu_percent(previous: &CpuSnapshot, current: &CpuSnapshot, online_cpus: u32) -> f64 {
    let cpu_delta = current.total_usage as f64 - previous.total_usage as f64;
    let system_delta = current.system_usage as f64 - previous.system_usage as f64;

    if system_delta > 0.0 && cpu_delta > 0.0 {
        (cpu_delta / system_delta) * online_cpus as f64 * 100.0
    } else {
        0.0
    }
}

/// Memory utilisation as a percentage of the container's limit.
///
/// Returns 0 for unlimited containers (`memory_limit == 0`).
pub fn memory_percent(memory_usage: u64, memory_limit: u64) -> f64 {
    if memory_limit != 0 {
        (memory_usage as f64 / memory_limit as f64) * 100.0
    } else {
        0.0
    }
}

/// Build a [`UsageRecord`] from the current snapshot and the CPU counters of
/// the previous one. The first sample of a session has no previous snapshot
/// and derives `cpu_percent = 0`.
pub fn derive_usage(
    container_id: &str,
    previous_cpu: Option<&CpuSnapshot>,
    raw: &RawUsageSnapshot,
) -> UsageRecord {
    let cpu_pct = match previous_cpu {
        Some(prev) => cpu_percent(prev, &raw.cpu, raw.online_cpus),
        None => 0.0,
    };

    UsageRecord {
        container_id: container_id.to_string(),
        timestamp: raw.timestamp,
        cpu_percent: cpu_pct,
        cpu_usage: raw.cpu.total_usage,
        system_cpu_usage: raw.cpu.system_usage,
        memory_usage: raw.memory_usage,
        memory_limit: raw.memory_limit,
        memory_percent: memory_percent(raw.memory_usage, raw.memory_limit),
        memory_cache: raw.memory_cache,
    }
}
