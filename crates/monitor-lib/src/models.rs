//! Core data models for the telemetry pipeline

use crate::proto;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed metadata describing one container's log session.
///
/// Constructed once per inspected container and reused for every line the
/// container emits. The serde names match the collector's JSON schema, which
/// the REST fallback path (`rest::BackendClient`) puts on the wire verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMetadata {
    #[serde(rename = "ContainerID")]
    pub container_id: String,
    #[serde(rename = "ContainerName")]
    pub container_name: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "LogPath")]
    pub log_path: String,
    #[serde(rename = "LogDriver")]
    pub log_driver: String,
}

/// One resource-usage sample for a container.
///
/// `cpu_percent` and `memory_percent` are derived from raw counters by
/// [`crate::stats`]; the remaining fields carry the raw counters end-to-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub container_id: String,
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub cpu_usage: u64,
    pub system_cpu_usage: u64,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_percent: f64,
    pub memory_cache: u64,
}

impl From<&LogMetadata> for proto::ContainerLogMetadata {
    fn from(m: &LogMetadata) -> Self {
        Self {
            container_id: m.container_id.clone(),
            container_name: m.container_name.clone(),
            image: m.image.clone(),
            state: m.state.clone(),
            log_path: m.log_path.clone(),
            log_driver: m.log_driver.clone(),
        }
    }
}

impl From<&UsageRecord> for proto::ContainerUsageStats {
    fn from(r: &UsageRecord) -> Self {
        Self {
            container_id: r.container_id.clone(),
            timestamp: r.timestamp.timestamp(),
            cpu_percent: r.cpu_percent,
            cpu_usage: r.cpu_usage,
            system_cpu_usage: r.system_cpu_usage,
            memory_usage: r.memory_usage,
            memory_limit: r.memory_limit,
            memory_percent: r.memory_percent,
            memory_cache: r.memory_cache,
        }
    }
}
