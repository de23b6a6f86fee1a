//! Core library for the container telemetry pipeline
//!
//! This crate provides both halves of the pipeline:
//! - Agent side: a pooled, multiplexed gRPC uplink with round-robin slot
//!   selection and lazy stream recovery, plus a REST fallback path
//! - Collector side: streaming ingest services feeding a dual-trigger
//!   batch accumulator that commits to Postgres transactionally
//! - Shared pieces: data models, usage derivation, retry with backoff,
//!   and observability

pub mod batch;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod proto;
pub mod rest;
pub mod retry;
pub mod stats;
pub mod store;
pub mod uplink;

pub use batch::BatchAccumulator;
pub use models::{LogMetadata, UsageRecord};
pub use observability::{PipelineMetrics, StructuredLogger};
pub use store::{PostgresStore, RecordStore};
pub use uplink::{UplinkClient, UplinkError};
