//! HTTP API for health checks and Prometheus metrics

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use monitor_lib::BatchAccumulator;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub accumulator: Arc<BatchAccumulator>,
}

impl AppState {
    pub fn new(accumulator: Arc<BatchAccumulator>) -> Self {
        Self { accumulator }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    pending_logs: usize,
    pending_usage: usize,
}

/// Health check response with current buffer depths
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pending = state.accumulator.pending().await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            pending_logs: pending.logs,
            pending_usage: pending.usage,
        }),
    )
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            err.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
