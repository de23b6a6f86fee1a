//! Integration tests for the collector API endpoints

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use monitor_lib::store::testing::MemoryStore;
use monitor_lib::store::LogRow;
use monitor_lib::{BatchAccumulator, PipelineMetrics};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone)]
struct AppState {
    accumulator: Arc<BatchAccumulator>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    pending_logs: usize,
    pending_usage: usize,
}

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

async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

fn setup_test_app() -> (Router, Arc<AppState>) {
    let store = Arc::new(MemoryStore::new());
    let accumulator = Arc::new(BatchAccumulator::new(store, 1000).unwrap());
    let state = Arc::new(AppState { accumulator });
    let router = create_test_router(state.clone());
    (router, state)
}

#[tokio::test]
async fn test_healthz_reports_pending_buffer_depths() {
    let (app, state) = setup_test_app();

    state
        .accumulator
        .add_log(LogRow {
            timestamp: Utc::now(),
            container_name: "web".to_string(),
            log_message: "hello".to_string(),
        })
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(health["status"], "ok");
    assert_eq!(health["pending_logs"], 1);
    assert_eq!(health["pending_usage"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _state) = setup_test_app();

    // Touch some metrics so they show up in exposition
    let metrics_handle = PipelineMetrics::new();
    metrics_handle.inc_records_received("log");
    metrics_handle.inc_batch_flushes("log");
    metrics_handle.observe_flush_duration(0.002);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("monitor_records_received_total"));
    assert!(metrics_text.contains("monitor_batch_flushes_total"));
    assert!(metrics_text.contains("monitor_flush_duration_seconds_bucket"));
}
