//! REST fallback delivery
//!
//! Secondary delivery path for log lines when the gRPC uplink is not
//! available: each line is POSTed as JSON to the collector's HTTP endpoint,
//! with exponential-backoff retries around every request.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::LogMetadata;
use crate::retry::{self, RetryExhausted};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire format of one log delivery. Field names match the collector's
/// JSON schema exactly.
#[derive(Debug, Serialize)]
struct LogDelivery<'a> {
    #[serde(rename = "Metadata")]
    metadata: &'a LogMetadata,
    #[serde(rename = "Log")]
    log: &'a str,
}

#[derive(Debug, Error)]
pub enum RestError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector returned status {0}")]
    Status(StatusCode),
}

/// HTTP client for the collector's REST ingest endpoint.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    initial_delay: Duration,
}

impl BackendClient {
    /// `base_url` is the collector root, e.g. `http://localhost:8080`;
    /// deliveries go to `{base_url}/logs/stream`.
    pub fn new(
        base_url: impl Into<String>,
        max_attempts: u32,
        initial_delay: Duration,
    ) -> Result<Self, RestError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_attempts,
            initial_delay,
        })
    }

    /// Deliver one log line, retrying transport errors and non-2xx responses
    /// with exponential backoff.
    pub async fn send_log(
        &self,
        metadata: &LogMetadata,
        log: &str,
    ) -> Result<(), RetryExhausted<RestError>> {
        let url = format!("{}/logs/stream", self.base_url);
        let delivery = LogDelivery { metadata, log };

        retry::with_backoff(self.max_attempts, self.initial_delay, || async {
            let response = self.client.post(&url).json(&delivery).send().await?;

            let status = response.status();
            if status.is_success() {
                debug!(container = %metadata.container_name, "delivered log over REST");
                Ok(())
            } else {
                Err(RestError::Status(status))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct TestCollector {
        hits: AtomicU32,
        fail_first: u32,
        last_body: std::sync::Mutex<Option<serde_json::Value>>,
    }

    async fn ingest(
        State(collector): State<Arc<TestCollector>>,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let hit = collector.hits.fetch_add(1, Ordering::SeqCst) + 1;
        *collector.last_body.lock().unwrap() = Some(body);
        if hit <= collector.fail_first {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }

    async fn spawn_collector(fail_first: u32) -> (SocketAddr, Arc<TestCollector>) {
        let collector = Arc::new(TestCollector {
            hits: AtomicU32::new(0),
            fail_first,
            last_body: std::sync::Mutex::new(None),
        });
        let app = Router::new()
            .route("/logs/stream", post(ingest))
            .with_state(collector.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, collector)
    }

    fn metadata() -> LogMetadata {
        LogMetadata {
            container_id: "abc123".to_string(),
            container_name: "web".to_string(),
            image: "nginx:latest".to_string(),
            state: "running".to_string(),
            log_path: "/var/log/abc123.log".to_string(),
            log_driver: "json-file".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_log_delivers_expected_json() {
        let (addr, collector) = spawn_collector(0).await;
        let client =
            BackendClient::new(format!("http://{addr}"), 3, Duration::from_millis(1)).unwrap();

        client.send_log(&metadata(), "hello world").await.unwrap();

        let body = collector.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["Log"], "hello world");
        assert_eq!(body["Metadata"]["ContainerID"], "abc123");
        assert_eq!(body["Metadata"]["ContainerName"], "web");
    }

    #[tokio::test]
    async fn test_send_log_retries_server_errors() {
        let (addr, collector) = spawn_collector(2).await;
        let client =
            BackendClient::new(format!("http://{addr}"), 3, Duration::from_millis(1)).unwrap();

        client.send_log(&metadata(), "retry me").await.unwrap();
        assert_eq!(collector.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_send_log_exhausts_after_max_attempts() {
        let (addr, collector) = spawn_collector(u32::MAX).await;
        let client =
            BackendClient::new(format!("http://{addr}"), 3, Duration::from_millis(1)).unwrap();

        let err = client.send_log(&metadata(), "doomed").await.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert!(matches!(err.source, RestError::Status(_)));
        assert_eq!(collector.hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client =
            BackendClient::new("http://localhost:8080/", 1, Duration::from_millis(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
