//! Agent configuration

use anyhow::Result;
use serde::Deserialize;

/// Agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Collector gRPC endpoint
    #[serde(default = "default_server_endpoint")]
    pub server_endpoint: String,

    /// Collector REST base URL, used when the gRPC uplink is unavailable
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Size of the gRPC connection pool
    #[serde(default = "default_connections")]
    pub connections: usize,

    /// REST delivery attempts before a line is dropped
    #[serde(default = "default_rest_attempts")]
    pub rest_attempts: u32,

    /// Initial delay between REST attempts, in seconds
    #[serde(default = "default_rest_delay")]
    pub rest_delay_secs: u64,

    /// Identity of the container whose log lines arrive on stdin
    #[serde(default = "default_container_id")]
    pub container_id: String,

    #[serde(default = "default_container_name")]
    pub container_name: String,

    #[serde(default)]
    pub image: String,

    #[serde(default = "default_state")]
    pub state: String,

    #[serde(default)]
    pub log_path: String,

    #[serde(default = "default_log_driver")]
    pub log_driver: String,
}

fn default_server_endpoint() -> String {
    "http://localhost:8888".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_connections() -> usize {
    5
}

fn default_rest_attempts() -> u32 {
    3
}

fn default_rest_delay() -> u64 {
    1
}

fn default_container_id() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_container_name() -> String {
    default_container_id()
}

fn default_state() -> String {
    "running".to_string()
}

fn default_log_driver() -> String {
    "json-file".to_string()
}

impl AgentConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("AGENT"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| AgentConfig {
            server_endpoint: default_server_endpoint(),
            backend_url: default_backend_url(),
            connections: default_connections(),
            rest_attempts: default_rest_attempts(),
            rest_delay_secs: default_rest_delay(),
            container_id: default_container_id(),
            container_name: default_container_name(),
            image: String::new(),
            state: default_state(),
            log_path: String::new(),
            log_driver: default_log_driver(),
        }))
    }
}
