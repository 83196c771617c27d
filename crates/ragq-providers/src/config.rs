//! Environment-driven configuration (§6).
//!
//! External interfaces here are all plain env vars, not a YAML/TOML
//! layer, so adapters are constructed directly from a [`Config`] rather
//! than through a generic config-file loader.

use std::env;
use std::time::Duration;

use ragq_domain::value_objects::constants::{
    DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS,
};
use thiserror::Error;

/// Failure to assemble [`Config`] from the process environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable was unset.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_host: String,
    pub redis_port: u16,
    pub embedding_api_url: String,
    pub vector_store_url: String,
    pub llm_api_url: String,
    pub file_registry_url: String,
    pub worker_id: String,
    pub worker_type: String,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub http_bind_addr: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// The external service endpoints fail startup immediately if unset
    /// rather than silently defaulting to a localhost URL that would only
    /// surface as a connection error on the first request. Everything
    /// else (polling/heartbeat cadence, worker identity, bind address)
    /// has a workable default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            redis_host: required_env("REDIS_HOST")?,
            redis_port: env_or("REDIS_PORT", "6379").parse().unwrap_or(6379),
            embedding_api_url: required_env("EMBEDDING_API_URL")?,
            vector_store_url: required_env("VECTOR_STORE_URL")?,
            llm_api_url: required_env("LLM_API_URL")?,
            file_registry_url: required_env("FILE_REGISTRY_URL")?,
            worker_id: env_or("WORKER_ID", "worker-1"),
            worker_type: env_or("WORKER_TYPE", "rag"),
            poll_interval: Duration::from_millis(
                env_or("POLL_INTERVAL_MS", &DEFAULT_POLL_INTERVAL_MS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            heartbeat_interval: Duration::from_millis(
                env_or(
                    "HEARTBEAT_INTERVAL_MS",
                    &DEFAULT_HEARTBEAT_INTERVAL_MS.to_string(),
                )
                .parse()
                .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS),
            ),
            http_bind_addr: env_or("HTTP_BIND_ADDR", "0.0.0.0:3000"),
        })
    }

    /// `redis://host:port/` connection string.
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn required_env(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

/// Shared `reqwest::Client` builder configuration for the outbound HTTP
/// adapters (embedding, vector store, LLM, file registry).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "ragq-providers/0.1".to_owned(),
        }
    }
}

impl HttpClientConfig {
    /// Build the `reqwest::Client`.
    pub fn build(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
    }
}
