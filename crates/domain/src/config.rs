//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    ELAPSED_REFRESH_INTERVAL_MS, RECONCILE_INTERVAL_SECS, SERVER_REFRESH_INTERVAL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
}

/// Backend REST API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Attempts for idempotent reads. Mutations are never retried.
    pub max_attempts: u32,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

/// Persisted key-value store configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the store. `None` keeps everything in memory.
    pub path: Option<String>,
}

/// Active-ticket timer periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub elapsed_refresh_ms: u64,
    pub reconcile_interval_seconds: u64,
    pub server_refresh_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
            token: None,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            elapsed_refresh_ms: ELAPSED_REFRESH_INTERVAL_MS,
            reconcile_interval_seconds: RECONCILE_INTERVAL_SECS,
            server_refresh_seconds: SERVER_REFRESH_INTERVAL_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
