use std::io;
use thiserror::Error;

/// Custom error type for the auto-monitor library
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Metric collection failed: {0}")]
    Collector(String),
}

/// Result type alias for the auto-monitor library
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        MonitorError::Storage(msg.into())
    }

    pub fn collector<S: Into<String>>(msg: S) -> Self {
        MonitorError::Collector(msg.into())
    }
}
