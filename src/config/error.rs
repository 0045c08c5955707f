//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("GRAFANA_URL must be set")]
    MissingBaseUrl,

    #[error(
        "Authentication required: Either GRAFANA_TOKEN or both GRAFANA_EMAIL and GRAFANA_PASSWORD must be set"
    )]
    MissingCredentials,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
