//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Grafana connection values use the
//! plain `GRAFANA_` prefix; ambient settings use the `GRAFANA_OBSERVER` prefix
//! and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use grafana_observer::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let grafana = config.grafana_config().expect("Invalid Grafana connection");
//! println!("Grafana at {}", grafana.base_url);
//! ```

mod error;
mod grafana;
mod logging;

pub use error::{ConfigError, ValidationError};
pub use grafana::{
    normalize_base_url, AuthMethod, ConnectionSettings, GrafanaAuth, GrafanaConfig,
    DEFAULT_ORG_ID, REQUEST_TIMEOUT,
};
pub use logging::{LogFormat, LoggingConfig};

use serde::Deserialize;

/// Ambient settings read from `GRAFANA_OBSERVER__*`.
#[derive(Debug, Clone, Default, Deserialize)]
struct AmbientSettings {
    #[serde(default)]
    logging: LoggingConfig,
}

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Logging configuration (level, format)
    pub logging: LoggingConfig,

    /// Unvalidated Grafana connection settings
    pub grafana: ConnectionSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `GRAFANA_OBSERVER__*` variables for ambient settings
    /// 3. Reads `GRAFANA_*` variables for the connection
    ///
    /// # Environment Variable Format
    ///
    /// - `GRAFANA_OBSERVER__LOGGING__LEVEL=debug` -> `logging.level = debug`
    /// - `GRAFANA_URL=https://grafana.example.com` -> `grafana.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let ambient: AmbientSettings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GRAFANA_OBSERVER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(Self {
            logging: ambient.logging,
            grafana: ConnectionSettings::from_env()?,
        })
    }

    /// Validate ambient configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        Ok(())
    }

    /// Validate the Grafana connection settings.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the base URL or credentials are missing.
    pub fn grafana_config(&self) -> Result<GrafanaConfig, ValidationError> {
        GrafanaConfig::from_settings(self.grafana.clone())
    }
}
