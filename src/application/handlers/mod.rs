//! Application handlers.
//!
//! Each handler groups the tools of one area. Handlers call the Grafana port
//! and reshape its records into the summaries returned to MCP clients.

pub mod catalog;
pub mod dashboards;
pub mod prometheus;

pub use catalog::CatalogToolsHandler;
pub use dashboards::DashboardToolsHandler;
pub use prometheus::PrometheusToolsHandler;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ports::ToolExecutionError;

/// Deserialize tool arguments into their parameter type.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolExecutionError> {
    serde_json::from_value(arguments.clone()).map_err(|e| ToolExecutionError::invalid(e.to_string()))
}

/// Reject empty values for required string arguments.
pub(crate) fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, ToolExecutionError> {
    if value.trim().is_empty() {
        Err(ToolExecutionError::invalid(format!(
            "Missing required argument: {}",
            name
        )))
    } else {
        Ok(value)
    }
}
