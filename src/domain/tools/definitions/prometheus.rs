//! Prometheus Tools - metric queries proxied through a Grafana datasource.
//!
//! Every tool takes an optional `datasource_uid`; when it is absent the
//! configured default datasource is used.

use serde::{Deserialize, Serialize};

use super::lenient_number;
use crate::domain::tools::ToolDefinition;

/// Range queries without `start` look back this many seconds from `end`.
pub const DEFAULT_RANGE_SECONDS: f64 = 3600.0;

/// Default range query resolution, in seconds.
pub const DEFAULT_STEP_SECONDS: f64 = 60.0;

// ═══════════════════════════════════════════════════════════════════════════
// Tool Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Parameters for an instant query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantQueryParams {
    /// PromQL expression
    pub query: String,
    pub datasource_uid: Option<String>,
    /// Evaluation time, Unix seconds
    #[serde(default, deserialize_with = "lenient_number")]
    pub time: Option<f64>,
}

/// Parameters for a range query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeQueryParams {
    /// PromQL expression
    pub query: String,
    pub datasource_uid: Option<String>,
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_number")]
    pub start: Option<f64>,
    /// Unix seconds
    #[serde(default, deserialize_with = "lenient_number")]
    pub end: Option<f64>,
    /// Resolution in seconds
    #[serde(default, deserialize_with = "lenient_number")]
    pub step: Option<f64>,
}

impl RangeQueryParams {
    /// Resolve `(start, end, step)`, filling gaps relative to `now`.
    pub fn window(&self, now: f64) -> (f64, f64, f64) {
        let end = self.end.unwrap_or(now);
        let start = self.start.unwrap_or(end - DEFAULT_RANGE_SECONDS);
        let step = self.step.unwrap_or(DEFAULT_STEP_SECONDS);
        (start, end, step)
    }
}

/// Parameters for tools that only pick a datasource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasourceParams {
    pub datasource_uid: Option<String>,
}

/// Parameters for listing label values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelValuesParams {
    pub label: String,
    pub datasource_uid: Option<String>,
}

/// Parameters for a series lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesParams {
    /// Series selector, e.g. `up{job="api"}`
    #[serde(rename = "match")]
    pub selector: String,
    pub datasource_uid: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub start: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub end: Option<f64>,
}

/// Parameters for the service status summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStatusParams {
    pub job: Option<String>,
    pub instance: Option<String>,
    pub datasource_uid: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions
// ═══════════════════════════════════════════════════════════════════════════

fn datasource_uid_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "UID of the Prometheus datasource (defaults to GRAFANA_DEFAULT_DATASOURCE_UID)"
    })
}

/// Creates the prometheus_query tool definition.
pub fn prometheus_query_tool() -> ToolDefinition {
    ToolDefinition::new(
        "prometheus_query",
        "Run an instant PromQL query through a Grafana Prometheus datasource.",
        serde_json::json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "PromQL expression, e.g. rate(http_requests_total[5m])"
                },
                "datasource_uid": datasource_uid_property(),
                "time": {
                    "type": "number",
                    "description": "Evaluation timestamp in Unix seconds (default: now)"
                }
            }
        }),
    )
}

/// Creates the prometheus_query_range tool definition.
pub fn prometheus_query_range_tool() -> ToolDefinition {
    ToolDefinition::new(
        "prometheus_query_range",
        "Run a PromQL range query and summarize each returned series with sum, average, min, max, first, and last values.",
        serde_json::json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "PromQL expression"
                },
                "datasource_uid": datasource_uid_property(),
                "start": {
                    "type": "number",
                    "description": "Start timestamp in Unix seconds (default: one hour before end)"
                },
                "end": {
                    "type": "number",
                    "description": "End timestamp in Unix seconds (default: now)"
                },
                "step": {
                    "type": "number",
                    "description": "Resolution step in seconds (default: 60)",
                    "default": DEFAULT_STEP_SECONDS
                }
            }
        }),
    )
}

/// Creates the list_metrics tool definition.
pub fn list_metrics_tool() -> ToolDefinition {
    ToolDefinition::new(
        "list_metrics",
        "List metric names known to a Prometheus datasource (first 100).",
        serde_json::json!({
            "type": "object",
            "properties": {
                "datasource_uid": datasource_uid_property()
            }
        }),
    )
}

/// Creates the get_label_values tool definition.
pub fn get_label_values_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_label_values",
        "List the values of a label in a Prometheus datasource (first 100).",
        serde_json::json!({
            "type": "object",
            "required": ["label"],
            "properties": {
                "label": {
                    "type": "string",
                    "description": "Label name, e.g. job or instance"
                },
                "datasource_uid": datasource_uid_property()
            }
        }),
    )
}

/// Creates the get_series tool definition.
pub fn get_series_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_series",
        "Find series matching a selector in a Prometheus datasource (first 100).",
        serde_json::json!({
            "type": "object",
            "required": ["match"],
            "properties": {
                "match": {
                    "type": "string",
                    "description": "Series selector, e.g. up{job=\"api\"}"
                },
                "datasource_uid": datasource_uid_property(),
                "start": {
                    "type": "number",
                    "description": "Start timestamp in Unix seconds"
                },
                "end": {
                    "type": "number",
                    "description": "End timestamp in Unix seconds"
                }
            }
        }),
    )
}

/// Creates the get_service_status tool definition.
pub fn get_service_status_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_service_status",
        "Report which scrape targets are UP or DOWN according to the Prometheus up metric.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "job": {
                    "type": "string",
                    "description": "Only targets of this job"
                },
                "instance": {
                    "type": "string",
                    "description": "Only this instance"
                },
                "datasource_uid": datasource_uid_property()
            }
        }),
    )
}
