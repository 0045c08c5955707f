//! Tool Definitions - argument types and schemas for every Grafana tool.
//!
//! ## Module Structure
//!
//! - [`dashboards`] - Dashboard, panel, and variable inspection
//! - [`catalog`] - Folders, tags, datasources, and instance information
//! - [`prometheus`] - Metric queries proxied through a Prometheus datasource

pub mod catalog;
pub mod dashboards;
pub mod prometheus;

pub use catalog::*;
pub use dashboards::*;
pub use prometheus::*;

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::ToolDefinition;

/// Default `limit` for search and listing tools.
pub const DEFAULT_LIMIT: u32 = 100;

/// Every tool, in the order `tools/list` advertises them.
pub fn all_tools() -> Vec<ToolDefinition> {
    vec![
        get_dashboard_tool(),
        get_panel_tool(),
        list_dashboards_tool(),
        search_dashboards_paginated_tool(),
        get_dashboard_variables_tool(),
        list_folders_tool(),
        get_folder_tool(),
        search_by_tag_tool(),
        get_dashboard_tags_tool(),
        get_datasources_tool(),
        get_datasource_tool(),
        get_home_dashboard_tool(),
        health_check_tool(),
        get_org_info_tool(),
        prometheus_query_tool(),
        prometheus_query_range_tool(),
        list_metrics_tool(),
        get_label_values_tool(),
        get_series_tool(),
        get_service_status_tool(),
        get_panel_queries_tool(),
    ]
}

/// Accepts a JSON number or a numeric string; `null` and absence are `None`.
/// `NaN` and infinities are rejected even where the target type could hold them.
pub(crate) fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
    T::Err: Display,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.parse::<f64>().is_ok_and(|value| !value.is_finite()) {
                return Err(D::Error::custom(format!("number must be finite, got {:?}", text)));
            }
            trimmed
                .parse::<T>()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid number {:?}: {}", text, e)))
        }
        Some(number @ Value::Number(_)) => {
            serde_json::from_value(number).map(Some).map_err(D::Error::custom)
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a number, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Deserialize)]
    struct Count {
        #[serde(default, deserialize_with = "lenient_number")]
        value: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    struct Seconds {
        #[serde(default, deserialize_with = "lenient_number")]
        value: Option<f64>,
    }

    fn count(json: Value) -> Result<Option<u32>, serde_json::Error> {
        serde_json::from_value::<Count>(json).map(|c| c.value)
    }

    fn seconds(json: Value) -> Result<Option<f64>, serde_json::Error> {
        serde_json::from_value::<Seconds>(json).map(|s| s.value)
    }

    #[test]
    fn lenient_number_accepts_numbers_and_strings() {
        assert_eq!(count(serde_json::json!({ "value": 7 })).unwrap(), Some(7));
        assert_eq!(count(serde_json::json!({ "value": " 12 " })).unwrap(), Some(12));
        assert_eq!(count(serde_json::json!({ "value": null })).unwrap(), None);
        assert_eq!(count(serde_json::json!({})).unwrap(), None);
    }

    #[test]
    fn lenient_number_rejects_garbage() {
        assert!(count(serde_json::json!({ "value": "many" })).is_err());
        assert!(count(serde_json::json!({ "value": true })).is_err());
        assert!(count(serde_json::json!({ "value": -1 })).is_err());
    }

    #[test]
    fn lenient_number_rejects_non_finite_floats() {
        assert_eq!(
            seconds(serde_json::json!({ "value": "1700000000.5" })).unwrap(),
            Some(1_700_000_000.5)
        );
        for text in ["NaN", "nan", "inf", "-inf", "infinity", " +Infinity "] {
            assert!(seconds(serde_json::json!({ "value": text })).is_err(), "{}", text);
        }
    }

    #[test]
    fn catalog_has_twenty_one_unique_tools() {
        let tools = all_tools();
        let names: HashSet<&str> = tools.iter().map(ToolDefinition::name).collect();

        assert_eq!(tools.len(), 21);
        assert_eq!(names.len(), 21);
    }

    #[test]
    fn every_schema_is_an_object() {
        for tool in all_tools() {
            assert_eq!(tool.parameters_schema()["type"], "object", "{}", tool.name());
            assert!(!tool.description().is_empty());
        }
    }
}
