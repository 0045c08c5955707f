//! PrometheusToolsHandler - metric queries through a Grafana datasource proxy.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use super::require;
use crate::domain::grafana::{Capped, QueryResult, SeriesStats, MAX_LIST_ITEMS};
use crate::domain::tools::definitions::{
    DatasourceParams, InstantQueryParams, LabelValuesParams, RangeQueryParams, SeriesParams,
    ServiceStatusParams,
};
use crate::ports::{GrafanaApi, TimeRange, ToolExecutionError};

/// Handler for the Prometheus tools.
pub struct PrometheusToolsHandler {
    api: Arc<dyn GrafanaApi>,
}

impl PrometheusToolsHandler {
    pub fn new(api: Arc<dyn GrafanaApi>) -> Self {
        Self { api }
    }

    pub async fn query(&self, params: InstantQueryParams) -> Result<Value, ToolExecutionError> {
        let query = require("query", &params.query)?;
        let response = self
            .api
            .prometheus_query(query, params.datasource_uid.as_deref(), params.time)
            .await?;

        Ok(json!({
            "query": query,
            "status": response.status,
            "resultType": response.data.result_type(),
            "result_count": response.data.len(),
            "result": result_json(&response.data),
        }))
    }

    /// Range query with per-series statistics. Missing bounds default to the
    /// last hour at one-minute resolution.
    pub async fn query_range(&self, params: RangeQueryParams) -> Result<Value, ToolExecutionError> {
        let query = require("query", &params.query)?;
        let now = Utc::now().timestamp() as f64;
        let (start, end, step) = params.window(now);

        if ![start, end, step].iter().all(|bound| bound.is_finite()) {
            return Err(ToolExecutionError::invalid("start, end and step must be finite"));
        }
        if step <= 0.0 {
            return Err(ToolExecutionError::invalid("step must be positive"));
        }
        if start > end {
            return Err(ToolExecutionError::invalid("start must not be after end"));
        }

        let range = TimeRange { start, end, step };
        let response = self
            .api
            .prometheus_query_range(query, range, params.datasource_uid.as_deref())
            .await?;

        let series: Vec<Value> = match &response.data {
            QueryResult::Matrix(matrix) => matrix
                .iter()
                .map(|series| {
                    json!({
                        "metric": series.metric,
                        "stats": SeriesStats::from_samples(&series.values),
                        "values": series.values,
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(json!({
            "query": query,
            "status": response.status,
            "resultType": response.data.result_type(),
            "start": start,
            "end": end,
            "step": step,
            "series_count": series.len(),
            "series": series,
        }))
    }

    pub async fn list_metrics(&self, params: DatasourceParams) -> Result<Value, ToolExecutionError> {
        let names = self.api.get_metric_names(params.datasource_uid.as_deref()).await?;
        let capped = Capped::new(names, MAX_LIST_ITEMS);

        Ok(json!({
            "total": capped.total,
            "truncated": capped.truncated,
            "metrics": capped.items,
        }))
    }

    pub async fn label_values(&self, params: LabelValuesParams) -> Result<Value, ToolExecutionError> {
        let label = require("label", &params.label)?;
        let values = self
            .api
            .get_label_values(label, params.datasource_uid.as_deref())
            .await?;
        let capped = Capped::new(values, MAX_LIST_ITEMS);

        Ok(json!({
            "label": label,
            "total": capped.total,
            "truncated": capped.truncated,
            "values": capped.items,
        }))
    }

    pub async fn series(&self, params: SeriesParams) -> Result<Value, ToolExecutionError> {
        let selector = require("match", &params.selector)?;
        let series = self
            .api
            .get_series(selector, params.start, params.end, params.datasource_uid.as_deref())
            .await?;
        let capped = Capped::new(series, MAX_LIST_ITEMS);

        Ok(json!({
            "match": selector,
            "total": capped.total,
            "truncated": capped.truncated,
            "series": capped.items,
        }))
    }

    pub async fn service_status(&self, params: ServiceStatusParams) -> Result<Value, ToolExecutionError> {
        let services = self
            .api
            .get_service_status(
                params.job.as_deref(),
                params.instance.as_deref(),
                params.datasource_uid.as_deref(),
            )
            .await?;
        let up = services.iter().filter(|service| service.is_up()).count();

        Ok(json!({
            "total": services.len(),
            "up": up,
            "down": services.len() - up,
            "services": services,
        }))
    }
}

fn result_json(result: &QueryResult) -> Value {
    match result {
        QueryResult::Vector(samples) => json!(samples),
        QueryResult::Matrix(series) => json!(series),
        QueryResult::Scalar(pair) | QueryResult::Text(pair) => json!(pair),
    }
}
