//! Mock Grafana API for testing.
//!
//! Provides a configurable implementation of the GrafanaApi port so tools
//! and the protocol server can be tested without a Grafana instance.
//!
//! # Features
//!
//! - Canned JSON responses per operation, optionally keyed by argument
//!   (dashboard UID, tag, label, query)
//! - Error injection
//! - Datasource resolution identical to the HTTP client
//! - Call tracking for verification
//!
//! # Example
//!
//! ```
//! use grafana_observer::adapters::grafana::MockGrafanaApi;
//! use grafana_observer::ports::GrafanaApi;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let api = MockGrafanaApi::new()
//!     .with_keyed_response("get_folder", "ops", json!({ "uid": "ops", "title": "Ops" }));
//!
//! let folder = api.get_folder("ops").await.unwrap();
//! assert_eq!(folder.title.as_deref(), Some("Ops"));
//! assert_eq!(api.call_count(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::grafana::{
    DashboardDocument, DataSource, Folder, HealthStatus, Labels, OrgInfo, PrometheusResponse,
    QueryResult, SearchHit, TagCount,
};
use crate::ports::{GrafanaApi, GrafanaError, SearchPage, SearchQuery, TimeRange};

/// A configured mock reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Deserialized into the operation's return type.
    Json(Value),
    /// Returned as-is.
    Error(GrafanaError),
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Port method name, e.g. `search_dashboards`
    pub operation: &'static str,
    /// Distinguishing argument (UID, tag, label, query), if any
    pub key: Option<String>,
    /// Datasource the call resolved to, for Prometheus operations
    pub datasource_uid: Option<String>,
}

/// Mock Grafana API.
///
/// Replies are looked up by `operation:key` first, then by `operation`.
/// Replies are not consumed, so one configuration serves repeated calls.
#[derive(Debug, Clone, Default)]
pub struct MockGrafanaApi {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    default_datasource_uid: Option<String>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGrafanaApi {
    /// Creates a mock with no replies configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reply for every call of an operation.
    pub fn with_response(self, operation: &str, body: Value) -> Self {
        self.with_reply(operation.to_string(), MockReply::Json(body))
    }

    /// Sets the reply for calls of an operation with a specific key.
    pub fn with_keyed_response(self, operation: &str, key: &str, body: Value) -> Self {
        self.with_reply(format!("{}:{}", operation, key), MockReply::Json(body))
    }

    /// Makes every call of an operation fail.
    pub fn with_error(self, operation: &str, error: GrafanaError) -> Self {
        self.with_reply(operation.to_string(), MockReply::Error(error))
    }

    /// Sets the datasource used when a Prometheus call names none.
    pub fn with_default_datasource(mut self, uid: impl Into<String>) -> Self {
        self.default_datasource_uid = Some(uid.into());
        self
    }

    fn with_reply(self, key: String, reply: MockReply) -> Self {
        lock(&self.replies).insert(key, reply);
        self
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Returns the recorded calls of one operation.
    pub fn calls_to(&self, operation: &str) -> Vec<MockCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.operation == operation)
            .cloned()
            .collect()
    }

    fn resolve_datasource(&self, explicit: Option<&str>) -> Result<String, GrafanaError> {
        explicit
            .filter(|uid| !uid.is_empty())
            .or(self.default_datasource_uid.as_deref())
            .map(str::to_string)
            .ok_or(GrafanaError::DatasourceRequired)
    }

    /// Record the call and produce the configured reply.
    fn reply<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        key: Option<&str>,
        datasource_uid: Option<String>,
    ) -> Result<T, GrafanaError> {
        lock(&self.calls).push(MockCall {
            operation,
            key: key.map(str::to_string),
            datasource_uid,
        });

        let replies = lock(&self.replies);
        let reply = key
            .and_then(|key| replies.get(&format!("{}:{}", operation, key)))
            .or_else(|| replies.get(operation))
            .cloned();
        drop(replies);

        match reply {
            Some(MockReply::Json(body)) => {
                serde_json::from_value(body).map_err(|e| GrafanaError::Decode(e.to_string()))
            }
            Some(MockReply::Error(error)) => Err(error),
            None => Err(GrafanaError::request(
                Some(404),
                format!("HTTP status 404 Not Found (no mock reply for {})", operation),
                None,
            )),
        }
    }

    fn prometheus_reply<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        key: &str,
        datasource_uid: Option<&str>,
    ) -> Result<T, GrafanaError> {
        let uid = self.resolve_datasource(datasource_uid)?;
        self.reply(operation, Some(key), Some(uid))
    }
}

/// `{status, data}` envelope of the label and series endpoints.
#[derive(serde::Deserialize)]
struct PrometheusData<T> {
    data: T,
}

#[async_trait]
impl GrafanaApi for MockGrafanaApi {
    async fn get_dashboard(&self, uid: &str) -> Result<DashboardDocument, GrafanaError> {
        self.reply("get_dashboard", Some(uid), None)
    }

    async fn search_dashboards(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, GrafanaError> {
        self.reply("search_dashboards", query.tag.as_deref(), None)
    }

    async fn search_with_pagination(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<SearchPage, GrafanaError> {
        let key = page.to_string();
        let hits: Vec<SearchHit> = self.reply("search_with_pagination", Some(&key), None)?;
        Ok(SearchPage::new(hits, page, query.limit))
    }

    async fn list_folders(&self, _limit: u32) -> Result<Vec<Folder>, GrafanaError> {
        self.reply("list_folders", None, None)
    }

    async fn get_folder(&self, uid: &str) -> Result<Folder, GrafanaError> {
        self.reply("get_folder", Some(uid), None)
    }

    async fn get_dashboard_tags(&self) -> Result<Vec<TagCount>, GrafanaError> {
        self.reply("get_dashboard_tags", None, None)
    }

    async fn get_datasources(&self) -> Result<Vec<DataSource>, GrafanaError> {
        self.reply("get_datasources", None, None)
    }

    async fn get_datasource(&self, uid: &str) -> Result<DataSource, GrafanaError> {
        self.reply("get_datasource", Some(uid), None)
    }

    async fn get_home_dashboard(&self) -> Result<DashboardDocument, GrafanaError> {
        self.reply("get_home_dashboard", None, None)
    }

    async fn health_check(&self) -> Result<HealthStatus, GrafanaError> {
        self.reply("health_check", None, None)
    }

    async fn get_org_info(&self) -> Result<OrgInfo, GrafanaError> {
        self.reply("get_org_info", None, None)
    }

    async fn prometheus_query(
        &self,
        query: &str,
        datasource_uid: Option<&str>,
        _time: Option<f64>,
    ) -> Result<PrometheusResponse<QueryResult>, GrafanaError> {
        self.prometheus_reply("prometheus_query", query, datasource_uid)
    }

    async fn prometheus_query_range(
        &self,
        query: &str,
        _range: TimeRange,
        datasource_uid: Option<&str>,
    ) -> Result<PrometheusResponse<QueryResult>, GrafanaError> {
        self.prometheus_reply("prometheus_query_range", query, datasource_uid)
    }

    async fn get_metric_names(
        &self,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<String>, GrafanaError> {
        let response: PrometheusData<Vec<String>> =
            self.prometheus_reply("get_metric_names", "__name__", datasource_uid)?;
        Ok(response.data)
    }

    async fn get_label_values(
        &self,
        label: &str,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<String>, GrafanaError> {
        let response: PrometheusData<Vec<String>> =
            self.prometheus_reply("get_label_values", label, datasource_uid)?;
        Ok(response.data)
    }

    async fn get_series(
        &self,
        selector: &str,
        _start: Option<f64>,
        _end: Option<f64>,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<Labels>, GrafanaError> {
        let response: PrometheusData<Vec<Labels>> =
            self.prometheus_reply("get_series", selector, datasource_uid)?;
        Ok(response.data)
    }
}
