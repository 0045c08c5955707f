//! Grafana API Port - read-only access to a Grafana instance.
//!
//! Every operation maps onto one HTTP request, except
//! [`GrafanaApi::get_service_status`] and [`GrafanaApi::get_panel_queries`],
//! which are built on top of other operations and have default
//! implementations here.
//!
//! Operations are single-attempt: no retries, no backoff. Errors from the
//! transport are surfaced unchanged.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ValidationError;
use crate::domain::grafana::{
    service_statuses, up_query, DashboardDocument, DataSource, Folder, HealthStatus, Labels,
    OrgInfo, PanelQuery, PrometheusResponse, QueryResult, SearchHit, ServiceStatus, TagCount,
};

/// Default page size for dashboard search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// Port for reading dashboards, folders, datasources, and metrics.
#[async_trait]
pub trait GrafanaApi: Send + Sync {
    /// `GET /api/dashboards/uid/{uid}`
    async fn get_dashboard(&self, uid: &str) -> Result<DashboardDocument, GrafanaError>;

    /// `GET /api/search?type=dash-db`
    async fn search_dashboards(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, GrafanaError>;

    /// Dashboard search with a `page` parameter.
    ///
    /// The returned `total` is the number of hits on this page.
    async fn search_with_pagination(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<SearchPage, GrafanaError>;

    /// `GET /api/search?type=dash-folder`
    async fn list_folders(&self, limit: u32) -> Result<Vec<Folder>, GrafanaError>;

    /// `GET /api/folders/{uid}`
    async fn get_folder(&self, uid: &str) -> Result<Folder, GrafanaError>;

    /// `GET /api/dashboards/tags`
    async fn get_dashboard_tags(&self) -> Result<Vec<TagCount>, GrafanaError>;

    /// `GET /api/datasources`
    async fn get_datasources(&self) -> Result<Vec<DataSource>, GrafanaError>;

    /// `GET /api/datasources/uid/{uid}`
    async fn get_datasource(&self, uid: &str) -> Result<DataSource, GrafanaError>;

    /// `GET /api/dashboards/home`
    async fn get_home_dashboard(&self) -> Result<DashboardDocument, GrafanaError>;

    /// `GET /api/health`
    async fn health_check(&self) -> Result<HealthStatus, GrafanaError>;

    /// `GET /api/org`
    async fn get_org_info(&self) -> Result<OrgInfo, GrafanaError>;

    /// Instant query through the datasource proxy (`/api/v1/query`).
    async fn prometheus_query(
        &self,
        query: &str,
        datasource_uid: Option<&str>,
        time: Option<f64>,
    ) -> Result<PrometheusResponse<QueryResult>, GrafanaError>;

    /// Range query through the datasource proxy (`/api/v1/query_range`).
    async fn prometheus_query_range(
        &self,
        query: &str,
        range: TimeRange,
        datasource_uid: Option<&str>,
    ) -> Result<PrometheusResponse<QueryResult>, GrafanaError>;

    /// Every metric name (`/api/v1/label/__name__/values`).
    async fn get_metric_names(&self, datasource_uid: Option<&str>)
        -> Result<Vec<String>, GrafanaError>;

    /// Values of one label (`/api/v1/label/{label}/values`).
    async fn get_label_values(
        &self,
        label: &str,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<String>, GrafanaError>;

    /// Label sets of the series matching a selector (`/api/v1/series`).
    async fn get_series(
        &self,
        selector: &str,
        start: Option<f64>,
        end: Option<f64>,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<Labels>, GrafanaError>;

    /// Scrape target states from the `up` metric.
    ///
    /// Results that are not instant vectors yield an empty list.
    async fn get_service_status(
        &self,
        job: Option<&str>,
        instance: Option<&str>,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<ServiceStatus>, GrafanaError> {
        let query = up_query(job, instance);
        let response = self.prometheus_query(&query, datasource_uid, None).await?;
        Ok(service_statuses(&response.data))
    }

    /// Queries of every visualization panel of a dashboard, rows flattened.
    async fn get_panel_queries(&self, dashboard_uid: &str) -> Result<Vec<PanelQuery>, GrafanaError> {
        let document = self.get_dashboard(dashboard_uid).await?;
        Ok(document.dashboard.panel_queries())
    }
}

/// Filters for dashboard search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub tag: Option<String>,
    pub folder_ids: Vec<String>,
    pub dashboard_ids: Vec<String>,
    pub starred: bool,
    pub limit: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: None,
            tag: None,
            folder_ids: Vec::new(),
            dashboard_ids: Vec::new(),
            starred: false,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchQuery {
    /// Search for one tag.
    pub fn by_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// Query-string pairs for `/api/search`, always restricted to dashboards.
    ///
    /// Absent and empty filters are left out; id lists are comma-joined.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("type", "dash-db".to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(query) = self.query.as_deref().filter(|q| !q.is_empty()) {
            params.push(("query", query.to_string()));
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            params.push(("tag", tag.to_string()));
        }
        if !self.folder_ids.is_empty() {
            params.push(("folderIds", self.folder_ids.join(",")));
        }
        if !self.dashboard_ids.is_empty() {
            params.push(("dashboardIds", self.dashboard_ids.join(",")));
        }
        if self.starred {
            params.push(("starred", "true".to_string()));
        }
        params
    }
}

/// One page of dashboard search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub dashboards: Vec<SearchHit>,
    pub page: u32,
    pub limit: u32,
    /// Hits on this page, not across all pages
    pub total: usize,
}

impl SearchPage {
    pub fn new(dashboards: Vec<SearchHit>, page: u32, limit: u32) -> Self {
        Self {
            total: dashboards.len(),
            dashboards,
            page,
            limit,
        }
    }
}

/// Window of a range query, in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
    /// Resolution in seconds
    pub step: f64,
}

/// Errors that can occur talking to Grafana.
#[derive(Debug, Clone, Error)]
pub enum GrafanaError {
    /// Client could not be configured
    #[error("{0}")]
    Configuration(String),

    /// Transport failure or non-2xx response. The message includes the
    /// serialized error body when the server sent one.
    #[error("Grafana API request failed: {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// Prometheus operation with neither an explicit nor a default datasource
    #[error("Datasource UID required. Set GRAFANA_DEFAULT_DATASOURCE_UID or provide datasource_uid parameter")]
    DatasourceRequired,

    /// Response body did not match the expected shape
    #[error("Failed to decode Grafana response: {0}")]
    Decode(String),
}

impl GrafanaError {
    /// Creates a request error, appending the response body when present.
    pub fn request(status: Option<u16>, message: impl Into<String>, body: Option<String>) -> Self {
        let message = message.into();
        let message = match body.filter(|b| !b.is_empty()) {
            Some(body) => format!("{} - {}", message, body),
            None => message,
        };
        Self::Request { status, message }
    }

    /// HTTP status of a failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GrafanaError::Request { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<ValidationError> for GrafanaError {
    fn from(err: ValidationError) -> Self {
        GrafanaError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_search_targets_dashboards() {
        let params = SearchQuery::default().to_params();

        assert_eq!(
            params,
            vec![("type", "dash-db".to_string()), ("limit", "100".to_string())]
        );
    }

    #[test]
    fn search_params_join_id_lists() {
        let query = SearchQuery {
            query: Some("api".to_string()),
            tag: Some(String::new()),
            folder_ids: vec!["1".to_string(), "2".to_string()],
            dashboard_ids: vec!["7".to_string()],
            starred: true,
            limit: 10,
        };

        let params = query.to_params();

        assert!(params.contains(&("query", "api".to_string())));
        assert!(params.contains(&("folderIds", "1,2".to_string())));
        assert!(params.contains(&("dashboardIds", "7".to_string())));
        assert!(params.contains(&("starred", "true".to_string())));
        assert!(params.contains(&("limit", "10".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "tag"));
    }

    #[test]
    fn unstarred_search_omits_starred_param() {
        let params = SearchQuery::by_tag("prod").to_params();

        assert!(params.contains(&("tag", "prod".to_string())));
        assert!(!params.iter().any(|(key, _)| *key == "starred"));
    }

    #[test]
    fn search_page_total_counts_page_hits() {
        let page = SearchPage::new(vec![SearchHit::default(); 3], 2, 50);

        assert_eq!(page.total, 3);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn request_error_embeds_body() {
        let err = GrafanaError::request(
            Some(404),
            "HTTP status client error (404 Not Found)",
            Some(r#"{"message":"Dashboard not found"}"#.to_string()),
        );

        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            r#"Grafana API request failed: HTTP status client error (404 Not Found) - {"message":"Dashboard not found"}"#
        );
    }

    #[test]
    fn request_error_without_body() {
        let err = GrafanaError::request(None, "operation timed out", None);
        assert_eq!(err.to_string(), "Grafana API request failed: operation timed out");
    }

    #[test]
    fn validation_error_converts_to_configuration() {
        let err: GrafanaError = ValidationError::MissingBaseUrl.into();
        assert_eq!(err.to_string(), "GRAFANA_URL must be set");
    }

    #[test]
    fn datasource_required_message_names_setting() {
        assert!(GrafanaError::DatasourceRequired
            .to_string()
            .contains("GRAFANA_DEFAULT_DATASOURCE_UID"));
    }
}
