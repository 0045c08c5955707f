//! Grafana HTTP Client - reqwest implementation of the GrafanaApi port.
//!
//! # Configuration
//!
//! ```no_run
//! use grafana_observer::adapters::grafana::GrafanaHttpClient;
//! use grafana_observer::config::{ConnectionSettings, GrafanaConfig};
//!
//! let config = GrafanaConfig::resolve(ConnectionSettings::default())?;
//! let client = GrafanaHttpClient::new(config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Authentication
//!
//! Token auth is sent as a default `Authorization: Bearer` header on the
//! session. Basic auth is attached per request, together with the
//! `X-Grafana-Org-Id` header selecting the configured organization.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::GrafanaConfig;
use crate::domain::grafana::{
    DashboardDocument, DataSource, Folder, HealthStatus, Labels, OrgInfo, PrometheusResponse,
    QueryResult, SearchHit, TagCount,
};
use crate::ports::{GrafanaApi, GrafanaError, SearchPage, SearchQuery, TimeRange};

/// Header selecting the organization for basic-auth sessions.
const ORG_ID_HEADER: &str = "X-Grafana-Org-Id";

/// Grafana REST API client.
///
/// Holds one reusable HTTP session; cloning shares it.
#[derive(Debug, Clone)]
pub struct GrafanaHttpClient {
    config: GrafanaConfig,
    client: Client,
}

impl GrafanaHttpClient {
    /// Creates a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `GrafanaError::Configuration` if the base URL cannot be parsed
    /// or the HTTP session cannot be built.
    pub fn new(config: GrafanaConfig) -> Result<Self, GrafanaError> {
        Url::parse(&config.base_url).map_err(|e| {
            GrafanaError::Configuration(format!("Invalid GRAFANA_URL {:?}: {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .default_headers(Self::default_headers(&config)?)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| GrafanaError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        if !config.verify_ssl {
            tracing::warn!("TLS certificate verification is disabled for Grafana requests");
        }

        Ok(Self { config, client })
    }

    fn default_headers(config: &GrafanaConfig) -> Result<HeaderMap, GrafanaError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = config.auth.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                GrafanaError::Configuration("GRAFANA_TOKEN contains invalid characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Builds an endpoint URL under the base URL, encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GrafanaError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GrafanaError::Configuration(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                GrafanaError::Configuration(format!(
                    "GRAFANA_URL cannot be a base: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Pick the explicit datasource, falling back to the configured default.
    fn resolve_datasource<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str, GrafanaError> {
        explicit
            .filter(|uid| !uid.is_empty())
            .or(self.config.default_datasource_uid.as_deref())
            .ok_or(GrafanaError::DatasourceRequired)
    }

    fn proxy_segments<'a>(datasource_uid: &'a str, api_path: &[&'a str]) -> Vec<&'a str> {
        let mut segments = vec!["api", "datasources", "proxy", "uid", datasource_uid, "api", "v1"];
        segments.extend_from_slice(api_path);
        segments
    }

    /// Perform one GET request and decode the body.
    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, GrafanaError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(path = %url.path(), "Grafana request");

        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some((email, password)) = self.config.auth.basic_credentials() {
            request = request
                .basic_auth(email, Some(password))
                .header(ORG_ID_HEADER, &self.config.org_id);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Grafana request failed");
            GrafanaError::request(e.status().map(|s| s.as_u16()), e.to_string(), None)
        })?;
        let response = Self::handle_response_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GrafanaError::request(None, e.to_string(), None))?;
        serde_json::from_slice(&bytes).map_err(|e| GrafanaError::Decode(e.to_string()))
    }

    /// Maps non-2xx responses to errors carrying the server's error body.
    async fn handle_response_status(response: Response) -> Result<Response, GrafanaError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Grafana returned an error status");

        Err(GrafanaError::request(
            Some(status.as_u16()),
            format!("HTTP status {}", status),
            Some(compact_body(&error_body)),
        ))
    }
}

/// JSON bodies are re-serialized compactly; anything else is kept as text.
fn compact_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| body.trim().to_string())
}

/// `{status, data}` envelope of the label and series endpoints.
#[derive(Debug, Deserialize)]
struct PrometheusData<T> {
    data: T,
}

#[async_trait]
impl GrafanaApi for GrafanaHttpClient {
    async fn get_dashboard(&self, uid: &str) -> Result<DashboardDocument, GrafanaError> {
        self.get(&["api", "dashboards", "uid", uid], &[]).await
    }

    async fn search_dashboards(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, GrafanaError> {
        self.get(&["api", "search"], &query.to_params()).await
    }

    async fn search_with_pagination(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<SearchPage, GrafanaError> {
        let mut params = query.to_params();
        params.push(("page", page.to_string()));

        let hits: Vec<SearchHit> = self.get(&["api", "search"], &params).await?;
        Ok(SearchPage::new(hits, page, query.limit))
    }

    async fn list_folders(&self, limit: u32) -> Result<Vec<Folder>, GrafanaError> {
        let params = [("type", "dash-folder".to_string()), ("limit", limit.to_string())];
        self.get(&["api", "search"], &params).await
    }

    async fn get_folder(&self, uid: &str) -> Result<Folder, GrafanaError> {
        self.get(&["api", "folders", uid], &[]).await
    }

    async fn get_dashboard_tags(&self) -> Result<Vec<TagCount>, GrafanaError> {
        self.get(&["api", "dashboards", "tags"], &[]).await
    }

    async fn get_datasources(&self) -> Result<Vec<DataSource>, GrafanaError> {
        self.get(&["api", "datasources"], &[]).await
    }

    async fn get_datasource(&self, uid: &str) -> Result<DataSource, GrafanaError> {
        self.get(&["api", "datasources", "uid", uid], &[]).await
    }

    async fn get_home_dashboard(&self) -> Result<DashboardDocument, GrafanaError> {
        self.get(&["api", "dashboards", "home"], &[]).await
    }

    async fn health_check(&self) -> Result<HealthStatus, GrafanaError> {
        self.get(&["api", "health"], &[]).await
    }

    async fn get_org_info(&self) -> Result<OrgInfo, GrafanaError> {
        self.get(&["api", "org"], &[]).await
    }

    async fn prometheus_query(
        &self,
        query: &str,
        datasource_uid: Option<&str>,
        time: Option<f64>,
    ) -> Result<PrometheusResponse<QueryResult>, GrafanaError> {
        let uid = self.resolve_datasource(datasource_uid)?;
        let mut params = vec![("query", query.to_string())];
        if let Some(time) = time {
            params.push(("time", time.to_string()));
        }

        self.get(&Self::proxy_segments(uid, &["query"]), &params).await
    }

    async fn prometheus_query_range(
        &self,
        query: &str,
        range: TimeRange,
        datasource_uid: Option<&str>,
    ) -> Result<PrometheusResponse<QueryResult>, GrafanaError> {
        let uid = self.resolve_datasource(datasource_uid)?;
        let params = [
            ("query", query.to_string()),
            ("start", range.start.to_string()),
            ("end", range.end.to_string()),
            ("step", range.step.to_string()),
        ];

        self.get(&Self::proxy_segments(uid, &["query_range"]), &params).await
    }

    async fn get_metric_names(
        &self,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<String>, GrafanaError> {
        self.get_label_values("__name__", datasource_uid).await
    }

    async fn get_label_values(
        &self,
        label: &str,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<String>, GrafanaError> {
        let uid = self.resolve_datasource(datasource_uid)?;
        let response: PrometheusData<Vec<String>> = self
            .get(&Self::proxy_segments(uid, &["label", label, "values"]), &[])
            .await?;
        Ok(response.data)
    }

    async fn get_series(
        &self,
        selector: &str,
        start: Option<f64>,
        end: Option<f64>,
        datasource_uid: Option<&str>,
    ) -> Result<Vec<Labels>, GrafanaError> {
        let uid = self.resolve_datasource(datasource_uid)?;
        let mut params = vec![("match[]", selector.to_string())];
        if let Some(start) = start {
            params.push(("start", start.to_string()));
        }
        if let Some(end) = end {
            params.push(("end", end.to_string()));
        }

        let response: PrometheusData<Vec<Labels>> = self
            .get(&Self::proxy_segments(uid, &["series"]), &params)
            .await?;
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionSettings, ValidationError};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config_for(url: &str) -> GrafanaConfig {
        GrafanaConfig::from_settings(ConnectionSettings {
            url: Some(url.to_string()),
            token: Some("glsa_test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn client_for(url: &str) -> GrafanaHttpClient {
        GrafanaHttpClient::new(config_for(url)).unwrap()
    }

    /// Serve one canned HTTP response; the handle yields the raw request head.
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buffer = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                received.extend_from_slice(&buffer[..read]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).to_string()
        });

        (format!("http://{}", address), handle)
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let client = client_for("https://grafana.example.com");
        let url = client.endpoint(&["api", "dashboards", "uid", "a b"]).unwrap();

        assert_eq!(url.as_str(), "https://grafana.example.com/api/dashboards/uid/a%20b");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = client_for("https://example.com/grafana/");
        let url = client.endpoint(&["api", "health"]).unwrap();

        assert_eq!(url.as_str(), "https://example.com/grafana/api/health");
    }

    #[test]
    fn invalid_base_url_is_a_configuration_error() {
        let result = GrafanaHttpClient::new(config_for("not a url"));
        assert!(matches!(result, Err(GrafanaError::Configuration(_))));
    }

    #[test]
    fn proxy_segments_target_prometheus_api() {
        let segments = GrafanaHttpClient::proxy_segments("prom", &["label", "job", "values"]);
        assert_eq!(
            segments.join("/"),
            "api/datasources/proxy/uid/prom/api/v1/label/job/values"
        );
    }

    #[test]
    fn explicit_datasource_wins_over_default() {
        let mut config = config_for("https://grafana.example.com");
        config.default_datasource_uid = Some("default-prom".to_string());
        let client = GrafanaHttpClient::new(config).unwrap();

        assert_eq!(client.resolve_datasource(Some("other")).unwrap(), "other");
        assert_eq!(client.resolve_datasource(None).unwrap(), "default-prom");
        assert_eq!(client.resolve_datasource(Some("")).unwrap(), "default-prom");
    }

    #[tokio::test]
    async fn prometheus_queries_require_a_datasource() {
        let client = client_for("https://grafana.example.com");

        let instant = client.prometheus_query("up", None, None).await;
        assert!(matches!(instant, Err(GrafanaError::DatasourceRequired)));

        let range = TimeRange {
            start: 0.0,
            end: 60.0,
            step: 15.0,
        };
        let ranged = client.prometheus_query_range("up", range, None).await;
        assert!(matches!(ranged, Err(GrafanaError::DatasourceRequired)));

        let metrics = client.get_metric_names(None).await;
        assert!(matches!(metrics, Err(GrafanaError::DatasourceRequired)));
    }

    #[tokio::test]
    async fn successful_response_is_decoded_with_bearer_auth() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"version":"10.4.0","database":"ok","commit":"abc"}"#).await;
        let client = client_for(&base_url);

        let health = client.health_check().await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(health.version.as_deref(), Some("10.4.0"));
        assert!(request.starts_with("GET /api/health "));
        assert!(request.to_lowercase().contains("authorization: bearer glsa_test"));
    }

    #[tokio::test]
    async fn error_status_embeds_json_body() {
        let (base_url, server) = serve_once("404 Not Found", r#"{ "message": "Dashboard not found" }"#).await;
        let client = client_for(&base_url);

        let err = client.get_dashboard("missing").await.unwrap_err();
        server.await.unwrap();

        assert_eq!(err.status(), Some(404));
        let message = err.to_string();
        assert!(message.starts_with("Grafana API request failed: HTTP status 404 Not Found"));
        assert!(message.ends_with(r#" - {"message":"Dashboard not found"}"#));
    }

    #[tokio::test]
    async fn basic_auth_sends_org_header() {
        let (base_url, server) = serve_once("200 OK", r#"{"id":3,"name":"Ops"}"#).await;
        let config = GrafanaConfig::from_settings(ConnectionSettings {
            url: Some(base_url),
            email: Some("admin@example.com".to_string()),
            password: Some("secret".to_string()),
            org_id: Some("3".to_string()),
            ..Default::default()
        })
        .unwrap();
        let client = GrafanaHttpClient::new(config).unwrap();

        let org = client.get_org_info().await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert_eq!(org.name.as_deref(), Some("Ops"));
        assert!(request.contains("authorization: basic "));
        assert!(request.contains("x-grafana-org-id: 3"));
    }

    #[tokio::test]
    async fn search_sends_dashboard_filters() {
        let (base_url, server) = serve_once("200 OK", r#"[{"uid":"a","title":"A"}]"#).await;
        let client = client_for(&base_url);

        let page = client
            .search_with_pagination(&SearchQuery::by_tag("prod"), 2)
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(page.total, 1);
        assert!(request.contains("type=dash-db"));
        assert!(request.contains("tag=prod"));
        assert!(request.contains("page=2"));
    }

    #[test]
    fn missing_url_never_reaches_client() {
        let result = GrafanaConfig::from_settings(ConnectionSettings::default());
        assert_eq!(result.unwrap_err(), ValidationError::MissingBaseUrl);
    }

    #[test]
    fn compact_body_handles_text() {
        assert_eq!(compact_body("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(compact_body(r#"{ "a" : 1 }"#), r#"{"a":1}"#);
    }
}
