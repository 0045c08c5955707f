//! ToolDispatcher - routes tool calls to their handlers.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use super::handlers::{
    parse_args, CatalogToolsHandler, DashboardToolsHandler, PrometheusToolsHandler,
};
use crate::domain::tools::{ToolCall, ToolDefinition, ToolOutput, ToolRegistry};
use crate::ports::{GrafanaApi, ToolExecutionError, ToolExecutor};

/// [`ToolExecutor`] backed by a [`GrafanaApi`].
pub struct ToolDispatcher {
    registry: ToolRegistry,
    dashboards: DashboardToolsHandler,
    catalog: CatalogToolsHandler,
    prometheus: PrometheusToolsHandler,
}

impl ToolDispatcher {
    pub fn new(api: Arc<dyn GrafanaApi>) -> Self {
        Self {
            registry: ToolRegistry::with_grafana_tools(),
            dashboards: DashboardToolsHandler::new(Arc::clone(&api)),
            catalog: CatalogToolsHandler::new(Arc::clone(&api)),
            prometheus: PrometheusToolsHandler::new(api),
        }
    }
}

#[async_trait]
impl ToolExecutor for ToolDispatcher {
    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolExecutionError> {
        let name = call.name();
        let args = call.arguments();
        let started = Instant::now();
        info!(tool = %name, "Executing tool");

        let payload = match name {
            "get_dashboard" => self.dashboards.get_dashboard(parse_args(args)?).await?,
            "get_panel" => self.dashboards.get_panel(parse_args(args)?).await?,
            "list_dashboards" => self.dashboards.list_dashboards(parse_args(args)?).await?,
            "search_dashboards_paginated" => {
                self.dashboards
                    .search_dashboards_paginated(parse_args(args)?)
                    .await?
            }
            "get_dashboard_variables" => {
                self.dashboards
                    .get_dashboard_variables(parse_args(args)?)
                    .await?
            }
            "get_home_dashboard" => self.dashboards.get_home_dashboard().await?,
            "get_panel_queries" => self.dashboards.get_panel_queries(parse_args(args)?).await?,

            "list_folders" => self.catalog.list_folders(parse_args(args)?).await?,
            "get_folder" => self.catalog.get_folder(parse_args(args)?).await?,
            "search_by_tag" => self.catalog.search_by_tag(parse_args(args)?).await?,
            "get_dashboard_tags" => self.catalog.get_dashboard_tags().await?,
            "get_datasources" => self.catalog.get_datasources().await?,
            "get_datasource" => self.catalog.get_datasource(parse_args(args)?).await?,
            "health_check" => self.catalog.health_check().await?,
            "get_org_info" => self.catalog.get_org_info().await?,

            "prometheus_query" => self.prometheus.query(parse_args(args)?).await?,
            "prometheus_query_range" => self.prometheus.query_range(parse_args(args)?).await?,
            "list_metrics" => self.prometheus.list_metrics(parse_args(args)?).await?,
            "get_label_values" => self.prometheus.label_values(parse_args(args)?).await?,
            "get_series" => self.prometheus.series(parse_args(args)?).await?,
            "get_service_status" => self.prometheus.service_status(parse_args(args)?).await?,

            other => return Err(ToolExecutionError::ToolNotFound(other.to_string())),
        };

        debug!(
            tool = %name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool completed"
        );
        Ok(ToolOutput::success(&payload))
    }

    fn available_tools(&self) -> Vec<ToolDefinition> {
        self.registry.all_tools().to_vec()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.registry.has_tool(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::grafana::MockGrafanaApi;
    use serde_json::json;

    fn dispatcher(api: MockGrafanaApi) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(api))
    }

    #[test]
    fn every_catalog_tool_is_available() {
        let dispatcher = dispatcher(MockGrafanaApi::new());

        assert_eq!(dispatcher.available_tools().len(), 21);
        assert!(dispatcher.has_tool("get_service_status"));
        assert!(!dispatcher.has_tool("delete_dashboard"));
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let dispatcher = dispatcher(MockGrafanaApi::new());
        let call = ToolCall::new("delete_dashboard", json!({}));

        assert!(matches!(
            dispatcher.execute(&call).await,
            Err(ToolExecutionError::ToolNotFound(name)) if name == "delete_dashboard"
        ));
    }

    #[tokio::test]
    async fn no_argument_tools_ignore_arguments() {
        let api = MockGrafanaApi::new().with_response("get_org_info", json!({ "id": 1, "name": "Main" }));
        let dispatcher = dispatcher(api);
        let call = ToolCall::new("get_org_info", json!({ "unused": true }));

        let output = dispatcher.execute(&call).await.unwrap();

        assert!(!output.is_error());
        assert_eq!(output.json().unwrap(), json!({ "id": 1, "name": "Main" }));
    }

    #[tokio::test]
    async fn invalid_arguments_are_rejected() {
        let dispatcher = dispatcher(MockGrafanaApi::new());
        let call = ToolCall::new("get_dashboard", json!({ "include_panels": true }));

        assert!(matches!(
            dispatcher.execute(&call).await,
            Err(ToolExecutionError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn dispatch_wraps_grafana_failures() {
        let dispatcher = dispatcher(MockGrafanaApi::new());
        let call = ToolCall::new("get_dashboard", json!({ "dashboard_uid": "missing" }));

        let output = dispatcher.dispatch(&call).await.unwrap();

        assert!(output.is_error());
        let body = output.json().unwrap();
        assert_eq!(body["tool"], "get_dashboard");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Grafana API request failed: HTTP status 404"));
    }
}
