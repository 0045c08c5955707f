//! DashboardToolsHandler - dashboards, panels, variables, and panel queries.

use std::sync::Arc;

use serde_json::{json, Value};

use super::require;
use crate::domain::grafana::DashboardDocument;
use crate::domain::tools::definitions::{
    split_list, DashboardUidParams, GetDashboardParams, GetPanelParams, ListDashboardsParams,
    SearchPaginatedParams,
};
use crate::ports::{GrafanaApi, SearchQuery, ToolExecutionError};

/// Handler for the dashboard tools.
pub struct DashboardToolsHandler {
    api: Arc<dyn GrafanaApi>,
}

impl DashboardToolsHandler {
    pub fn new(api: Arc<dyn GrafanaApi>) -> Self {
        Self { api }
    }

    pub async fn get_dashboard(&self, params: GetDashboardParams) -> Result<Value, ToolExecutionError> {
        let uid = require("dashboard_uid", &params.dashboard_uid)?;
        let document = self.api.get_dashboard(uid).await?;
        Ok(dashboard_summary(&document, params.include_panels()))
    }

    /// Panel details, or an informational `{error}` payload when the panel
    /// does not exist.
    pub async fn get_panel(&self, params: GetPanelParams) -> Result<Value, ToolExecutionError> {
        let uid = require("dashboard_uid", &params.dashboard_uid)?;
        let panel_id = params
            .panel_id
            .ok_or_else(|| ToolExecutionError::invalid("Missing required argument: panel_id"))?;

        let document = self.api.get_dashboard(uid).await?;
        let dashboard = &document.dashboard;

        let Some(panel) = dashboard.find_panel(panel_id) else {
            return Ok(json!({
                "error": format!("Panel {} not found in dashboard {}", panel_id, uid)
            }));
        };

        let mut info = panel.info();
        info["dashboard_title"] = json!(dashboard.title);
        info["dashboard_uid"] = json!(uid);
        Ok(info)
    }

    pub async fn list_dashboards(&self, params: ListDashboardsParams) -> Result<Value, ToolExecutionError> {
        let query = SearchQuery {
            query: params.query.clone(),
            tag: params.tag.clone(),
            folder_ids: parse_id_list("folder_ids", params.folder_ids.as_deref())?,
            dashboard_ids: parse_id_list("dashboard_ids", params.dashboard_ids.as_deref())?,
            starred: params.starred(),
            limit: params.limit(),
        };

        let hits = self.api.search_dashboards(&query).await?;
        let dashboards: Vec<Value> = hits.iter().map(|hit| hit.summary()).collect();

        Ok(json!({
            "total": dashboards.len(),
            "dashboards": dashboards,
        }))
    }

    /// One page of search results; `total` counts this page only.
    pub async fn search_dashboards_paginated(
        &self,
        params: SearchPaginatedParams,
    ) -> Result<Value, ToolExecutionError> {
        if params.page() == 0 {
            return Err(ToolExecutionError::invalid("page starts at 1"));
        }

        let query = SearchQuery {
            query: params.query.clone(),
            tag: params.tag.clone(),
            limit: params.limit(),
            ..SearchQuery::default()
        };

        let page = self.api.search_with_pagination(&query, params.page()).await?;
        let dashboards: Vec<Value> = page.dashboards.iter().map(|hit| hit.summary()).collect();

        Ok(json!({
            "page": page.page,
            "limit": page.limit,
            "total": page.total,
            "dashboards": dashboards,
        }))
    }

    pub async fn get_dashboard_variables(
        &self,
        params: DashboardUidParams,
    ) -> Result<Value, ToolExecutionError> {
        let uid = require("dashboard_uid", &params.dashboard_uid)?;
        let document = self.api.get_dashboard(uid).await?;
        let variables: Vec<Value> = document
            .dashboard
            .variables()
            .iter()
            .map(|variable| variable.summary())
            .collect();

        Ok(json!({
            "dashboard_uid": uid,
            "dashboard_title": document.dashboard.title,
            "variables_count": variables.len(),
            "variables": variables,
        }))
    }

    pub async fn get_home_dashboard(&self) -> Result<Value, ToolExecutionError> {
        let document = self.api.get_home_dashboard().await?;
        Ok(dashboard_summary(&document, false))
    }

    pub async fn get_panel_queries(&self, params: DashboardUidParams) -> Result<Value, ToolExecutionError> {
        let uid = require("dashboard_uid", &params.dashboard_uid)?;
        let panels = self.api.get_panel_queries(uid).await?;

        Ok(json!({
            "dashboard_uid": uid,
            "panel_count": panels.len(),
            "panels": panels,
        }))
    }
}

/// Dashboard summary shared by `get_dashboard` and `get_home_dashboard`.
fn dashboard_summary(document: &DashboardDocument, include_panels: bool) -> Value {
    let dashboard = &document.dashboard;
    let mut summary = json!({
        "uid": dashboard.uid,
        "title": dashboard.title,
        "tags": dashboard.tags,
        "timezone": dashboard.timezone,
        "refresh": dashboard.refresh,
        "version": dashboard.version,
        "editable": dashboard.editable,
        "meta": document.meta.summary(),
    });

    if include_panels {
        let panels = dashboard.panel_summaries();
        summary["panel_count"] = json!(panels.len());
        summary["panels"] = Value::Array(panels);
    }

    let variables = dashboard.variables();
    if !variables.is_empty() {
        summary["variables_count"] = json!(variables.len());
    }

    if let Some(time) = dashboard.time_settings() {
        summary["time_settings"] = time.clone();
    }

    summary
}

/// Comma-separated numeric ids, kept as strings for the query string.
fn parse_id_list(name: &str, value: Option<&str>) -> Result<Vec<String>, ToolExecutionError> {
    let ids = split_list(value);
    if let Some(bad) = ids.iter().find(|id| id.parse::<i64>().is_err()) {
        return Err(ToolExecutionError::invalid(format!(
            "{} must be comma-separated integers, got {:?}",
            name, bad
        )));
    }
    Ok(ids)
}
