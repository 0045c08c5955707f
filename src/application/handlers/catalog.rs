//! CatalogToolsHandler - folders, tags, datasources, and instance information.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::require;
use crate::domain::grafana::dedupe_by_uid;
use crate::domain::tools::definitions::{ListFoldersParams, SearchByTagParams, UidParams};
use crate::ports::{GrafanaApi, SearchQuery, ToolExecutionError};

/// Handler for the catalog tools.
pub struct CatalogToolsHandler {
    api: Arc<dyn GrafanaApi>,
}

impl CatalogToolsHandler {
    pub fn new(api: Arc<dyn GrafanaApi>) -> Self {
        Self { api }
    }

    pub async fn list_folders(&self, params: ListFoldersParams) -> Result<Value, ToolExecutionError> {
        let folders = self.api.list_folders(params.limit()).await?;
        Ok(json!({
            "total": folders.len(),
            "folders": folders,
        }))
    }

    pub async fn get_folder(&self, params: UidParams) -> Result<Value, ToolExecutionError> {
        let uid = require("uid", &params.uid)?;
        let folder = self.api.get_folder(uid).await?;
        Ok(json!(folder))
    }

    /// Search each tag in turn and merge the hits, first occurrence of a UID
    /// winning.
    pub async fn search_by_tag(&self, params: SearchByTagParams) -> Result<Value, ToolExecutionError> {
        let tags = params.tag_list();
        if tags.is_empty() {
            return Err(ToolExecutionError::invalid("Missing required argument: tags"));
        }

        let mut hits = Vec::new();
        for tag in &tags {
            let found = self.api.search_dashboards(&SearchQuery::by_tag(tag.as_str())).await?;
            debug!(tag = %tag, hits = found.len(), "Tag search");
            hits.extend(found);
        }

        let dashboards: Vec<Value> = dedupe_by_uid(hits)
            .iter()
            .map(|hit| hit.tag_summary())
            .collect();

        Ok(json!({
            "search_tags": tags,
            "total": dashboards.len(),
            "dashboards": dashboards,
        }))
    }

    pub async fn get_dashboard_tags(&self) -> Result<Value, ToolExecutionError> {
        let tags = self.api.get_dashboard_tags().await?;
        Ok(json!({
            "total": tags.len(),
            "tags": tags,
        }))
    }

    pub async fn get_datasources(&self) -> Result<Value, ToolExecutionError> {
        let datasources: Vec<Value> = self
            .api
            .get_datasources()
            .await?
            .iter()
            .map(|datasource| datasource.summary())
            .collect();

        Ok(json!({
            "total": datasources.len(),
            "datasources": datasources,
        }))
    }

    pub async fn get_datasource(&self, params: UidParams) -> Result<Value, ToolExecutionError> {
        let uid = require("uid", &params.uid)?;
        let datasource = self.api.get_datasource(uid).await?;
        Ok(datasource.safe_detail())
    }

    pub async fn health_check(&self) -> Result<Value, ToolExecutionError> {
        let health = self.api.health_check().await?;
        Ok(json!({
            "version": health.version,
            "database": health.database,
            "commit": health.commit,
        }))
    }

    pub async fn get_org_info(&self) -> Result<Value, ToolExecutionError> {
        let org = self.api.get_org_info().await?;
        Ok(json!({
            "id": org.id,
            "name": org.name,
        }))
    }
}
