//! Catalog Tools - folders, tags, datasources, and instance information.

use serde::{Deserialize, Serialize};

use super::dashboards::split_list;
use super::{lenient_number, DEFAULT_LIMIT};
use crate::domain::tools::ToolDefinition;

// ═══════════════════════════════════════════════════════════════════════════
// Tool Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Parameters for tools addressing a record by UID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UidParams {
    pub uid: String,
}

/// Parameters for listing folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFoldersParams {
    #[serde(default, deserialize_with = "lenient_number")]
    pub limit: Option<u32>,
}

impl ListFoldersParams {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Parameters for searching by tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchByTagParams {
    /// Comma-separated tags
    pub tags: String,
}

impl SearchByTagParams {
    /// The individual tags, trimmed, in the order given.
    pub fn tag_list(&self) -> Vec<String> {
        split_list(Some(&self.tags))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions
// ═══════════════════════════════════════════════════════════════════════════

/// Creates the list_folders tool definition.
pub fn list_folders_tool() -> ToolDefinition {
    ToolDefinition::new(
        "list_folders",
        "List all dashboard folders to understand dashboard organization.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "number",
                    "description": "Maximum number of folders to return (default: 100)",
                    "default": DEFAULT_LIMIT
                }
            }
        }),
    )
}

/// Creates the get_folder tool definition.
pub fn get_folder_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_folder",
        "Get a dashboard folder by UID.",
        serde_json::json!({
            "type": "object",
            "required": ["uid"],
            "properties": {
                "uid": {
                    "type": "string",
                    "description": "The UID of the folder"
                }
            }
        }),
    )
}

/// Creates the search_by_tag tool definition.
pub fn search_by_tag_tool() -> ToolDefinition {
    ToolDefinition::new(
        "search_by_tag",
        "Search for dashboards by one or more tags.",
        serde_json::json!({
            "type": "object",
            "required": ["tags"],
            "properties": {
                "tags": {
                    "type": "string",
                    "description": "Comma-separated list of tags to search for"
                }
            }
        }),
    )
}

/// Creates the get_dashboard_tags tool definition.
pub fn get_dashboard_tags_tool() -> ToolDefinition {
    ToolDefinition::no_arguments(
        "get_dashboard_tags",
        "Get all available dashboard tags with usage counts.",
    )
}

/// Creates the get_datasources tool definition.
pub fn get_datasources_tool() -> ToolDefinition {
    ToolDefinition::no_arguments(
        "get_datasources",
        "List all configured data sources in Grafana.",
    )
}

/// Creates the get_datasource tool definition.
pub fn get_datasource_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_datasource",
        "Get detailed information about a specific data source by UID.",
        serde_json::json!({
            "type": "object",
            "required": ["uid"],
            "properties": {
                "uid": {
                    "type": "string",
                    "description": "The UID of the data source"
                }
            }
        }),
    )
}

/// Creates the health_check tool definition.
pub fn health_check_tool() -> ToolDefinition {
    ToolDefinition::no_arguments(
        "health_check",
        "Check Grafana instance health: version, database status, and commit.",
    )
}

/// Creates the get_org_info tool definition.
pub fn get_org_info_tool() -> ToolDefinition {
    ToolDefinition::no_arguments(
        "get_org_info",
        "Get the current Grafana organization.",
    )
}
