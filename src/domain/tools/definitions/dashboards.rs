//! Dashboard Tools - inspecting dashboards, panels, and template variables.

use serde::{Deserialize, Serialize};

use super::{lenient_number, DEFAULT_LIMIT};
use crate::domain::tools::ToolDefinition;

// ═══════════════════════════════════════════════════════════════════════════
// Tool Parameters
// ═══════════════════════════════════════════════════════════════════════════

/// Parameters for tools addressing one dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardUidParams {
    /// UID of the dashboard
    pub dashboard_uid: String,
}

/// Parameters for fetching a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDashboardParams {
    /// UID of the dashboard
    pub dashboard_uid: String,
    /// Include the flattened panel list
    #[serde(default)]
    pub include_panels: Option<bool>,
}

impl GetDashboardParams {
    pub fn include_panels(&self) -> bool {
        self.include_panels.unwrap_or(true)
    }
}

/// Parameters for fetching one panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetPanelParams {
    /// UID of the dashboard
    pub dashboard_uid: String,
    /// Panel id
    #[serde(default, deserialize_with = "lenient_number")]
    pub panel_id: Option<i64>,
}

/// Parameters for listing dashboards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDashboardsParams {
    pub query: Option<String>,
    pub tag: Option<String>,
    /// Comma-separated folder ids
    pub folder_ids: Option<String>,
    /// Comma-separated dashboard ids
    pub dashboard_ids: Option<String>,
    #[serde(default)]
    pub starred: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub limit: Option<u32>,
}

impl ListDashboardsParams {
    pub fn starred(&self) -> bool {
        self.starred.unwrap_or(false)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Parameters for paginated dashboard search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPaginatedParams {
    pub query: Option<String>,
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub limit: Option<u32>,
}

impl SearchPaginatedParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Split a comma-separated list, dropping blanks.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool Definitions
// ═══════════════════════════════════════════════════════════════════════════

/// Creates the get_dashboard tool definition.
pub fn get_dashboard_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_dashboard",
        "Get complete dashboard information including metadata, panels, and configuration. Use this to inspect a specific dashboard by its UID.",
        serde_json::json!({
            "type": "object",
            "required": ["dashboard_uid"],
            "properties": {
                "dashboard_uid": {
                    "type": "string",
                    "description": "The UID of the dashboard (found in the dashboard URL)"
                },
                "include_panels": {
                    "type": "boolean",
                    "description": "Include detailed panel information (default: true)",
                    "default": true
                }
            }
        }),
    )
}

/// Creates the get_panel tool definition.
pub fn get_panel_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_panel",
        "Get detailed information about a specific panel including queries, visualization settings, and field configurations.",
        serde_json::json!({
            "type": "object",
            "required": ["dashboard_uid", "panel_id"],
            "properties": {
                "dashboard_uid": {
                    "type": "string",
                    "description": "The UID of the dashboard"
                },
                "panel_id": {
                    "type": "number",
                    "description": "The ID of the panel (visible in panel edit mode)"
                }
            }
        }),
    )
}

/// Creates the list_dashboards tool definition.
pub fn list_dashboards_tool() -> ToolDefinition {
    ToolDefinition::new(
        "list_dashboards",
        "List all accessible dashboards with optional filtering by query, tag, or folder. Use this to discover available dashboards.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to filter dashboards by title"
                },
                "tag": {
                    "type": "string",
                    "description": "Filter dashboards by tag"
                },
                "folder_ids": {
                    "type": "string",
                    "description": "Comma-separated folder IDs to filter by"
                },
                "dashboard_ids": {
                    "type": "string",
                    "description": "Comma-separated dashboard IDs to filter by"
                },
                "starred": {
                    "type": "boolean",
                    "description": "Show only starred dashboards",
                    "default": false
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results (default: 100)",
                    "default": DEFAULT_LIMIT
                }
            }
        }),
    )
}

/// Creates the search_dashboards_paginated tool definition.
pub fn search_dashboards_paginated_tool() -> ToolDefinition {
    ToolDefinition::new(
        "search_dashboards_paginated",
        "Search dashboards one page at a time. The reported total counts the dashboards on the returned page only.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to filter dashboards by title"
                },
                "tag": {
                    "type": "string",
                    "description": "Filter dashboards by tag"
                },
                "page": {
                    "type": "number",
                    "description": "Page number, starting at 1 (default: 1)",
                    "default": 1
                },
                "limit": {
                    "type": "number",
                    "description": "Results per page (default: 100)",
                    "default": DEFAULT_LIMIT
                }
            }
        }),
    )
}

/// Creates the get_dashboard_variables tool definition.
pub fn get_dashboard_variables_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_dashboard_variables",
        "Get all template variables configured for a dashboard. Variables are used for dynamic filtering and parameterization.",
        serde_json::json!({
            "type": "object",
            "required": ["dashboard_uid"],
            "properties": {
                "dashboard_uid": {
                    "type": "string",
                    "description": "The UID of the dashboard"
                }
            }
        }),
    )
}

/// Creates the get_home_dashboard tool definition.
pub fn get_home_dashboard_tool() -> ToolDefinition {
    ToolDefinition::no_arguments(
        "get_home_dashboard",
        "Get the home dashboard configured for the current user or organization.",
    )
}

/// Creates the get_panel_queries tool definition.
pub fn get_panel_queries_tool() -> ToolDefinition {
    ToolDefinition::new(
        "get_panel_queries",
        "Extract the queries (PromQL expressions, query strings, raw SQL) of every panel in a dashboard, including panels nested in rows.",
        serde_json::json!({
            "type": "object",
            "required": ["dashboard_uid"],
            "properties": {
                "dashboard_uid": {
                    "type": "string",
                    "description": "The UID of the dashboard"
                }
            }
        }),
    )
}
