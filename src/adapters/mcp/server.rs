//! MCP server handler backed by a [`ToolExecutor`].
//!
//! The handler is written against `rmcp::ServerHandler` directly rather than
//! through the tool macros: the catalog is data, built once in the domain
//! layer, and every call funnels through [`ToolExecutor::dispatch`].

use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use serde_json::Value;

use crate::domain::tools::{ToolCall, ToolDefinition, ToolOutput};
use crate::ports::{ToolExecutionError, ToolExecutor};

/// Name reported in the initialize handshake.
pub const MCP_SERVER_NAME: &str = "grafana-observer";

/// MCP server exposing the Grafana tool catalog.
#[derive(Clone)]
pub struct GrafanaMcpServer {
    executor: Arc<dyn ToolExecutor>,
}

impl GrafanaMcpServer {
    /// Creates a server that routes tool calls to `executor`.
    pub fn new(executor: Arc<dyn ToolExecutor>) -> Self {
        Self { executor }
    }
}

impl std::fmt::Debug for GrafanaMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrafanaMcpServer")
            .field("tools", &self.executor.available_tools().len())
            .finish()
    }
}

fn to_tool(definition: &ToolDefinition) -> Tool {
    let schema: JsonObject = match definition.parameters_schema() {
        Value::Object(map) => map.clone(),
        _ => JsonObject::new(),
    };
    Tool::new(
        definition.name().to_string(),
        definition.description().to_string(),
        Arc::new(schema),
    )
}

fn to_call_result(output: ToolOutput) -> CallToolResult {
    let content = vec![Content::text(output.text().to_string())];
    if output.is_error() {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

fn to_mcp_error(err: ToolExecutionError) -> McpError {
    match err {
        ToolExecutionError::MissingArguments(_) => McpError::invalid_params(err.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

impl ServerHandler for GrafanaMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: MCP_SERVER_NAME.to_string(),
                title: Some("Grafana Observer".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Read-only access to Grafana dashboards, folders, datasources \
                     and Prometheus metrics"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only Grafana inspection. Start with list_dashboards or \
                 search_dashboards_paginated, then get_dashboard or get_panel for detail. \
                 Prometheus tools use the default Prometheus datasource unless \
                 datasource_uid is given."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.executor.available_tools().iter().map(to_tool).collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        let call = ToolCall::new(request.name.as_ref(), arguments);

        self.executor
            .dispatch(&call)
            .await
            .map(to_call_result)
            .map_err(to_mcp_error)
    }
}
