//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `GrafanaApi` - Read-only access to a Grafana instance
//! - `ToolExecutor` - Execution of catalog tools on behalf of MCP clients

mod grafana_api;
mod tool_executor;

pub use grafana_api::{GrafanaApi, GrafanaError, SearchPage, SearchQuery, TimeRange, DEFAULT_SEARCH_LIMIT};
pub use tool_executor::{ToolExecutionError, ToolExecutor};
