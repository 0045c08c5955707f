//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `grafana` - HTTP client for the Grafana REST API, plus a test double
//! - `mcp` - MCP server handler for stdio clients

pub mod grafana;
pub mod mcp;

pub use grafana::{GrafanaHttpClient, MockGrafanaApi};
pub use mcp::GrafanaMcpServer;
