//! MCP adapter - the Model Context Protocol surface.
//!
//! [`GrafanaMcpServer`] implements the `rmcp` server handler over any
//! `ToolExecutor`; `main` serves it on stdio.

mod server;

pub use server::{GrafanaMcpServer, MCP_SERVER_NAME};
