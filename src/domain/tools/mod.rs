//! Tools - the catalog of operations exposed to MCP clients.
//!
//! ## Key Types
//!
//! - [`ToolDefinition`] - Schema and metadata for a tool
//! - [`ToolCall`] - Request to invoke a tool
//! - [`ToolOutput`] - Text payload returned from a tool, possibly error-flagged
//! - [`ToolRegistry`] - Ordered catalog used for listing and lookup
//!
//! Argument types and schemas live in [`definitions`].

pub mod definitions;
mod tool_call;
mod tool_definition;
mod tool_registry;

pub use tool_call::{ToolCall, ToolOutput};
pub use tool_definition::ToolDefinition;
pub use tool_registry::ToolRegistry;
