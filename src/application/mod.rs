//! Application layer - tool handlers and the dispatcher that routes calls to them.
//!
//! Handlers depend only on the [`GrafanaApi`](crate::ports::GrafanaApi) port;
//! the dispatcher implements [`ToolExecutor`](crate::ports::ToolExecutor) for
//! the protocol layer.

pub mod handlers;
mod tool_dispatcher;

pub use tool_dispatcher::ToolDispatcher;
