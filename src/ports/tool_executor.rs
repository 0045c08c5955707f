//! Tool Executor Port - Interface for executing catalog tools.
//!
//! # Design
//!
//! - [`ToolExecutor::execute`] runs one tool and reports every failure as an
//!   error value
//! - [`ToolExecutor::dispatch`] is the boundary used by the protocol layer: it
//!   turns failures into error-flagged [`ToolOutput`]s, so a failing tool
//!   never takes the server down
//! - A call without an argument object is the one hard failure, reported to
//!   the caller instead of as tool output

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::domain::tools::{ToolCall, ToolDefinition, ToolOutput};
use crate::ports::GrafanaError;

/// Port for executing catalog tools.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool and return its output.
    ///
    /// # Returns
    ///
    /// * `Ok(ToolOutput)` - Tool ran; informational results (such as a panel
    ///   that does not exist) are still `Ok`
    /// * `Err(ToolExecutionError)` - Unknown tool, bad arguments, or a Grafana
    ///   failure
    async fn execute(&self, call: &ToolCall) -> Result<ToolOutput, ToolExecutionError>;

    /// Tool definitions in catalog order.
    fn available_tools(&self) -> Vec<ToolDefinition>;

    /// Check if a tool exists.
    fn has_tool(&self, name: &str) -> bool {
        self.available_tools().iter().any(|tool| tool.name() == name)
    }

    /// Execute a tool, converting failures into error-flagged output.
    ///
    /// Unknown tools produce `{error}`; every other failure produces
    /// `{error, tool}`.
    ///
    /// # Errors
    ///
    /// Returns `ToolExecutionError::MissingArguments` when the call carries
    /// no argument object.
    async fn dispatch(&self, call: &ToolCall) -> Result<ToolOutput, ToolExecutionError> {
        if call.arguments().is_null() {
            return Err(ToolExecutionError::MissingArguments(call.name().to_string()));
        }

        match self.execute(call).await {
            Ok(output) => Ok(output),
            Err(err @ ToolExecutionError::ToolNotFound(_)) => {
                tracing::warn!(tool = %call.name(), "Unknown tool requested");
                Ok(ToolOutput::error(&json!({ "error": err.to_string() })))
            }
            Err(err) => {
                tracing::warn!(tool = %call.name(), error = %err, "Tool execution failed");
                Ok(ToolOutput::error(&json!({
                    "error": err.to_string(),
                    "tool": call.name(),
                })))
            }
        }
    }
}

/// Errors that can occur during tool execution.
#[derive(Debug, Clone, Error)]
pub enum ToolExecutionError {
    /// Tool not found
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// The call had no argument object
    #[error("Missing arguments for tool: {0}")]
    MissingArguments(String),

    /// Arguments failed extraction
    #[error("Invalid arguments: {0}")]
    InvalidArgument(String),

    /// Grafana request failed
    #[error(transparent)]
    Grafana(#[from] GrafanaError),
}

impl ToolExecutionError {
    /// Creates an invalid-argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
