//! Tool definition - schema and metadata for a tool.
//!
//! Defines the interface for a tool that an MCP client can invoke.

use serde::{Deserialize, Serialize};

/// Definition of a tool advertised to MCP clients.
///
/// Carries the name, description and JSON Schema that `tools/list`
/// advertises for the tool.
///
/// # Examples
///
/// ```
/// use grafana_observer::domain::tools::ToolDefinition;
///
/// let definition = ToolDefinition::new(
///     "get_folder",
///     "Get a folder by UID",
///     serde_json::json!({
///         "type": "object",
///         "required": ["uid"],
///         "properties": {
///             "uid": { "type": "string", "description": "Folder UID" }
///         }
///     }),
/// );
/// assert_eq!(definition.name(), "get_folder");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "get_dashboard")
    name: String,

    /// Human-readable description
    description: String,

    /// JSON Schema for the arguments
    parameters_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
        }
    }

    /// Creates a tool definition that takes no arguments.
    pub fn no_arguments(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            serde_json::json!({ "type": "object", "properties": {} }),
        )
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters schema.
    pub fn parameters_schema(&self) -> &serde_json::Value {
        &self.parameters_schema
    }
}
