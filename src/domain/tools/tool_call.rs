//! Tool call and output types.
//!
//! These are the request/response value objects for tool execution.

use serde::{Deserialize, Serialize};

/// A request to invoke a tool.
///
/// Arguments are passed as JSON to support the varying schemas of
/// different tools.
///
/// # Examples
///
/// ```
/// use grafana_observer::domain::tools::ToolCall;
///
/// let call = ToolCall::new(
///     "get_panel",
///     serde_json::json!({ "dashboard_uid": "abc", "panel_id": 5 }),
/// );
/// assert_eq!(call.name(), "get_panel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    name: String,

    /// Arguments for the tool (JSON object)
    arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments.
    pub fn arguments(&self) -> &serde_json::Value {
        &self.arguments
    }
}

/// Result of executing a tool: one text block holding pretty-printed JSON.
///
/// A failed tool still produces output; `is_error` marks it so the client
/// can tell a reported failure from data.
///
/// # Examples
///
/// ```
/// use grafana_observer::domain::tools::ToolOutput;
///
/// let output = ToolOutput::success(&serde_json::json!({ "total": 0 }));
/// assert!(!output.is_error());
///
/// let failure = ToolOutput::error(&serde_json::json!({ "error": "Unknown tool: nope" }));
/// assert!(failure.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Pretty-printed JSON payload
    text: String,

    /// Whether the payload reports a failure
    is_error: bool,
}

impl ToolOutput {
    /// Creates a successful output from a JSON payload.
    pub fn success(payload: &serde_json::Value) -> Self {
        Self {
            text: pretty(payload),
            is_error: false,
        }
    }

    /// Creates an error-flagged output from a JSON payload.
    pub fn error(payload: &serde_json::Value) -> Self {
        Self {
            text: pretty(payload),
            is_error: true,
        }
    }

    /// Returns the text payload.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the output reports a failure.
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Parses the text payload back into JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.text)
    }
}

fn pretty(payload: &serde_json::Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_call_accessors() {
        let call = ToolCall::new("get_folder", json!({ "uid": "f1" }));

        assert_eq!(call.name(), "get_folder");
        assert_eq!(call.arguments()["uid"], "f1");
    }

    #[test]
    fn success_output_is_pretty_printed() {
        let output = ToolOutput::success(&json!({ "total": 2 }));

        assert!(output.text().contains('\n'));
        assert_eq!(output.json().unwrap(), json!({ "total": 2 }));
    }

    #[test]
    fn error_output_is_flagged() {
        let output = ToolOutput::error(&json!({ "error": "boom" }));

        assert!(output.is_error());
        assert_eq!(output.json().unwrap()["error"], "boom");
    }
}
