//! Tool Registry - ordered catalog of the tools this server exposes.
//!
//! # Example
//!
//! ```
//! use grafana_observer::domain::tools::{ToolDefinition, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(ToolDefinition::no_arguments("health_check", "Check Grafana health"));
//!
//! assert!(registry.has_tool("health_check"));
//! assert_eq!(registry.all_tools().len(), 1);
//! ```

use super::ToolDefinition;

/// Ordered registry of tool definitions.
///
/// Listing order is registration order. Registering a name twice replaces
/// the earlier definition in place.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Creates a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the full Grafana catalog.
    pub fn with_grafana_tools() -> Self {
        let mut registry = Self::new();
        for tool in super::definitions::all_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Registers a tool.
    pub fn register(&mut self, definition: ToolDefinition) {
        match self.tools.iter_mut().find(|t| t.name() == definition.name()) {
            Some(existing) => *existing = definition,
            None => self.tools.push(definition),
        }
    }

    /// Gets a tool definition by name.
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Checks if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.get_tool(name).is_some()
    }

    /// All tools in registration order.
    pub fn all_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Tool names in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolDefinition::no_arguments("b", "second letter"));
        registry.register(ToolDefinition::no_arguments("a", "first letter"));

        assert_eq!(registry.tool_names(), vec!["b", "a"]);
    }

    #[test]
    fn re_registering_replaces_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolDefinition::no_arguments("a", "old"));
        registry.register(ToolDefinition::no_arguments("b", "other"));
        registry.register(ToolDefinition::no_arguments("a", "new"));

        assert_eq!(registry.all_tools().len(), 2);
        assert_eq!(registry.get_tool("a").unwrap().description(), "new");
        assert_eq!(registry.tool_names(), vec!["a", "b"]);
    }

    #[test]
    fn grafana_catalog_starts_with_dashboard_tools() {
        let registry = ToolRegistry::with_grafana_tools();
        let names = registry.tool_names();

        assert_eq!(names.len(), 21);
        assert_eq!(names[0], "get_dashboard");
        assert_eq!(names[1], "get_panel");
        assert_eq!(names[20], "get_panel_queries");
    }

    #[test]
    fn unknown_tool_is_absent() {
        let registry = ToolRegistry::with_grafana_tools();
        assert!(!registry.has_tool("delete_dashboard"));
    }
}
