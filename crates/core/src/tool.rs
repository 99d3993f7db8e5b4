//! Tool calls and the per-agent tool registry.
//!
//! The same shape is used in both directions: agents advertise descriptors
//! under the request's `tool_calls` field, and backends may answer with a
//! `tool_calls` list asking the caller to act.

use serde::{Deserialize, Serialize};

/// A structured action: a tool name plus free-form parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool; empty when a backend omits it
    #[serde(rename = "tool_name", default)]
    pub name: String,

    /// Parameters as a JSON object
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// The tool descriptors an agent advertises on every request.
///
/// Keeps registration order; registering a name twice replaces the earlier
/// descriptor in place.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolCall>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. Replaces any existing descriptor with the same name.
    pub fn register(&mut self, tool: ToolCall) {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: ToolCall) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolCall> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// All descriptors, in registration order.
    pub fn descriptors(&self) -> &[ToolCall] {
        &self.tools
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_wire_format() {
        let call = ToolCall::new("code_editor").with_param("action", "edit");
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["tool_name"], "code_editor");
        assert_eq!(json["params"]["action"], "edit");
    }

    #[test]
    fn tool_call_without_params_parses() {
        let call: ToolCall = serde_json::from_str(r#"{"tool_name":"search"}"#).unwrap();
        assert_eq!(call.name, "search");
        assert!(call.params.is_empty());
    }

    #[test]
    fn registry_keeps_order_and_replaces_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolCall::new("search"));
        registry.register(ToolCall::new("code_editor"));
        registry.register(ToolCall::new("search").with_param("engine", "web"));

        assert_eq!(registry.names(), vec!["search", "code_editor"]);
        assert_eq!(registry.get("search").unwrap().params["engine"], "web");
        assert!(registry.get("shell").is_none());
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.descriptors().is_empty());
    }
}
