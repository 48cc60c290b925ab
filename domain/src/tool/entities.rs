//! Tool domain entities

use super::value_objects::ToolError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transaction policy a tool runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Introspection only; never commits (list_tables, sample_table, describe_table)
    ReadOnly,
    /// May modify the database; commits on success, rolls back on failure (execute_sql)
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(&self) -> &str {
        match self {
            AccessMode::ReadOnly => "read_only",
            AccessMode::ReadWrite => "read_write",
        }
    }

    pub fn is_readonly(&self) -> bool {
        matches!(self, AccessMode::ReadOnly)
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Definition of a tool the model may call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "list_tables")
    pub name: String,
    /// Human-readable description, advertised to the model
    pub description: String,
    /// Transaction policy
    pub access: AccessMode,
    /// Parameter contract, in declaration order
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Type hint: "string", "integer", "number" or "boolean"
    pub param_type: String,
    /// Inclusive lower bound for integer parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, access: AccessMode) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            access,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_readonly(&self) -> bool {
        self.access.is_readonly()
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
            minimum: None,
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

/// Ordered registry of the tools offered to the model.
///
/// Iteration follows registration order, which is also the order the tools
/// are advertised in.
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: Vec<ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. A later definition with the same name replaces the
    /// earlier one in place.
    pub fn register(mut self, tool: ToolDefinition) -> Self {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Look up a tool by name, reporting unknown names as `NOT_FOUND`.
    pub fn resolve(&self, name: &str) -> Result<&ToolDefinition, ToolError> {
        self.get(name).ok_or_else(|| {
            ToolError::not_found(format!(
                "Unknown tool '{}'. Available tools: {}",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A model-issued request to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, unique within one assistant turn
    pub id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments as sent by the model
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get an i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// The `reasoning` argument every tool requires, if present
    pub fn reasoning(&self) -> Option<&str> {
        self.get_string("reasoning")
    }

    /// Arguments as a JSON object, for logging and wire encoding
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}
