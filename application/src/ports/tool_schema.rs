//! Tool schema conversion port.
//!
//! Separates "which tools exist" (domain [`ToolSpec`]) from "how the model
//! API wants them described" (infrastructure).

use querymind_domain::tool::entities::{ToolDefinition, ToolSpec};

/// Port for converting tool definitions to the model API's JSON format.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert every tool, in registry order.
    fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value> {
        spec.all().map(|t| self.tool_to_schema(t)).collect()
    }
}
