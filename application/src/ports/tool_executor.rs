//! Tool Executor port
//!
//! Defines the interface for executing database tools.

use async_trait::async_trait;
use querymind_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolSpec},
    value_objects::{ToolError, ToolResult},
};
use std::time::Duration;

/// The error a call gets when it misses its deadline.
pub fn deadline_exceeded(tool_name: &str, timeout: Duration) -> ToolError {
    ToolError::timeout(format!(
        "{} did not finish within {}s",
        tool_name,
        timeout.as_secs_f32()
    ))
}

/// Port for tool execution
///
/// Implementations never panic on bad input: every failure is returned as a
/// failed [`ToolResult`]. Implementations must also tolerate being dropped
/// mid-execution.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Get the specification of all available tools
    fn tool_spec(&self) -> &ToolSpec;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.tool_spec().get(name).is_some()
    }

    /// Get the definition of a specific tool
    fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tool_spec().get(name)
    }

    /// Execute a tool call
    async fn execute(&self, call: &ToolCall) -> ToolResult;

    /// Execute a tool call that must finish within `timeout`.
    ///
    /// The default drops the `execute` future at the deadline. Executors whose
    /// work may already have committed by then override this and report the
    /// real outcome instead.
    async fn execute_within(&self, call: &ToolCall, timeout: Duration) -> ToolResult {
        match tokio::time::timeout(timeout, self.execute(call)).await {
            Ok(result) => result,
            Err(_) => ToolResult::failure(
                &call.tool_name,
                deadline_exceeded(&call.tool_name, timeout),
            ),
        }
    }
}
