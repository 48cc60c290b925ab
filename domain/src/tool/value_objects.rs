//! Tool domain value objects: immutable result and error types
//!
//! Every tool execution produces a [`ToolResult`]. Failures carry a
//! [`ToolError`] whose code tells the caller what kind of failure occurred:
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `NOT_FOUND` | The model named a tool that is not registered |
//! | `INVALID_ARGUMENT` | Arguments do not satisfy the declared contract |
//! | `DATABASE_UNAVAILABLE` | No database is selected, or it cannot be opened |
//! | `EXECUTION_FAILED` | The engine rejected the statement |
//! | `TIMEOUT` | The call exceeded its wall-clock budget |

use serde::{Deserialize, Serialize};

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const DATABASE_UNAVAILABLE: &str = "DATABASE_UNAVAILABLE";
pub const EXECUTION_FAILED: &str = "EXECUTION_FAILED";
pub const TIMEOUT: &str = "TIMEOUT";

/// Text reported for every tool when no usable database is selected.
pub const NO_DATABASE_MESSAGE: &str = "No database is connected. Select a SQLite database file first.";

/// Error that occurred during tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "EXECUTION_FAILED")
    pub code: String,
    /// Human-readable error message, shown to the model
    pub message: String,
    /// Additional details, logged but not shown to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(NOT_FOUND, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(INVALID_ARGUMENT, message)
    }

    /// The "no database" failure. The message is identical for every tool.
    pub fn database_unavailable() -> Self {
        Self::new(DATABASE_UNAVAILABLE, NO_DATABASE_MESSAGE)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new(EXECUTION_FAILED, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(TIMEOUT, format!("Operation timed out: {}", operation.into()))
    }

    pub fn is_database_unavailable(&self) -> bool {
        self.code == DATABASE_UNAVAILABLE
    }

    pub fn is_timeout(&self) -> bool {
        self.code == TIMEOUT
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Result of a tool execution, carrying output or error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution). May be empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

/// Structured metadata about a tool execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Wall-clock duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Rows returned (or table names listed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.metadata.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_row_count(mut self, rows: usize) -> Self {
        self.metadata.row_count = Some(rows);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }
}
