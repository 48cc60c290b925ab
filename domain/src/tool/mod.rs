//! Tool domain module
//!
//! The agent reaches the database only through tools. Every tool is described
//! by a [`ToolDefinition`] (name, parameters, access mode), requested by the
//! model as a [`ToolCall`], and answered with a [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolCall     │───▶│ DatabaseToolCall  │───▶│ ToolResult   │
//! │ (registry)   │    │ (untyped)    │    │ (typed arguments) │    │ (output)     │
//! └──────────────┘    └──────────────┘    └───────────────────┘    └──────────────┘
//! ```
//!
//! # Access modes
//!
//! | Tool | Access | Session behaviour |
//! |------|--------|-------------------|
//! | `list_tables` | read-only | no commit |
//! | `sample_table` | read-only | no commit |
//! | `describe_table` | read-only | no commit |
//! | `execute_sql` | read-write | commit on success, rollback on failure |
//!
//! # Architecture
//!
//! - **Domain** (this module): definitions, validation, typed arguments; no I/O
//! - **Application** (`ToolExecutorPort`, `ToolDispatcher`): execution contract
//! - **Infrastructure** (`SqlToolExecutor`): SQLite execution

pub mod catalog;
pub mod entities;
pub mod traits;
pub mod value_objects;

pub use catalog::{DatabaseTool, DatabaseToolCall, database_tool_spec};
pub use entities::{AccessMode, ToolCall, ToolDefinition, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};
