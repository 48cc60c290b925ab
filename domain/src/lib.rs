//! Domain layer for querymind
//!
//! This crate contains the core entities and value objects of the SQL agent.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! A [`Conversation`] is the ordered history the model sees: one system
//! message, then user requests, assistant turns and tool results. Every tool
//! call in an assistant turn is answered by exactly one tool result, in order.
//!
//! ## Tools
//!
//! The model inspects and queries the database through four tools
//! ([`DatabaseTool`]). Each has a declared parameter contract and an
//! [`AccessMode`] that decides whether its session commits.

pub mod core;
pub mod prompt;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use self::core::{
    error::DomainError,
    identifier::{SessionId, quote_identifier},
};
pub use prompt::SystemPrompt;
pub use session::{
    conversation::Conversation,
    entities::{Message, Role},
    transcript::{Transcript, TranscriptEntry, TranscriptRole},
};
pub use tool::{
    catalog::{
        DatabaseTool, DatabaseToolCall, DescribeTableArgs, ExecuteSqlArgs, ListTablesArgs,
        SampleTableArgs, database_tool_spec,
    },
    entities::{AccessMode, ToolCall, ToolDefinition, ToolParameter, ToolSpec},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::{NO_DATABASE_MESSAGE, ToolError, ToolResult, ToolResultMetadata},
};
