//! Application layer for querymind
//!
//! This crate contains the conversation loop, tool dispatch, port definitions
//! and execution parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    database_control::DatabaseControl,
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoQueryProgress, QueryProgressNotifier},
    session_store::{SessionRecord, SessionStore, SessionStoreError, SessionSummary},
    tool_executor::ToolExecutorPort,
    tool_schema::ToolSchemaPort,
};
pub use use_cases::dispatch_tool::{ERROR_PREFIX, ToolDispatcher, error_text};
pub use use_cases::run_query::{RunQueryError, RunQueryInput, RunQueryOutput, RunQueryUseCase};
pub use use_cases::tool_helpers::tool_args_preview;
