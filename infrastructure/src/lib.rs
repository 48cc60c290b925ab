//! Infrastructure layer for querymind
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the SQLite tool executor, the OpenAI-compatible model
//! gateway, JSON session storage, JSONL conversation logging and
//! configuration file loading.

pub mod config;
pub mod database;
pub mod llm;
pub mod logging;
pub mod sessions;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig,
    FileLoggingConfig, FileModelConfig, FileReplConfig, FileSessionsConfig, FileToolsConfig,
    Severity,
};
pub use database::{DatabaseError, DatabaseHandle, DatabaseRegistry, DatabaseTarget, ScopedSession};
pub use llm::{
    DEFAULT_MODEL, DEFAULT_SEED, DEFAULT_TEMPERATURE, OpenAiCompatibleGateway,
    OpenAiGatewayConfig, ProviderPreset,
};
pub use logging::JsonlConversationLogger;
pub use sessions::JsonSessionStore;
pub use tools::{JsonSchemaToolConverter, SqlToolExecutor};
