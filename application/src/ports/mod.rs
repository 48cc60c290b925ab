//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters implement.

pub mod conversation_logger;
pub mod database_control;
pub mod llm_gateway;
pub mod progress;
pub mod session_store;
pub mod tool_executor;
pub mod tool_schema;
