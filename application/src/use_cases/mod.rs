//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod dispatch_tool;
pub mod run_query;
pub mod tool_helpers;
