//! Presentation layer for querymind
//!
//! This crate contains the CLI definition, console formatting, progress
//! reporting and the interactive chat REPL.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ChatSession, InputAction, classify_input};
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use output::console::{ConsoleFormatter, USAGE_LIMIT_MESSAGE};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
