//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface over one database.

mod repl;
mod session;

pub use repl::{ChatRepl, InputAction, classify_input};
pub use session::ChatSession;
