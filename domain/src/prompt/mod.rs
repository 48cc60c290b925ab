//! Prompt domain

mod system;

pub use system::SystemPrompt;
