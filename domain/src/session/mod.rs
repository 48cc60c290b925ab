//! Conversation domain.
//!
//! - [`entities::Message`] - one unit of history (system, user, assistant, tool result)
//! - [`conversation::Conversation`] - append-only history with the pairing check
//! - [`transcript::Transcript`] - what survives persistence

pub mod conversation;
pub mod entities;
pub mod transcript;
