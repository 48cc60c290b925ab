//! Conversation state: the ordered, append-only message history of one session.

use super::entities::Message;
use super::transcript::{Transcript, TranscriptEntry, TranscriptRole};
use crate::core::error::DomainError;

/// Ordered, append-only history whose first element is the system message.
///
/// The conversation loop appends to it for the duration of one user turn; the
/// caller owns it across turns and decides how it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Rebuild a conversation from raw messages, checking that the history
    /// starts with its single system message.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self, DomainError> {
        let mut systems = messages.iter().filter(|m| matches!(m, Message::System { .. }));
        let first_is_system = matches!(messages.first(), Some(Message::System { .. }));
        if !first_is_system || systems.nth(1).is_some() {
            return Err(DomainError::MissingSystemMessage);
        }
        Ok(Self { messages })
    }

    /// Rebuild a conversation from a persisted transcript.
    pub fn restore(system_prompt: impl Into<String>, transcript: &Transcript) -> Self {
        let mut conversation = Self::new(system_prompt);
        for entry in transcript.entries() {
            conversation.push(match entry.role {
                TranscriptRole::User => Message::user(&entry.content),
                TranscriptRole::Assistant => Message::assistant(&entry.content),
            });
        }
        conversation
    }

    /// Append a message. A second system message is ignored.
    pub fn push(&mut self, message: Message) {
        if matches!(message, Message::System { .. }) {
            return;
        }
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing but the system message is present
    pub fn is_empty(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Drop everything but the system message.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }

    /// Verify that every assistant tool call is followed, before the next
    /// non-tool message, by one tool result per call in the same order.
    pub fn check_pairing(&self) -> Result<(), DomainError> {
        let mut index = 0;
        while index < self.messages.len() {
            let calls = self.messages[index].tool_calls();
            index += 1;
            for call in calls {
                match self.messages.get(index) {
                    Some(Message::ToolResult { call_id, .. }) if *call_id == call.id => index += 1,
                    _ => {
                        return Err(DomainError::UnpairedToolCall {
                            call_id: call.id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Persistence view: user text and non-empty assistant text, in order.
    pub fn transcript(&self) -> Transcript {
        let entries = self
            .messages
            .iter()
            .filter_map(|message| match message {
                Message::User { content } => Some(TranscriptEntry::user(content)),
                Message::Assistant { content, .. } if !content.trim().is_empty() => {
                    Some(TranscriptEntry::assistant(content))
                }
                _ => None,
            })
            .collect();
        Transcript::new(entries)
    }
}
