//! Session persistence port.
//!
//! The conversation loop holds no durable state. Callers load a
//! [`SessionRecord`] before a turn and save it afterwards through this port.

use chrono::{DateTime, Local, Utc};
use querymind_domain::{SessionId, Transcript};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session storage error: {0}")]
    Io(String),

    #[error("Session {id} is corrupt: {reason}")]
    Corrupt { id: SessionId, reason: String },
}

/// One persisted chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    /// Display title, `Chat@dd-mm-yy [HH:MM]` at creation time
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Database file the session was last connected to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub transcript: Transcript,
}

impl SessionRecord {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: Self::title_for(&now.with_timezone(&Local)),
            created_at: now,
            updated_at: now,
            database: None,
            transcript: Transcript::default(),
        }
    }

    pub fn title_for(at: &DateTime<Local>) -> String {
        at.format("Chat@%d-%m-%y [%H:%M]").to_string()
    }

    /// A fresh, file-safe session id derived from the current time.
    pub fn generate_id() -> SessionId {
        SessionId::sanitized(&Local::now().format("%Y%m%d-%H%M%S-%3f").to_string())
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Replace the transcript and bump `updated_at`.
    pub fn update(&mut self, transcript: Transcript) {
        self.transcript = transcript;
        self.updated_at = Utc::now();
    }
}

/// Summary row for listing sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub messages: usize,
    pub preview: Option<String>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            updated_at: record.updated_at,
            messages: record.transcript.len(),
            preview: record.transcript.first_request().map(str::to_string),
        }
    }
}

/// Port for session persistence
pub trait SessionStore: Send + Sync {
    fn load(&self, id: &SessionId) -> Result<SessionRecord, SessionStoreError>;

    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError>;

    /// All sessions, most recently updated first
    fn list(&self) -> Result<Vec<SessionSummary>, SessionStoreError>;

    /// Remove a saved session. [`SessionStoreError::NotFound`] if there is none.
    fn delete(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use querymind_domain::TranscriptEntry;

    #[test]
    fn test_title_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(SessionRecord::title_for(&at), "Chat@07-03-24 [09:05]");
    }

    #[test]
    fn test_generate_id_is_valid() {
        let id = SessionRecord::generate_id();
        assert!(SessionId::parse(id.as_str()).is_ok());
        assert!(id.as_str().len() >= 15);
    }

    #[test]
    fn test_update_and_summary() {
        let mut record = SessionRecord::new(SessionId::parse("s1").unwrap()).with_database("shop.db");
        let created = record.updated_at;
        record.update(Transcript::new(vec![
            TranscriptEntry::user("top customers?"),
            TranscriptEntry::assistant("Alice and Bob."),
        ]));

        assert!(record.updated_at >= created);
        let summary = SessionSummary::from(&record);
        assert_eq!(summary.messages, 2);
        assert_eq!(summary.preview.as_deref(), Some("top customers?"));
        assert_eq!(record.database.as_deref(), Some("shop.db"));
    }
}
