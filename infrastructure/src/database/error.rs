//! Database adapter errors.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// No target selected, the file is missing, or it cannot be opened
    #[error("Database unavailable: {reason}")]
    Unavailable { reason: String },

    #[error(transparent)]
    Query(#[from] rusqlite::Error),

    #[error("You can only execute one statement at a time.")]
    MultipleStatements,

    #[error("no such table: {0}")]
    UnknownTable(String),

    /// The deadline passed before the work could commit
    #[error("interrupted")]
    Cancelled,
}

impl DatabaseError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        DatabaseError::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, DatabaseError::Unavailable { .. })
    }

    /// True when the statement was stopped through an interrupt handle.
    pub fn is_interrupted(&self) -> bool {
        match self {
            DatabaseError::Cancelled => true,
            DatabaseError::Query(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code == ErrorCode::OperationInterrupted
            }
            _ => false,
        }
    }
}
