//! Identifier value objects: session ids and SQL identifier quoting.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one user session. Each session owns at most one active database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parse a session id. Accepts ASCII letters, digits, `-` and `_` so the id
    /// can double as a file name.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= 64
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw))
        } else {
            Err(DomainError::InvalidSessionId(raw))
        }
    }

    /// Build a session id from arbitrary text, replacing disallowed characters
    /// with `_` and truncating to 64 characters.
    pub fn sanitized(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .take(64)
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.is_empty() {
            Self("session".to_string())
        } else {
            Self(cleaned)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Quote an arbitrary identifier the way SQLite expects (`"a""b"`).
pub fn quote_identifier(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}
