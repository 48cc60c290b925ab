//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Invalid session id '{0}'")]
    InvalidSessionId(String),

    #[error("Conversation must start with exactly one system message")]
    MissingSystemMessage,

    #[error("Tool call '{call_id}' is not answered by a matching tool result")]
    UnpairedToolCall { call_id: String },
}

impl DomainError {
    /// True for errors caused by text the model or user supplied.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyQuery
                | DomainError::InvalidSessionId(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_session_id_display() {
        let error = DomainError::InvalidSessionId("../etc".to_string());
        assert!(error.to_string().contains("'../etc'"));
    }

    #[test]
    fn test_is_input_error() {
        assert!(DomainError::EmptyQuery.is_input_error());
        assert!(DomainError::InvalidSessionId("x y".to_string()).is_input_error());
        assert!(!DomainError::MissingSystemMessage.is_input_error());
        assert!(
            !DomainError::UnpairedToolCall {
                call_id: "call_1".to_string()
            }
            .is_input_error()
        );
    }
}
