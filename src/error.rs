//! Error types for the relay core

use thiserror::Error;

/// Errors raised by the registry, sessions and the HTTP ingress.
///
/// None of these are fatal: sessions log them and keep running, and the
/// HTTP layer turns `InvalidMessage` into a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Malformed or missing event payload field
    #[error("invalid payload: {0}")]
    Validation(String),

    /// Mutation targeting a connection with no registry record
    #[error("unknown participant '{0}'")]
    UnknownParticipant(String),

    /// A record for this connection already exists
    #[error("participant '{0}' already joined")]
    DuplicateParticipant(String),

    /// Rejected `POST /message` body
    #[error("{0}")]
    InvalidMessage(String),

    /// Event received after the session was torn down
    #[error("session '{0}' is terminated")]
    SessionTerminated(String),
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Short machine-readable code, used in log fields
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UnknownParticipant(_) => "unknown_participant",
            Self::DuplicateParticipant(_) => "duplicate_participant",
            Self::InvalidMessage(_) => "invalid_message",
            Self::SessionTerminated(_) => "session_terminated",
        }
    }
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::UnknownParticipant("conn_1".to_string());
        assert_eq!(err.to_string(), "unknown participant 'conn_1'");

        let err = RelayError::InvalidMessage("Message is invalid".to_string());
        assert_eq!(err.to_string(), "Message is invalid");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RelayError::validation("x").code(), "validation");
        assert_eq!(
            RelayError::DuplicateParticipant("a".into()).code(),
            "duplicate_participant"
        );
    }
}
