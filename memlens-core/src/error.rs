//! Error types for session access and inspection

use thiserror::Error;

/// Failure reported by the debug session a request was sent through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{command} request failed: {message}")]
    Rejected { command: String, message: String },

    #[error("Debug session disconnected")]
    Disconnected,

    #[error("Unexpected {command} response body: {reason}")]
    InvalidBody { command: String, reason: String },
}

impl SessionError {
    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::Rejected {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn invalid_body(command: impl Into<String>, reason: impl ToString) -> Self {
        SessionError::InvalidBody {
            command: command.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("No active debug session")]
    NoActiveSession,

    #[error("No active stack frame")]
    NoActiveFrame,

    #[error(transparent)]
    Request(#[from] SessionError),

    #[error("Malformed {command} response: {reason}")]
    MalformedResponse { command: String, reason: String },
}

impl InspectError {
    pub fn malformed(command: impl Into<String>, reason: impl ToString) -> Self {
        InspectError::MalformedResponse {
            command: command.into(),
            reason: reason.to_string(),
        }
    }
}
