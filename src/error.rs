//! Error types for the message-board library.
//!
//! Store implementations report failures through [`BoardError`]. The view
//! controller never propagates these; it logs them and reduces each one to a
//! fixed user-facing string.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the message store.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the store
        status: StatusCode,
        /// Human-readable message from the error body
        message: String,
        /// Store-specific error code, if any
        code: Option<String>,
        /// Additional detail, if any
        details: Option<String>,
        /// Suggested fix, if any
        hint: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A store URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The store answered successfully but with an unusable body
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl BoardError {
    /// HTTP status of the failure, when the store produced one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Convenience type alias for Result with BoardError
pub type Result<T> = std::result::Result<T, BoardError>;

impl From<anyhow::Error> for BoardError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = BoardError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "JWT expired".to_string(),
            code: Some("PGRST301".to_string()),
            details: None,
            hint: None,
        };
        assert_eq!(err.to_string(), "API error (401 Unauthorized): JWT expired");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn other_errors_have_no_status() {
        assert_eq!(BoardError::Other("boom".into()).status(), None);
    }
}
