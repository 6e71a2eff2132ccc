// Error types shared by the API client, the session and the view.

use thiserror::Error;

/// Failure of a single backend round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("API Error: {status} - {body}")]
    Request { status: u16, body: String },

    /// The request never produced a response (connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// A success response whose body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Anything that can land in the session's single error slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Rejected user input. Raised before any request is made.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        ChatError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::Validation(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_display_carries_status_and_body() {
        let err = ApiError::Request {
            status: 500,
            body: "{\"detail\":\"boom\"}".to_string(),
        };
        assert_eq!(err.to_string(), "API Error: 500 - {\"detail\":\"boom\"}");
    }

    #[test]
    fn chat_error_wraps_api_error_transparently() {
        let err: ChatError = ApiError::Network("connection refused".into()).into();
        assert_eq!(err.to_string(), "Network error: connection refused");
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_error_displays_message_verbatim() {
        let err = ChatError::validation("Please enter a job description first.");
        assert_eq!(err.to_string(), "Please enter a job description first.");
        assert!(err.is_validation());
    }
}
