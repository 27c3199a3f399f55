//! Streaming-related error types.
//!
//! Only failures that end a stream live here. Malformed frames and unknown
//! record shapes are absorbed by the reader and never become errors.

use thiserror::Error;

/// Stream-specific error variants.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// The body read failed after the response headers arrived.
    #[error("Stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// The caller aborted the stream.
    #[error("Stream aborted by caller")]
    Aborted,

    /// The start response carried no thread id header.
    #[error("Response is missing the {header} header")]
    MissingThreadId { header: String },
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::ConnectionLost { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::ConnectionLost { .. } => {
                "Connection to the tutor was lost mid-reply. Please try again.".to_string()
            }
            StreamError::Aborted => "The reply was cancelled.".to_string(),
            StreamError::MissingThreadId { .. } => {
                "The tutor did not start a case thread. Please start the case again.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::Aborted => "E_STREAM_ABORT",
            StreamError::MissingThreadId { .. } => "E_STREAM_THREAD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_loss_is_retryable() {
        assert!(StreamError::ConnectionLost {
            message: "reset".to_string()
        }
        .is_retryable());
        assert!(!StreamError::Aborted.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = StreamError::MissingThreadId {
            header: "X-Thread-Id".to_string(),
        };
        assert_eq!(err.to_string(), "Response is missing the X-Thread-Id header");
        assert_eq!(err.error_code(), "E_STREAM_THREAD");
    }
}
