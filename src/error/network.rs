//! Network-related error types.
//!
//! Errors raised while talking to the tutor API: connection problems,
//! non-2xx statuses and bodies that could not be decoded.

use thiserror::Error;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    /// Connection to the server failed.
    #[error("Connection failed to '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    #[error("{operation} timed out: {message}")]
    Timeout { operation: String, message: String },

    /// HTTP status error (non-2xx response).
    #[error("HTTP {status} error: {message}")]
    HttpStatus { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// The URL could not be built or parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// Generic network error.
    #[error("Network error: {message}")]
    Other { message: String },
}

impl NetworkError {
    /// Classify an adapter-level [`HttpError`] for the request to `url`.
    pub fn from_http_error(err: HttpError, url: &str) -> Self {
        match err {
            HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
                url: url.to_string(),
                message,
            },
            HttpError::Timeout(message) => NetworkError::Timeout {
                operation: format!("request to {}", url),
                message,
            },
            HttpError::ServerError { status, message } => {
                NetworkError::HttpStatus { status, message }
            }
            HttpError::Cancelled => NetworkError::Cancelled,
            HttpError::InvalidUrl(message) => NetworkError::InvalidUrl {
                url: url.to_string(),
                message,
            },
            HttpError::Io(message) | HttpError::Other(message) => NetworkError::Other { message },
        }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::InvalidResponse { .. } => false,
            NetworkError::InvalidUrl { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// True for 401, which means the access token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, NetworkError::HttpStatus { status: 401, .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the case tutor. Please check your internet connection."
                    .to_string()
            }
            NetworkError::Timeout { .. } => {
                "The case tutor took too long to respond. Please try again.".to_string()
            }
            NetworkError::HttpStatus { status, .. } => match *status {
                400 => "The request was invalid. Please try again.".to_string(),
                401 => "Your session has expired. Please sign in again.".to_string(),
                403 => "Access denied. You don't have permission for this action.".to_string(),
                404 => "The requested case or resource was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The case tutor is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            NetworkError::InvalidResponse { .. } => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
            NetworkError::InvalidUrl { .. } => {
                "The tutor API address is not valid. Check your configuration.".to_string()
            }
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => format!("Network error: {}", message),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::InvalidUrl { .. } => "E_NET_URL",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}
