//! Unified error type for the case tutor client.
//!
//! `TutorError` consolidates the domain-specific error types into a single
//! enum so callers get one category / retry / message surface.

use thiserror::Error;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::context::ErrorContext;
use super::network::NetworkError;
use super::stream::StreamError;

#[derive(Debug, Error)]
pub enum TutorError {
    /// Network-related errors (connections, HTTP, timeouts).
    #[error(transparent)]
    Network(NetworkError),

    /// Errors that ended a response stream.
    #[error(transparent)]
    Stream(StreamError),

    /// An operation was called in a state that does not allow it, e.g.
    /// continuing a case that has no thread yet.
    #[error("invalid session state: {message}")]
    InvalidState { message: String },

    /// Invalid configuration.
    #[error(transparent)]
    Config(ConfigError),

    /// Wrapped error with additional context.
    #[error("{error} ({})", .context.to_log_string())]
    WithContext {
        error: Box<TutorError>,
        context: ErrorContext,
    },
}

impl TutorError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        TutorError::InvalidState {
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TutorError::Network(err) if err.is_unauthorized() => ErrorCategory::Auth,
            TutorError::Network(NetworkError::HttpStatus { status: 403, .. }) => {
                ErrorCategory::Auth
            }
            TutorError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            TutorError::Network(NetworkError::InvalidUrl { .. }) => ErrorCategory::Configuration,
            TutorError::Network(_) => ErrorCategory::Network,
            TutorError::Stream(StreamError::MissingThreadId { .. }) => ErrorCategory::Server,
            TutorError::Stream(_) => ErrorCategory::Network,
            TutorError::InvalidState { .. } => ErrorCategory::Client,
            TutorError::Config(_) => ErrorCategory::Configuration,
            TutorError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            TutorError::Network(err) => err.is_retryable(),
            TutorError::Stream(err) => err.is_retryable(),
            TutorError::InvalidState { .. } | TutorError::Config(_) => false,
            TutorError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            TutorError::Network(err) => err.user_message(),
            TutorError::Stream(err) => err.user_message(),
            TutorError::InvalidState { message } => message.clone(),
            TutorError::Config(err) => format!("Configuration problem: {}", err),
            TutorError::WithContext { error, .. } => error.user_message(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            TutorError::Network(err) => err.error_code(),
            TutorError::Stream(err) => err.error_code(),
            TutorError::InvalidState { .. } => "E_STATE",
            TutorError::Config(_) => "E_CONFIG",
            TutorError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        TutorError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            TutorError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &TutorError {
        match self {
            TutorError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// Check if this error requires fresh credentials.
    pub fn requires_reauth(&self) -> bool {
        match self {
            TutorError::Network(err) => err.is_unauthorized(),
            TutorError::WithContext { error, .. } => error.requires_reauth(),
            _ => false,
        }
    }
}

impl From<NetworkError> for TutorError {
    fn from(err: NetworkError) -> Self {
        TutorError::Network(err)
    }
}

impl From<StreamError> for TutorError {
    fn from(err: StreamError) -> Self {
        TutorError::Stream(err)
    }
}

impl From<ConfigError> for TutorError {
    fn from(err: ConfigError) -> Self {
        TutorError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let unauthorized: TutorError = NetworkError::HttpStatus {
            status: 401,
            message: String::new(),
        }
        .into();
        assert_eq!(unauthorized.category(), ErrorCategory::Auth);
        assert!(unauthorized.requires_reauth());

        let server: TutorError = NetworkError::HttpStatus {
            status: 503,
            message: String::new(),
        }
        .into();
        assert_eq!(server.category(), ErrorCategory::Server);
        assert!(server.is_retryable());

        let state = TutorError::invalid_state("no thread");
        assert_eq!(state.category(), ErrorCategory::Client);
        assert!(!state.is_retryable());
        assert_eq!(state.error_code(), "E_STATE");
    }

    #[test]
    fn test_context_wrapping_preserves_behaviour() {
        let err: TutorError = StreamError::ConnectionLost {
            message: "reset".to_string(),
        }
        .into();
        let wrapped = err.with_context(ErrorContext::new("continue_case").with_thread_id("t-1"));

        assert_eq!(wrapped.context().unwrap().thread_id.as_deref(), Some("t-1"));
        assert!(wrapped.is_retryable());
        assert_eq!(wrapped.error_code(), "E_STREAM_CONN");
        assert!(matches!(wrapped.inner(), TutorError::Stream(_)));
        assert!(wrapped.to_string().starts_with("Stream connection lost: reset (operation=continue_case"));
    }

    #[test]
    fn test_transparent_display() {
        let err: TutorError = NetworkError::Cancelled.into();
        assert_eq!(err.to_string(), "Request cancelled");
    }
}
