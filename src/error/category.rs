//! Error category classification for unified error handling.

use std::fmt;

/// High-level categorization of errors for handling decisions.
///
/// Categories drive the retry prompt and the message shown to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection, DNS, timeout).
    /// Generally transient and retryable.
    Network,

    /// Authentication/authorization errors.
    /// Require fresh credentials from the caller.
    Auth,

    /// Backend/server-side errors (HTTP 5xx, error records from the tutor).
    Server,

    /// Client-side errors (invalid state, calling out of order).
    Client,

    /// Configuration errors (bad base URL, unknown frame mode).
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your connection and try again.",
            ErrorCategory::Auth => "Sign in again to get fresh tokens.",
            ErrorCategory::Server => "The tutor service is having trouble. Try again shortly.",
            ErrorCategory::Client => "Start a new case and try again.",
            ErrorCategory::Configuration => "Check the CASE_TUTOR_* environment variables.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_categories() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
    }
}
