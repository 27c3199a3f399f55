//! Configuration error types.

use thiserror::Error;

/// Errors raised while building a [`crate::config::TutorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The base URL is not an http(s) URL.
    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}
