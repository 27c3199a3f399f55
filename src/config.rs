//! Client configuration.
//!
//! Built with the `with_*` methods or read from the environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `CASE_TUTOR_API_URL` | API base URL |
//! | `CASE_TUTOR_FRAME_MODE` | `json`, `text` or `auto` |
//! | `CASE_TUTOR_TIMEOUT_SECS` | connect timeout in seconds |

use std::time::Duration;

use crate::error::ConfigError;
use crate::sse::FrameMode;

/// Production API.
pub const DEFAULT_BASE_URL: &str = "https://ukmla-case-tutor-api.onrender.com";

/// Case focus sent when the caller does not pick one.
pub const DEFAULT_CASE_FOCUS: &str = "both";

pub const ENV_API_URL: &str = "CASE_TUTOR_API_URL";
pub const ENV_FRAME_MODE: &str = "CASE_TUTOR_FRAME_MODE";
pub const ENV_TIMEOUT_SECS: &str = "CASE_TUTOR_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// How stream payloads are interpreted.
    pub frame_mode: FrameMode,
    /// Focus passed to `start_case` when none is given.
    pub case_focus: String,
    /// Connect timeout. Response streams have no deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            frame_mode: FrameMode::default(),
            case_focus: DEFAULT_CASE_FOCUS.to_string(),
            request_timeout: None,
        }
    }
}

impl TutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_frame_mode(mut self, mode: FrameMode) -> Self {
        self.frame_mode = mode;
        self
    }

    pub fn with_case_focus(mut self, focus: impl Into<String>) -> Self {
        self.case_focus = focus.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Check the values that cannot be checked by the type system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidBaseUrl(self.base_url.clone()))
        }
    }

    /// Defaults overridden by any `CASE_TUTOR_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env_var(ENV_API_URL) {
            config = config.with_base_url(url);
        }

        if let Some(mode) = env_var(ENV_FRAME_MODE) {
            let parsed = mode
                .parse::<FrameMode>()
                .map_err(|reason| ConfigError::InvalidEnv {
                    var: ENV_FRAME_MODE,
                    value: mode.clone(),
                    reason,
                })?;
            config = config.with_frame_mode(parsed);
        }

        if let Some(secs) = env_var(ENV_TIMEOUT_SECS) {
            let parsed = secs
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnv {
                    var: ENV_TIMEOUT_SECS,
                    value: secs.clone(),
                    reason: e.to_string(),
                })?;
            config = config.with_request_timeout(Duration::from_secs(parsed));
        }

        config.validate()?;
        Ok(config)
    }

    /// Join `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Set and non-empty.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
