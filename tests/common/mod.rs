//! Common test utilities for integration tests.
//!
//! ```ignore
//! mod common;
//! use common::{session_with, start_stream, sse};
//! ```

pub mod mocks;

pub use mocks::*;

use case_tutor::adapters::MockHttpClient;
use case_tutor::api::{Credentials, TutorApi};
use case_tutor::config::TutorConfig;
use case_tutor::session::CaseSession;
use case_tutor::sse::FrameMode;

pub const BASE_URL: &str = "http://tutor.test";
pub const START_URL: &str = "http://tutor.test/start_case";
pub const CONTINUE_URL: &str = "http://tutor.test/continue_case";
pub const THREAD_ID: &str = "thread-abc";

/// Creates test credentials for use in tests.
pub fn test_credentials() -> Credentials {
    Credentials::new("test-access-token-12345", "test-refresh-token-67890")
}

pub fn test_config(frame_mode: FrameMode) -> TutorConfig {
    TutorConfig::new()
        .with_base_url(BASE_URL)
        .with_frame_mode(frame_mode)
}

/// A session over `mock` using the given framing.
pub fn session_with(mock: &MockHttpClient, frame_mode: FrameMode) -> CaseSession<MockHttpClient> {
    CaseSession::new(TutorApi::new(
        mock.clone(),
        test_config(frame_mode),
        test_credentials(),
    ))
}
