//! Prelude module for convenient imports.
//!
//! ```ignore
//! use case_tutor::prelude::*;
//! ```

// Session and API
pub use crate::api::{Credentials, TutorApi};
pub use crate::config::TutorConfig;
pub use crate::session::CaseSession;

// Stream decoding
pub use crate::sse::{CaseCompletion, FrameMode, StreamRecord};

// Transcript
pub use crate::transcript::{Applied, Conversation, Role, TranscriptEntry};

// Errors
pub use crate::error::{ErrorCategory, ResultExt, TutorError, TutorResult};

// HTTP
pub use crate::adapters::ReqwestHttpClient;
pub use crate::traits::HttpClient;
