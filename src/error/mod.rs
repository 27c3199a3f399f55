//! Unified error handling for the case tutor client.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: network, stream and configuration errors
//! - **Unified Error Type**: `TutorError` consolidates all error types
//! - **Error Context**: operation / thread metadata attached to errors
//! - **Result Type Alias**: `TutorResult<T>`
//!
//! Only transport-level failures become errors. Within a stream, malformed
//! frames and unknown record shapes are absorbed (logged and skipped or
//! displayed) and upstream `error` records are shown as system messages.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, lost stream | Yes |
//! | Auth | 401/403 from the API | No |
//! | Server | 5xx, missing thread header | Yes |
//! | Client | Operation called in the wrong state | No |
//! | Configuration | Bad base URL or env value | No |

mod category;
mod config;
mod context;
mod network;
mod result;
mod stream;
mod tutor_error;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use context::ErrorContext;
pub use network::NetworkError;
pub use result::{ResultExt, TutorResult};
pub use stream::StreamError;
pub use tutor_error::TutorError;
