//! Result type alias for case tutor operations.

use super::context::ErrorContext;
use super::tutor_error::TutorError;

/// Type alias for Results using TutorError.
pub type TutorResult<T> = Result<T, TutorError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// ```ignore
    /// use case_tutor::error::{ErrorContext, ResultExt};
    ///
    /// let wards = api.wards().await.context(ErrorContext::new("load_wards"))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> TutorResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> TutorResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<TutorError>,
{
    fn context(self, ctx: ErrorContext) -> TutorResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> TutorResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
