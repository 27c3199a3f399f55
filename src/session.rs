//! Case session: drives one conversation against the tutor API.
//!
//! Each request reads its response stream to the end, feeding every frame
//! through [`classify`] into the [`Conversation`] strictly in arrival order.
//! Methods take `&mut self`, so a session never reads two streams at once.

use futures::future::{AbortHandle, AbortRegistration, Abortable};
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use crate::api::{TutorApi, THREAD_ID_HEADER};
use crate::error::{ErrorContext, ResultExt, StreamError, TutorError, TutorResult};
use crate::models::{ContinueCaseRequest, SavePerformanceRequest, StartCaseRequest};
use crate::sse::{classify, frames, FrameMode};
use crate::traits::{ByteStream, HttpClient};
use crate::transcript::{Applied, Conversation};

/// Shown when a start request fails before or during streaming.
pub const START_FAILED_MESSAGE: &str = "❌ Failed to start case.";
/// Shown when a continue request fails before or during streaming.
pub const CONTINUE_FAILED_MESSAGE: &str = "❌ Failed to continue case.";

/// Called after every applied record with the updated conversation.
pub type UpdateCallback = Box<dyn FnMut(&Conversation, Applied) + Send>;

pub struct CaseSession<C: HttpClient> {
    api: TutorApi<C>,
    conversation: Conversation,
    frame_mode: FrameMode,
    thread_id: Option<String>,
    condition: Option<String>,
    case_focus: Option<String>,
    on_update: Option<UpdateCallback>,
    abort: Option<AbortRegistration>,
}

impl<C: HttpClient> CaseSession<C> {
    pub fn new(api: TutorApi<C>) -> Self {
        let frame_mode = api.config().frame_mode;
        Self {
            api,
            conversation: Conversation::new(),
            frame_mode,
            thread_id: None,
            condition: None,
            case_focus: None,
            on_update: None,
            abort: None,
        }
    }

    pub fn with_frame_mode(mut self, mode: FrameMode) -> Self {
        self.frame_mode = mode;
        self
    }

    /// Observe each record as it is applied, e.g. to redraw incrementally.
    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Conversation, Applied) + Send + 'static,
    {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Arm cancellation for the next request. Aborting stops the read loop
    /// at its next suspension point and leaves the transcript as it was.
    /// The next request consumes the registration even if it fails early.
    pub fn abort_handle(&mut self) -> AbortHandle {
        let (handle, registration) = AbortHandle::new_pair();
        self.abort = Some(registration);
        handle
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn api(&self) -> &TutorApi<C> {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut TutorApi<C> {
        &mut self.api
    }

    /// Start a new case. Everything from the previous case is discarded
    /// first, whatever state it was in.
    pub async fn start_case(&mut self, condition: &str, focus: Option<&str>) -> TutorResult<()> {
        let registration = self.abort.take();
        self.conversation.reset();
        self.thread_id = None;
        self.condition = Some(condition.to_string());
        self.case_focus = focus.map(str::to_string);

        let focus = focus.unwrap_or(&self.api.config().case_focus).to_string();
        let request = StartCaseRequest::new(condition).with_case_focus(focus);

        let response = match self.api.start_case(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(condition, error = %e, "start_case failed");
                self.conversation.fail_turn(START_FAILED_MESSAGE);
                return Err(e).context(ErrorContext::new("start_case").with_component("session"));
            }
        };

        match response.header(THREAD_ID_HEADER) {
            Some(id) => {
                info!(thread_id = id, "Case thread assigned");
                self.thread_id = Some(id.to_string());
            }
            None => warn!("start_case response has no {} header", THREAD_ID_HEADER),
        }

        self.drive(response.body, registration, START_FAILED_MESSAGE, "start_case")
            .await?;

        if self.thread_id.is_none() {
            return Err(TutorError::from(StreamError::MissingThreadId {
                header: THREAD_ID_HEADER.to_string(),
            }));
        }
        Ok(())
    }

    /// Send the learner's message and stream the reply.
    pub async fn continue_case(&mut self, input: &str) -> TutorResult<()> {
        let registration = self.abort.take();
        let Some(thread_id) = self.thread_id.clone() else {
            return Err(TutorError::invalid_state("no case thread; start a case first"));
        };
        if self.conversation.is_case_complete() {
            return Err(TutorError::invalid_state("the case is already complete"));
        }

        self.conversation.push_user(input);
        self.conversation.begin_turn();

        let request = ContinueCaseRequest::new(thread_id.as_str(), input);
        let response = match self.api.continue_case(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(thread_id = %thread_id, error = %e, "continue_case failed");
                self.conversation.fail_turn(CONTINUE_FAILED_MESSAGE);
                return Err(e).context(
                    ErrorContext::new("continue_case")
                        .with_thread_id(thread_id)
                        .with_component("session"),
                );
            }
        };

        self.drive(
            response.body,
            registration,
            CONTINUE_FAILED_MESSAGE,
            "continue_case",
        )
        .await
    }

    /// Start the same condition again with the same focus.
    pub async fn restart(&mut self) -> TutorResult<()> {
        let Some(condition) = self.condition.clone() else {
            return Err(TutorError::invalid_state("no previous case to restart"));
        };
        let focus = self.case_focus.clone();
        self.start_case(&condition, focus.as_deref()).await
    }

    /// Save the finished case's result.
    pub async fn save_performance(&self) -> TutorResult<()> {
        let (Some(thread_id), Some(completion)) =
            (self.thread_id.as_deref(), self.conversation.completion())
        else {
            return Err(TutorError::invalid_state(
                "performance can only be saved after the case completes",
            ));
        };

        let request = SavePerformanceRequest::from_completion(thread_id, completion);
        self.api.save_performance(&request).await.with_context(|| {
            ErrorContext::new("save_performance")
                .with_thread_id(thread_id)
                .with_component("session")
        })
    }

    /// Read one response body to the end, or until aborted.
    async fn drive(
        &mut self,
        body: ByteStream,
        registration: Option<AbortRegistration>,
        failure_message: &str,
        operation: &str,
    ) -> TutorResult<()> {
        let registration = registration.unwrap_or_else(|| AbortHandle::new_pair().1);
        let stream = Abortable::new(frames(body), registration);
        futures::pin_mut!(stream);

        let mut applied = 0usize;
        while let Some(item) = stream.next().await {
            let frame = match item {
                Ok(frame) => frame,
                Err(e) => {
                    error!(operation, error = %e, "Response stream failed");
                    self.conversation.fail_turn(failure_message);
                    let mut context = ErrorContext::new(operation).with_component("session");
                    if let Some(id) = &self.thread_id {
                        context = context.with_thread_id(id.as_str());
                    }
                    return Err(TutorError::from(e).with_context(context));
                }
            };

            let Some(record) = classify(&frame, self.frame_mode) else {
                continue;
            };
            let outcome = self.conversation.apply(record);
            applied += 1;
            if let Some(callback) = self.on_update.as_mut() {
                callback(&self.conversation, outcome);
            }
        }

        if stream.is_aborted() {
            info!(operation, applied, "Response stream aborted");
            return Err(StreamError::Aborted.into());
        }

        let state = self.conversation.state();
        if !(state.turn_complete || state.case_complete || state.errored) {
            warn!(operation, "Response stream ended without a completion record");
        }
        debug!(operation, applied, "Response stream finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse, MockStream};
    use crate::api::Credentials;
    use crate::config::TutorConfig;
    use crate::error::ErrorCategory;
    use crate::transcript::Role;

    const START: &str = "http://tutor.test/start_case";
    const CONTINUE: &str = "http://tutor.test/continue_case";

    fn session(mock: &MockHttpClient) -> CaseSession<MockHttpClient> {
        let config = TutorConfig::new().with_base_url("http://tutor.test");
        CaseSession::new(TutorApi::new(mock.clone(), config, Credentials::new("a", "r")))
    }

    fn stream(chunks: &[&'static str]) -> MockResponse {
        MockResponse::Stream(MockStream::new(chunks.to_vec()).with_header("X-Thread-Id", "t-1"))
    }

    #[tokio::test]
    async fn test_start_case_reads_thread_and_transcript() {
        let mock = MockHttpClient::new();
        mock.set_response(
            START,
            stream(&[
                "data: {\"content\":\"A 54-year-old \"}\n\n",
                "data: {\"content\":\"presents.\"}\n\ndata: {\"turn_complete\": true}\n\n",
            ]),
        );

        let mut session = session(&mock);
        session.start_case("Asthma", None).await.unwrap();

        assert_eq!(session.thread_id(), Some("t-1"));
        let entries = session.conversation().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "A 54-year-old presents.");
        assert!(session.conversation().input_enabled());

        let body = mock.get_requests()[0].body.clone().unwrap();
        assert_eq!(body, r#"{"condition":"Asthma","case_focus":"both"}"#);
    }

    #[tokio::test]
    async fn test_continue_requires_thread() {
        let mock = MockHttpClient::new();
        let mut session = session(&mock);
        let err = session.continue_case("hello").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Client);
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_adds_one_system_entry() {
        let mock = MockHttpClient::new();
        mock.set_response(START, stream(&["data: {\"turn_complete\":true}\n\n"]));
        mock.set_response(
            CONTINUE,
            MockResponse::Stream(
                MockStream::new(["data: {\"content\":\"Par\"}\n\n"])
                    .then_fail(crate::traits::HttpError::Io("reset by peer".to_string())),
            ),
        );

        let mut session = session(&mock);
        session.start_case("Asthma", None).await.unwrap();
        let err = session.continue_case("What now?").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.context().unwrap().thread_id.as_deref(), Some("t-1"));

        let roles: Vec<_> = session
            .conversation()
            .entries()
            .iter()
            .map(|e| e.role)
            .collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::System]);
        assert_eq!(
            session.conversation().entries()[2].content,
            CONTINUE_FAILED_MESSAGE
        );
        assert!(session.conversation().input_enabled());
    }

    #[tokio::test]
    async fn test_abort_stops_hung_stream() {
        let mock = MockHttpClient::new();
        mock.set_response(
            START,
            MockResponse::Stream(
                MockStream::new(["data: {\"content\":\"partial\"}\n\n"])
                    .with_header("X-Thread-Id", "t-2")
                    .then_hang(),
            ),
        );

        let mut session = session(&mock);
        let handle = session.abort_handle();
        let mut session = session.on_update(move |_, _| handle.abort());

        let err = session.start_case("Sepsis", None).await.unwrap_err();
        assert!(matches!(err, TutorError::Stream(StreamError::Aborted)));
        assert_eq!(session.conversation().entries()[0].content, "partial");
        assert!(session.conversation().state().active.is_some());
    }

    #[tokio::test]
    async fn test_abort_registration_not_reused_after_failed_request() {
        let mock = MockHttpClient::new();
        mock.set_response(
            START,
            MockResponse::Error(crate::traits::HttpError::Io("connection refused".to_string())),
        );

        let mut session = session(&mock);
        let handle = session.abort_handle();
        assert!(session.start_case("Asthma", None).await.is_err());
        handle.abort();

        mock.set_response(
            START,
            stream(&["data: {\"content\":\"Fresh\"}\n\ndata: {\"turn_complete\":true}\n\n"]),
        );
        session.start_case("Asthma", None).await.unwrap();
        assert_eq!(session.conversation().entries()[0].content, "Fresh");
        assert!(session.conversation().state().turn_complete);
    }
}
