//! End-to-end accumulation tests: scripted SSE bodies through a session
//! into the transcript.

mod common;

use case_tutor::adapters::{MockHttpClient, MockResponse, MockStream};
use case_tutor::error::{ErrorCategory, StreamError, TutorError};
use case_tutor::sse::FrameMode;
use case_tutor::traits::HttpError;
use case_tutor::transcript::{Role, TranscriptEntry};
use common::*;

async fn run_start(mock: &MockHttpClient, mode: FrameMode) -> case_tutor::session::CaseSession<MockHttpClient> {
    let mut session = session_with(mock, mode);
    session.start_case("Pneumonia", None).await.unwrap();
    session
}

#[tokio::test]
async fn test_hello_world_turn() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([
            sse(r#"{"content":"Hello "}"#),
            sse(r#"{"content":"world"}"#),
            sse(r#"{"turn_complete": true}"#),
        ]),
    );

    let session = run_start(&mock, FrameMode::Json).await;
    let conversation = session.conversation();

    assert_eq!(
        conversation.entries(),
        &[TranscriptEntry::new(Role::Assistant, "Hello world")]
    );
    assert!(conversation.state().turn_complete);
    assert!(!conversation.state().case_complete);
    assert_eq!(session.thread_id(), Some(THREAD_ID));
}

#[tokio::test]
async fn test_any_chunking_gives_same_transcript() {
    let body = sse_body(&[
        r#"{"content":"Patient: \"My chest feels tight\" 🫁 "}"#,
        r#"{"content":"– café au lait spots noted."}"#,
        r#"{"turn_complete": true}"#,
    ]);

    let mut transcripts = Vec::new();
    for size in [body.len(), 1, 2, 3, 5, 7, 64] {
        let mock = MockHttpClient::new();
        mock.set_response(START_URL, start_stream(chunked(body.as_bytes(), size)));
        let session = run_start(&mock, FrameMode::Json).await;
        transcripts.push(session.conversation().entries().to_vec());
    }

    assert_eq!(
        transcripts[0],
        vec![TranscriptEntry::new(
            Role::Assistant,
            "Patient: \"My chest feels tight\" 🫁 – café au lait spots noted."
        )]
    );
    assert!(transcripts.iter().all(|t| t == &transcripts[0]));
}

#[tokio::test]
async fn test_case_complete_kept_out_of_transcript() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([
            sse(r#"{"content":"That concludes the case."}"#),
            sse(r#"{"feedback":"Thorough history","score":8,"is_completed":true}"#),
        ]),
    );

    let session = run_start(&mock, FrameMode::Json).await;
    let conversation = session.conversation();

    assert_eq!(conversation.entries().len(), 1);
    assert!(conversation
        .entries()
        .iter()
        .all(|e| !e.content.contains("Thorough history") && !e.content.contains("[CASE COMPLETED]")));
    let completion = conversation.completion().unwrap();
    assert_eq!(completion.score, Some(8.0));
    assert_eq!(completion.passed(), Some(true));
    assert!(conversation.input_enabled());
}

#[tokio::test]
async fn test_marker_completion_in_text_mode() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([
            sse("Well done."),
            sse(r#"[CASE COMPLETED] {"result": false, "feedback": "Missed sepsis six"}"#),
        ]),
    );

    let session = run_start(&mock, FrameMode::Text).await;
    let conversation = session.conversation();

    assert_eq!(
        conversation.entries(),
        &[TranscriptEntry::new(Role::Assistant, "Well done.")]
    );
    assert_eq!(conversation.completion().unwrap().passed(), Some(false));
}

#[tokio::test]
async fn test_malformed_frame_does_not_split_entry() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([
            sse(r#"{"content":"Vitals: "}"#),
            sse(r#"{"content": tru"#),
            sse(r#"{"content":"HR 112"}"#),
            sse(r#"{"turn_complete": true}"#),
        ]),
    );

    let session = run_start(&mock, FrameMode::Json).await;
    assert_eq!(
        session.conversation().entries(),
        &[TranscriptEntry::new(Role::Assistant, "Vitals: HR 112")]
    );
}

#[tokio::test]
async fn test_new_case_resets_everything() {
    let mock = MockHttpClient::new();
    mock.queue_response(
        START_URL,
        start_stream([
            sse(r#"{"content":"First case, half-way"}"#),
            sse(r#"{"score": 3, "feedback": "Incomplete"}"#),
        ]),
    );
    mock.queue_response(START_URL, start_stream([sse(r#"{"content":"Second"}"#)]));

    let mut session = session_with(&mock, FrameMode::Json);
    session.start_case("Asthma", None).await.unwrap();
    assert!(session.conversation().is_case_complete());

    session.restart().await.unwrap();
    let conversation = session.conversation();
    assert_eq!(
        conversation.entries(),
        &[TranscriptEntry::new(Role::Assistant, "Second")]
    );
    assert!(!conversation.state().turn_complete);
    assert!(!conversation.state().case_complete);
    assert!(conversation.completion().is_none());

    let bodies: Vec<_> = mock
        .get_requests()
        .into_iter()
        .filter_map(|r| r.body)
        .collect();
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn test_plain_text_chunks_concatenate() {
    for mode in [FrameMode::Text, FrameMode::Auto] {
        let mock = MockHttpClient::new();
        mock.set_response(
            START_URL,
            start_stream([sse("plain chunk one"), sse("plain chunk two")]),
        );

        let session = run_start(&mock, mode).await;
        assert_eq!(
            session.conversation().entries(),
            &[TranscriptEntry::new(
                Role::Assistant,
                "plain chunk oneplain chunk two"
            )],
            "mode {:?}",
            mode
        );
    }
}

#[tokio::test]
async fn test_error_record_mid_stream() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([
            sse(r#"{"content":"Examining the patient"}"#),
            sse(r#"{"error":"boom"}"#),
        ]),
    );

    let session = run_start(&mock, FrameMode::Json).await;
    let conversation = session.conversation();

    assert_eq!(
        conversation.entries(),
        &[
            TranscriptEntry::new(Role::Assistant, "Examining the patient"),
            TranscriptEntry::new(Role::System, "boom"),
        ]
    );
    assert!(!conversation.state().case_complete);
    assert!(conversation.input_enabled());
}

#[tokio::test]
async fn test_continue_turn_appends_after_user_entry() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([sse(r#"{"content":"How can I help?"}"#), sse(r#"{"status":"completed"}"#)]),
    );
    mock.set_response(
        CONTINUE_URL,
        stream([sse(r#"{"type":"content","content":"Sats are 91%."}"#), sse(r#"{"type":"done"}"#)]),
    );

    let mut session = session_with(&mock, FrameMode::Json);
    session.start_case("COPD", Some("management")).await.unwrap();
    session.continue_case("What are the sats?").await.unwrap();

    let contents: Vec<_> = session
        .conversation()
        .entries()
        .iter()
        .map(|e| (e.role, e.content.as_str()))
        .collect();
    assert_eq!(
        contents,
        vec![
            (Role::Assistant, "How can I help?"),
            (Role::User, "What are the sats?"),
            (Role::Assistant, "Sats are 91%."),
        ]
    );

    let requests = mock.get_requests();
    let start_body: serde_json::Value =
        serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(start_body["case_focus"], "management");
    let continue_body: serde_json::Value =
        serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
    assert_eq!(continue_body["thread_id"], THREAD_ID);
    assert_eq!(continue_body["user_input"], "What are the sats?");
}

#[tokio::test]
async fn test_unknown_record_shown_raw() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([sse(r#"{"hint":"Consider a chest X-ray"}"#)]),
    );

    let session = run_start(&mock, FrameMode::Json).await;
    assert_eq!(
        session.conversation().entries(),
        &[TranscriptEntry::new(
            Role::Assistant,
            r#"{"hint":"Consider a chest X-ray"}"#
        )]
    );
}

#[tokio::test]
async fn test_http_error_on_start_synthesizes_system_entry() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        MockResponse::Error(HttpError::ServerError {
            status: 503,
            message: "waking up".to_string(),
        }),
    );

    let mut session = session_with(&mock, FrameMode::Json);
    let err = session.start_case("Asthma", None).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Server);
    assert!(err.is_retryable());
    assert_eq!(
        session.conversation().entries(),
        &[TranscriptEntry::new(
            Role::System,
            case_tutor::session::START_FAILED_MESSAGE
        )]
    );
    assert!(session.conversation().input_enabled());
    assert_eq!(mock.get_requests().len(), 1);
}

#[tokio::test]
async fn test_missing_thread_header_reported_after_stream() {
    let mock = MockHttpClient::new();
    mock.set_response(START_URL, stream([sse(r#"{"content":"Hi"}"#)]));

    let mut session = session_with(&mock, FrameMode::Json);
    let err = session.start_case("Asthma", None).await.unwrap_err();

    assert!(matches!(
        err,
        TutorError::Stream(StreamError::MissingThreadId { .. })
    ));
    assert_eq!(session.conversation().entries()[0].content, "Hi");
    assert!(session.continue_case("hello").await.is_err());
}

#[tokio::test]
async fn test_save_performance_after_completion() {
    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        start_stream([sse(r#"{"result":"pass","feedback":{"feedback_summary":"Great","feedback_positives":["Safe"]}}"#)]),
    );
    mock.set_response(
        "http://tutor.test/save_performance",
        MockResponse::Success(case_tutor::traits::Response::new(
            200,
            bytes::Bytes::from_static(b"{}"),
        )),
    );

    let mut session = session_with(&mock, FrameMode::Json);
    session.start_case("Asthma", None).await.unwrap();
    session.save_performance().await.unwrap();

    let saved = mock
        .get_requests()
        .into_iter()
        .find(|r| r.url.ends_with("/save_performance"))
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(saved.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["thread_id"], THREAD_ID);
    assert_eq!(body["result"], true);
    assert_eq!(body["feedback_summary"], "Great");
    assert_eq!(body["feedback_positives"][0], "Safe");
}

#[tokio::test]
async fn test_save_performance_refused_mid_case() {
    let mock = MockHttpClient::new();
    mock.set_response(START_URL, start_stream([sse(r#"{"content":"Hi"}"#)]));

    let mut session = session_with(&mock, FrameMode::Json);
    session.start_case("Asthma", None).await.unwrap();
    let err = session.save_performance().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Client);
}

#[tokio::test]
async fn test_updates_observed_in_order() {
    use std::sync::{Arc, Mutex};

    let mock = MockHttpClient::new();
    mock.set_response(
        START_URL,
        MockResponse::Stream(
            MockStream::new([sse(r#"{"content":"a"}"#), sse(r#"{"content":"b"}"#), sse(r#"{"turn_complete":1}"#)])
                .with_header("x-thread-id", THREAD_ID),
        ),
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut session = session_with(&mock, FrameMode::Json).on_update(move |conversation, _| {
        let text = conversation
            .entries()
            .last()
            .map(|e| e.content.clone())
            .unwrap_or_default();
        sink.lock().unwrap().push(text);
    });
    session.start_case("Asthma", None).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["a", "ab", "ab"]);
}

#[tokio::test]
async fn test_crlf_framed_body_split_mid_line_ending() {
    let mock = MockHttpClient::new();
    let body = "data: {\"content\":\"Hello \"}\r\n\r\ndata: {\"content\":\"world\"}\r\n\r\ndata: {\"feedback\":\"Good\",\"score\":8,\"available_actions\":null}\r\n\r\n";
    mock.set_response(START_URL, start_stream(chunked(body.as_bytes(), 3)));

    let session = run_start(&mock, FrameMode::Json).await;
    let conversation = session.conversation();

    assert_eq!(
        conversation.entries(),
        &[TranscriptEntry::new(Role::Assistant, "Hello world")]
    );
    assert!(conversation.is_case_complete());
    let completion = conversation.completion().unwrap();
    assert_eq!(completion.score, Some(8.0));
    assert_eq!(completion.feedback.as_deref(), Some("Good"));
}
