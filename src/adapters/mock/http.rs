//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, scripted SSE bodies or errors for testing purposes.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response, StreamResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// A scripted streaming body.
#[derive(Debug, Clone, Default)]
pub struct MockStream {
    /// Headers sent with the response
    pub headers: Headers,
    /// Chunks delivered in order; an `Err` item is yielded as a read failure
    pub chunks: Vec<Result<Bytes, HttpError>>,
    /// Keep the body open after the last chunk instead of ending it
    pub hang: bool,
}

impl MockStream {
    /// Create a stream delivering the given chunks.
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            headers: Headers::new(),
            chunks: chunks.into_iter().map(|c| Ok(c.into())).collect(),
            hang: false,
        }
    }

    /// Add a response header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Fail the body read after the scripted chunks.
    pub fn then_fail(mut self, err: HttpError) -> Self {
        self.chunks.push(Err(err));
        self
    }

    /// Never end the body after the scripted chunks.
    pub fn then_hang(mut self) -> Self {
        self.hang = true;
        self
    }

    fn into_response(self) -> StreamResponse {
        let chunks = futures::stream::iter(self.chunks);
        let body: ByteStream = if self.hang {
            Box::pin(chunks.chain(futures::stream::pending()))
        } else {
            Box::pin(chunks)
        };
        StreamResponse::new(200, self.headers, body)
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a buffered response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Return a streaming body
    Stream(MockStream),
}

/// Mock HTTP client for testing.
///
/// Responses are looked up by URL: queued one-shot responses first, then
/// exact matches, then prefix matches, then the default.
///
/// # Example
///
/// ```ignore
/// use case_tutor::adapters::mock::{MockHttpClient, MockResponse, MockStream};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://api.example.com/start_case",
///     MockResponse::Stream(MockStream::new(["data: {\"content\":\"Hi\"}\n\n"])),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// One-shot responses, consumed in order
    queued: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            queued: Arc::new(Mutex::new(HashMap::new())),
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a specific URL.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Queue a one-shot response for a URL; queued responses win over
    /// responses registered with [`MockHttpClient::set_response`].
    pub fn queue_response(&self, url: &str, response: MockResponse) {
        let mut queued = self.queued.lock().unwrap();
        queued.entry(url.to_string()).or_default().push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        if let Some(queue) = self.queued.lock().unwrap().get_mut(url) {
            if let Some(response) = queue.pop_front() {
                return Some(response);
            }
        }

        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    fn buffered(&self, url: &str) -> Result<Response, HttpError> {
        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Stream(_)) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.buffered(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.buffered(url)
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));

        match self.get_response(url) {
            Some(MockResponse::Stream(stream)) => Ok(stream.into_response()),
            Some(MockResponse::Success(response)) if !response.is_success() => {
                Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text().unwrap_or_default(),
                })
            }
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "Non-stream response on stream request".to_string(),
            )),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/wards",
            MockResponse::Success(Response::new(200, Bytes::from("{}"))),
        );

        let response = client
            .get("https://example.com/wards", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
    }

    #[tokio::test]
    async fn test_post_stream_with_chunks_and_header() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/start_case",
            MockResponse::Stream(
                MockStream::new(["chunk1", "chunk2"]).with_header("X-Thread-Id", "t-1"),
            ),
        );

        let response = client
            .post_stream("https://example.com/start_case", "{}", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.header("x-thread-id"), Some("t-1"));

        let chunks: Vec<_> = response.body.collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].as_ref().unwrap(), &Bytes::from("chunk2"));
    }

    #[tokio::test]
    async fn test_post_stream_then_fail() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/s",
            MockResponse::Stream(
                MockStream::new(["a"]).then_fail(HttpError::Io("reset".to_string())),
            ),
        );

        let response = client
            .post_stream("https://example.com/s", "{}", &Headers::new())
            .await
            .unwrap();
        let chunks: Vec<_> = response.body.collect().await;
        assert!(chunks[0].is_ok());
        assert!(matches!(chunks[1], Err(HttpError::Io(_))));
    }

    #[tokio::test]
    async fn test_post_stream_error_status() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/s",
            MockResponse::Success(Response::new(503, Bytes::from("down"))),
        );

        let result = client
            .post_stream("https://example.com/s", "{}", &Headers::new())
            .await;
        assert!(matches!(
            result,
            Err(HttpError::ServerError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_queued_responses_are_consumed_in_order() {
        let client = MockHttpClient::new();
        let url = "https://example.com/continue_case";
        client.queue_response(url, MockResponse::Success(Response::new(201, Bytes::new())));
        client.set_response(url, MockResponse::Success(Response::new(200, Bytes::new())));

        let first = client.post(url, "{}", &Headers::new()).await.unwrap();
        let second = client.post(url, "{}", &Headers::new()).await.unwrap();
        assert_eq!(first.status, 201);
        assert_eq!(second.status, 200);
    }

    #[tokio::test]
    async fn test_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client
            .get("https://example.com/missing", &Headers::new())
            .await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }

    #[tokio::test]
    async fn test_prefix_match_and_clone_share_state() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/leaderboard",
            MockResponse::Success(Response::new(200, Bytes::new())),
        );

        let cloned = client.clone();
        let response = cloned
            .get("https://example.com/leaderboard/users?page=1", &Headers::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(client.get_requests().len(), 1);
        client.clear_requests();
        assert!(cloned.get_requests().is_empty());
    }
}
