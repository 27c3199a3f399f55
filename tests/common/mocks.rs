//! Scripted SSE bodies for the mock HTTP client.

use case_tutor::adapters::{MockResponse, MockStream};

use super::THREAD_ID;

/// One SSE event carrying `payload`.
pub fn sse(payload: &str) -> String {
    format!("data: {}\n\n", payload)
}

/// Concatenated SSE events.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads.iter().map(|p| sse(p)).collect()
}

/// Split `bytes` into chunks of `size` bytes, ignoring UTF-8 boundaries.
pub fn chunked(bytes: &[u8], size: usize) -> Vec<Vec<u8>> {
    bytes.chunks(size.max(1)).map(<[u8]>::to_vec).collect()
}

/// Streaming response with the thread id header set.
pub fn start_stream<I, B>(chunks: I) -> MockResponse
where
    I: IntoIterator<Item = B>,
    B: Into<bytes::Bytes>,
{
    MockResponse::Stream(MockStream::new(chunks).with_header("X-Thread-Id", THREAD_ID))
}

/// Streaming response without headers.
pub fn stream<I, B>(chunks: I) -> MockResponse
where
    I: IntoIterator<Item = B>,
    B: Into<bytes::Bytes>,
{
    MockResponse::Stream(MockStream::new(chunks))
}
