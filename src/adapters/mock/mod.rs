//! Mock implementations for testing.
//!
//! Lets the API client and case session run without network access.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses and
//!   scripted streaming bodies

pub mod http;

pub use http::{MockHttpClient, MockResponse, MockStream, RecordedRequest};
