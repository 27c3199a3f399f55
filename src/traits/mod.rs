//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, streaming POST)

pub mod http;

pub use http::{header_value, ByteStream, Headers, HttpClient, HttpError, Response, StreamResponse};
