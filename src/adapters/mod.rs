//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//!
//! The [`mock`] submodule provides a test double:
//! - [`mock::MockHttpClient`] - Configurable responses and scripted SSE bodies

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, MockResponse, MockStream};
pub use reqwest_http::ReqwestHttpClient;
