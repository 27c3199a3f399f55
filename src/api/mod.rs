//! Remote tutor API: authenticated requests and response decoding.

mod client;
mod credentials;

pub use client::{TutorApi, THREAD_ID_HEADER};
pub use credentials::Credentials;
