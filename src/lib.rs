//! Case tutor - streaming client for the UKMLA case tutor API.
//!
//! The core is the response accumulator: [`sse`] turns the chunked
//! `text/event-stream` body into classified records, [`transcript`] folds
//! them into the displayed conversation, and [`session`] drives both for
//! each start/continue request.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod session;
pub mod sse;
pub mod traits;
pub mod transcript;
