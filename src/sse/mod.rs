//! SSE (Server-Sent Events) stream parsing for the tutor endpoints.
//!
//! The start/continue endpoints answer with a `text/event-stream` body:
//! - Each event is a block terminated by `\n\n`
//! - `data: <payload>` lines carry the record; no `event:` or `id:` is used
//! - The payload is a JSON object or raw text, depending on [`FrameMode`]
//!
//! # Module structure
//! - `frame` - Byte stream to frames (FrameDecoder, frames)
//! - `record` - Frame classification (StreamRecord, FrameMode, classify)
//! - `completion` - Case completion payload decoding

mod completion;
mod frame;
mod record;

pub use completion::{CaseCompletion, StructuredFeedback, ThreadMetadata, PASS_SCORE};
pub use frame::{frames, Frame, FrameDecoder};
pub use record::{classify, classify_object, FrameMode, StreamRecord, CASE_COMPLETED_MARKER};
