//! Conversation transcript and the reducer that builds it from stream records.

mod conversation;
mod entry;

pub use conversation::{Applied, Conversation, StreamState};
pub use entry::{EntryId, Role, Transcript, TranscriptEntry};
