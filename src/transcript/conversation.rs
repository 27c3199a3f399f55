//! Transcript reducer.
//!
//! Folds classified stream records into the transcript and the per-request
//! [`StreamState`]. At most one entry is active at a time; completion,
//! error and unknown records seal it.

use tracing::debug;

use super::entry::{EntryId, Role, Transcript, TranscriptEntry};
use crate::sse::{CaseCompletion, StreamRecord};

/// Per-request streaming state. Reset at the start of every request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamState {
    /// Text accumulated for the active entry so far.
    pub accumulated: String,
    /// Entry currently receiving content, if any.
    pub active: Option<EntryId>,
    pub turn_complete: bool,
    pub case_complete: bool,
    pub completion: Option<CaseCompletion>,
    /// An error (upstream record or transport failure) was shown this turn.
    pub errored: bool,
}

/// What applying one record did, for incremental rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Content was appended to this (active) entry.
    Updated(EntryId),
    /// A new sealed entry was added.
    Appended(EntryId),
    TurnComplete,
    CaseComplete,
}

/// A case conversation: its transcript plus the state of the current request.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    transcript: Transcript,
    state: StreamState,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        self.transcript.entries()
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn completion(&self) -> Option<&CaseCompletion> {
        self.state.completion.as_ref()
    }

    pub fn is_case_complete(&self) -> bool {
        self.state.case_complete
    }

    /// Whether the learner may send the next message.
    pub fn input_enabled(&self) -> bool {
        self.state.turn_complete || self.state.case_complete || self.state.errored
    }

    /// Start a new case: nothing from the previous case survives.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.state = StreamState::default();
    }

    /// Start a new request within the same case. The transcript is kept;
    /// the per-request state starts empty.
    pub fn begin_turn(&mut self) {
        let case_complete = self.state.case_complete;
        let completion = self.state.completion.take();
        self.state = StreamState {
            case_complete,
            completion,
            ..StreamState::default()
        };
    }

    /// Append the learner's message.
    pub fn push_user(&mut self, text: impl Into<String>) -> EntryId {
        self.seal();
        self.transcript
            .push(TranscriptEntry::new(Role::User, text.into()))
    }

    /// Record a transport failure: one synthetic system entry, and the turn
    /// counts as complete so input is re-enabled.
    pub fn fail_turn(&mut self, message: impl Into<String>) -> EntryId {
        self.seal();
        self.state.turn_complete = true;
        self.state.errored = true;
        self.transcript
            .push(TranscriptEntry::new(Role::System, message.into()))
    }

    /// Apply one record.
    pub fn apply(&mut self, record: StreamRecord) -> Applied {
        match record {
            StreamRecord::ContentChunk(text) | StreamRecord::Text(text) => {
                Applied::Updated(self.append_content(&text))
            }
            StreamRecord::TurnComplete => {
                self.seal();
                self.state.turn_complete = true;
                Applied::TurnComplete
            }
            StreamRecord::CaseComplete(completion) => {
                self.seal();
                self.state.case_complete = true;
                self.state.completion = Some(completion);
                Applied::CaseComplete
            }
            StreamRecord::Error(message) => {
                self.seal();
                self.state.errored = true;
                Applied::Appended(
                    self.transcript
                        .push(TranscriptEntry::new(Role::System, message)),
                )
            }
            StreamRecord::Unknown(raw) => {
                self.seal();
                Applied::Appended(
                    self.transcript
                        .push(TranscriptEntry::new(Role::Assistant, raw)),
                )
            }
        }
    }

    fn append_content(&mut self, text: &str) -> EntryId {
        let id = match self.state.active {
            Some(id) => id,
            None => {
                let id = self
                    .transcript
                    .push(TranscriptEntry::new(Role::Assistant, String::new()));
                self.state.active = Some(id);
                id
            }
        };

        self.state.accumulated.push_str(text);
        if let Some(content) = self.transcript.content_mut(id) {
            content.clone_from(&self.state.accumulated);
        }
        id
    }

    /// Close the active entry; later content starts a new one.
    fn seal(&mut self) {
        if let Some(id) = self.state.active.take() {
            debug!(entry = id.index(), len = self.state.accumulated.len(), "Sealed entry");
            self.state.accumulated.clear();
        }
    }
}
