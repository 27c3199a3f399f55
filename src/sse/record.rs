//! Record classifier: decides what a frame's payload means.
//!
//! Each payload maps to exactly one [`StreamRecord`]. Shapes overlap in
//! malformed upstream output, so predicates run in a fixed priority order:
//! explicit `type` discriminator, case completion, turn completion, error,
//! content, and finally [`StreamRecord::Unknown`].

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::completion::CaseCompletion;
use super::frame::Frame;

/// Token that prefixes a completion payload in free-text streams.
pub const CASE_COMPLETED_MARKER: &str = "[CASE COMPLETED]";

/// How frame payloads are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameMode {
    /// Every payload is a JSON record. Payloads that are not JSON are
    /// malformed and skipped.
    Json,
    /// Every payload is display text. Nothing is parsed as JSON.
    Text,
    /// A payload that parses as a JSON object is a record; anything else
    /// is display text.
    #[default]
    Auto,
}

impl FrameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameMode::Json => "json",
            FrameMode::Text => "text",
            FrameMode::Auto => "auto",
        }
    }
}

impl std::str::FromStr for FrameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(FrameMode::Json),
            "text" => Ok(FrameMode::Text),
            "auto" => Ok(FrameMode::Auto),
            other => Err(format!("expected json, text or auto, got {:?}", other)),
        }
    }
}

/// A classified stream record.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRecord {
    /// Incremental assistant text from a JSON `content` record.
    ContentChunk(String),
    /// Incremental assistant text from a free-text frame.
    Text(String),
    /// The assistant turn has finished.
    TurnComplete,
    /// The whole case has finished.
    CaseComplete(CaseCompletion),
    /// Upstream error, already rendered to a display string.
    Error(String),
    /// Valid JSON matching no known shape, as compact JSON text.
    Unknown(String),
}

impl StreamRecord {
    /// Records that carry assistant text.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamRecord::ContentChunk(text) | StreamRecord::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Classify one frame. `None` means the frame was malformed and skipped.
pub fn classify(frame: &Frame, mode: FrameMode) -> Option<StreamRecord> {
    let payload = frame.payload.as_str();
    match mode {
        FrameMode::Text => Some(classify_text(payload)),
        FrameMode::Json => match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(map)) => Some(classify_object(map)),
            Ok(other) => {
                debug!(payload, "JSON frame is not an object");
                Some(StreamRecord::Unknown(other.to_string()))
            }
            Err(e) => {
                warn!(error = %e, payload, "Skipping malformed SSE frame");
                None
            }
        },
        FrameMode::Auto => match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(map)) => Some(classify_object(map)),
            _ => Some(classify_text(payload)),
        },
    }
}

fn classify_text(payload: &str) -> StreamRecord {
    let Some(rest) = payload.trim_start().strip_prefix(CASE_COMPLETED_MARKER) else {
        return StreamRecord::Text(payload.to_string());
    };

    let raw = serde_json::from_str::<Value>(rest.trim()).unwrap_or_else(|_| {
        let rest = rest.trim();
        if rest.is_empty() {
            Value::Object(Map::new())
        } else {
            Value::String(rest.to_string())
        }
    });
    let raw = match raw {
        Value::String(feedback) => serde_json::json!({ "feedback": feedback }),
        other => other,
    };
    StreamRecord::CaseComplete(CaseCompletion::from_value(raw))
}

/// Classify a JSON object record.
pub fn classify_object(map: Map<String, Value>) -> StreamRecord {
    if let Some(record) = classify_by_type(&map) {
        return record;
    }

    if is_case_complete(&map) {
        return StreamRecord::CaseComplete(CaseCompletion::from_value(Value::Object(map)));
    }

    if is_turn_complete(&map) {
        return StreamRecord::TurnComplete;
    }

    if let Some(error) = map.get("error") {
        return StreamRecord::Error(render_error(error));
    }

    if let Some(Value::String(content)) = map.get("content") {
        return StreamRecord::ContentChunk(content.clone());
    }

    let raw = Value::Object(map).to_string();
    debug!(record = %raw, "Unrecognised stream record");
    StreamRecord::Unknown(raw)
}

/// Records that name their own kind with a `type` field.
fn classify_by_type(map: &Map<String, Value>) -> Option<StreamRecord> {
    let kind = map.get("type")?.as_str()?;
    let record = match kind {
        "content" | "chunk" | "delta" | "text" => {
            let text = ["content", "data", "text"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))?;
            StreamRecord::ContentChunk(text.to_string())
        }
        "turn_complete" | "done" => StreamRecord::TurnComplete,
        "case_complete" | "completion" => {
            let payload = map
                .get("data")
                .filter(|v| v.is_object())
                .cloned()
                .unwrap_or_else(|| Value::Object(map.clone()));
            StreamRecord::CaseComplete(CaseCompletion::from_value(payload))
        }
        "error" => {
            let error = map
                .get("error")
                .or_else(|| map.get("message"))
                .or_else(|| map.get("data"))
                .map(render_error)
                .unwrap_or_else(|| "Unknown error".to_string());
            StreamRecord::Error(error)
        }
        _ => return None,
    };
    Some(record)
}

fn is_case_complete(map: &Map<String, Value>) -> bool {
    map.contains_key("result")
        || map.contains_key("score")
        || map.contains_key("feedback")
        || map.get("structured_feedback").is_some_and(Value::is_object)
        || map.get("is_completed").and_then(Value::as_bool) == Some(true)
}

fn is_turn_complete(map: &Map<String, Value>) -> bool {
    map.contains_key("turn_complete")
        || map.get("status").and_then(Value::as_str) == Some("completed")
}

/// Strings are shown verbatim, structured errors as compact JSON.
fn render_error(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}
