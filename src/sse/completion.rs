//! Case completion payload.
//!
//! The completion record changed shape several times upstream: a flat
//! `{feedback, score}` pair, a `result` flag, and a nested structured
//! feedback object. All of them decode into [`CaseCompletion`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Score (out of 10) at or above which a case counts as passed when the
/// payload carries no explicit `result`.
pub const PASS_SCORE: f64 = 7.0;

const POSITIVES_KEYS: &[&str] = &["positives", "feedback_positives", "strengths"];
const IMPROVEMENTS_KEYS: &[&str] = &["improvements", "feedback_improvements", "areas_for_improvement"];
const SUMMARY_KEYS: &[&str] = &["summary", "feedback_summary", "overall"];

/// Positives, improvements and a summary for the completed case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredFeedback {
    #[serde(
        default,
        alias = "feedback_positives",
        alias = "strengths",
        deserialize_with = "null_as_empty"
    )]
    pub positives: Vec<String>,
    #[serde(
        default,
        alias = "feedback_improvements",
        alias = "areas_for_improvement",
        deserialize_with = "null_as_empty"
    )]
    pub improvements: Vec<String>,
    #[serde(default, alias = "feedback_summary", alias = "overall")]
    pub summary: Option<String>,
}

impl StructuredFeedback {
    pub fn is_empty(&self) -> bool {
        self.positives.is_empty() && self.improvements.is_empty() && self.summary.is_none()
    }

    /// Pick the feedback fields out of an object one at a time, so a bad
    /// list does not cost the summary.
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            positives: string_list(map, POSITIVES_KEYS),
            improvements: string_list(map, IMPROVEMENTS_KEYS),
            summary: first_field(map, SUMMARY_KEYS),
        }
    }
}

/// Which case the completion belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub case_variation: Option<u32>,
}

/// Result of a finished case, kept apart from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseCompletion {
    pub result: Option<bool>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub structured: Option<StructuredFeedback>,
    pub thread_metadata: Option<ThreadMetadata>,
    pub next_case_variation: Option<u32>,
    pub available_actions: Vec<String>,
    /// The record exactly as received.
    pub raw: Value,
}

impl CaseCompletion {
    /// Decode a completion record. Each field is read on its own: one that
    /// is missing or of an unexpected type is left empty and the rest of
    /// the record still decodes.
    pub fn from_value(raw: Value) -> Self {
        let Some(map) = raw.as_object() else {
            return Self::empty(raw);
        };

        let (feedback, nested) = match map.get("feedback") {
            Some(Value::String(text)) => (Some(text.clone()), None),
            Some(Value::Object(obj)) => (None, Some(StructuredFeedback::from_map(obj))),
            _ => (None, None),
        };

        let explicit = match map.get("structured_feedback") {
            Some(Value::Object(obj)) => Some(StructuredFeedback::from_map(obj)),
            _ => None,
        };

        let structured = [explicit, nested, Some(StructuredFeedback::from_map(map))]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty());

        Self {
            result: map.get("result").and_then(result_from),
            score: map.get("score").and_then(score_from),
            feedback: feedback.or_else(|| structured.as_ref().and_then(|s| s.summary.clone())),
            structured,
            thread_metadata: field(map, "thread_metadata"),
            next_case_variation: field(map, "next_case_variation"),
            available_actions: string_list(map, &["available_actions"]),
            raw,
        }
    }

    fn empty(raw: Value) -> Self {
        Self {
            result: None,
            score: None,
            feedback: None,
            structured: None,
            thread_metadata: None,
            next_case_variation: None,
            available_actions: Vec::new(),
            raw,
        }
    }

    /// Whether the case was passed: the explicit result if present,
    /// otherwise the score against [`PASS_SCORE`].
    pub fn passed(&self) -> Option<bool> {
        self.result
            .or_else(|| self.score.map(|score| score >= PASS_SCORE))
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    map.get(key)
        .and_then(|value| T::deserialize(value).ok())
}

fn first_field<T: DeserializeOwned>(map: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    keys.iter().find_map(|key| field(map, key))
}

/// First key holding an array; non-string items are skipped.
fn string_list(map: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn result_from(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "pass" | "passed" | "true" | "success" => Some(true),
            "fail" | "failed" | "false" | "failure" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn score_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
