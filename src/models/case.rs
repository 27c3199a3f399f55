use serde::{Deserialize, Serialize};

use crate::sse::CaseCompletion;

/// Body of `POST /start_case`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartCaseRequest {
    pub condition: String,
    /// History-taking vs. management focus; the server defaults to "both".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_focus: Option<String>,
}

impl StartCaseRequest {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            case_focus: None,
        }
    }

    pub fn with_case_focus(mut self, focus: impl Into<String>) -> Self {
        self.case_focus = Some(focus.into());
        self
    }
}

/// Body of `POST /continue_case`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContinueCaseRequest {
    pub thread_id: String,
    pub user_input: String,
}

impl ContinueCaseRequest {
    pub fn new(thread_id: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            user_input: user_input.into(),
        }
    }
}

/// Body of `POST /save_performance`, built from a finished case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavePerformanceRequest {
    pub thread_id: String,
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default)]
    pub feedback_summary: String,
    #[serde(default)]
    pub feedback_positives: Vec<String>,
    #[serde(default)]
    pub feedback_improvements: Vec<String>,
}

impl SavePerformanceRequest {
    /// A completion with no verdict and no score is saved as a fail.
    pub fn from_completion(thread_id: impl Into<String>, completion: &CaseCompletion) -> Self {
        let structured = completion.structured.clone().unwrap_or_default();
        let feedback_summary = structured
            .summary
            .or_else(|| completion.feedback.clone())
            .unwrap_or_default();

        Self {
            thread_id: thread_id.into(),
            result: completion.passed().unwrap_or(false),
            score: completion.score,
            feedback: completion.feedback.clone(),
            feedback_summary,
            feedback_positives: structured.positives,
            feedback_improvements: structured.improvements,
        }
    }
}
