//! Line-based terminal output for the binary.

use crate::models::{OverallStats, ProgressData, WardCatalog};
use crate::sse::CaseCompletion;
use crate::transcript::{Role, TranscriptEntry};

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// ```text
/// ASTHMA
/// ════════════════════════════════════════════════════════════
/// ```
pub fn header(title: &str) -> String {
    format!("{}\n{}", title.to_uppercase(), "═".repeat(LINE_WIDTH))
}

pub fn rule() -> String {
    "─".repeat(LINE_WIDTH)
}

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Tutor",
        Role::System => "System",
    }
}

pub fn entry(entry: &TranscriptEntry) -> String {
    format!("{}: {}", speaker(entry.role), entry.content)
}

/// Summary card shown once the case is complete.
pub fn completion(completion: &CaseCompletion) -> String {
    let mut lines = vec![rule()];

    let verdict = match completion.passed() {
        Some(true) => "✓ CASE PASSED",
        Some(false) => "✗ CASE NOT PASSED",
        None => "CASE COMPLETE",
    };
    lines.push(verdict.to_string());
    if let Some(score) = completion.score {
        lines.push(format!("  Score:    {}/10", score));
    }
    if let Some(feedback) = &completion.feedback {
        lines.push(format!("  Feedback: {}", feedback));
    }

    if let Some(structured) = &completion.structured {
        for positive in &structured.positives {
            lines.push(format!("  + {}", positive));
        }
        for improvement in &structured.improvements {
            lines.push(format!("  - {}", improvement));
        }
    }

    lines.push(rule());
    lines.join("\n")
}

pub fn wards(catalog: &WardCatalog) -> String {
    let mut lines = Vec::new();
    for ward in catalog.ward_names() {
        lines.push(ward.to_string());
        for condition in catalog.conditions(ward) {
            lines.push(format!("  {}", condition));
        }
    }
    lines.join("\n")
}

pub fn progress(data: &ProgressData) -> String {
    let OverallStats {
        total_cases,
        total_passes,
        pass_rate,
        total_badges,
    } = data.overall_or_derived();

    let mut lines = vec![
        header("Progress"),
        format!("  Cases:     {}", total_cases),
        format!("  Passed:    {}", total_passes),
        format!("  Pass rate: {:.0}%", pass_rate),
        format!("  Badges:    {}", total_badges),
    ];
    if !data.ward_stats.is_empty() {
        lines.push(String::new());
        for (ward, stats) in &data.ward_stats {
            lines.push(format!(
                "  {:<24} {:>3}/{:<3} {:>4.0}%",
                ward, stats.total_passes, stats.total_cases, stats.pass_rate
            ));
        }
    }
    lines.join("\n")
}
