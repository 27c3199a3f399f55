//! Performance and progress types returned by `/progress`,
//! `/weekly_dashboard_stats` and `/badges`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transcript::{Role, TranscriptEntry};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OverallStats {
    #[serde(default)]
    pub total_cases: u32,
    #[serde(default)]
    pub total_passes: u32,
    /// Percentage, 0-100.
    #[serde(default)]
    pub pass_rate: f64,
    #[serde(default)]
    pub total_badges: u32,
}

/// Totals for one ward or one condition.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LevelStats {
    #[serde(default)]
    pub total_cases: u32,
    #[serde(default)]
    pub total_passes: u32,
    /// Percentage, 0-100.
    #[serde(default)]
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecentCase {
    pub condition: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub case_variation: u32,
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub feedback_summary: String,
    #[serde(default)]
    pub feedback_positives: Vec<String>,
    #[serde(default)]
    pub feedback_improvements: Vec<String>,
    #[serde(default)]
    pub chat_transcript: Vec<StoredMessage>,
    /// ISO 8601, with or without an offset.
    #[serde(default)]
    pub created_at: String,
}

impl RecentCase {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// A message from a saved case. The role is kept as sent so older
/// transcripts with other speaker names still load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl StoredMessage {
    /// The role, if it is one the transcript knows.
    pub fn known_role(&self) -> Option<Role> {
        match self.role.as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }

    /// As a transcript entry; unknown speakers are shown as the tutor.
    pub fn to_entry(&self) -> TranscriptEntry {
        TranscriptEntry::new(
            self.known_role().unwrap_or(Role::Assistant),
            self.content.clone(),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Badge {
    pub ward: String,
    pub badge_name: String,
    #[serde(default)]
    pub earned_at: String,
}

impl Badge {
    pub fn earned_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.earned_at)
    }
}

/// `GET /badges`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgesResponse {
    #[serde(default)]
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressData {
    /// Older backends omit this; see [`ProgressData::overall_or_derived`].
    #[serde(default)]
    pub overall: Option<OverallStats>,
    #[serde(default)]
    pub ward_stats: BTreeMap<String, LevelStats>,
    #[serde(default)]
    pub condition_stats: BTreeMap<String, LevelStats>,
    #[serde(default)]
    pub recent_cases: Vec<RecentCase>,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl ProgressData {
    /// Server totals when present, otherwise totals computed from
    /// `recent_cases` and `badges`.
    pub fn overall_or_derived(&self) -> OverallStats {
        if let Some(overall) = self.overall {
            return overall;
        }

        let total_cases = self.recent_cases.len() as u32;
        let total_passes = self.recent_cases.iter().filter(|c| c.result).count() as u32;
        OverallStats {
            total_cases,
            total_passes,
            pass_rate: pass_rate(total_passes, total_cases),
            total_badges: self.badges.len() as u32,
        }
    }
}

/// One suggestion on the weekly dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionPoint {
    pub text: String,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyDashboardStats {
    #[serde(default)]
    pub cases_passed: u32,
    #[serde(default)]
    pub cases_failed: u32,
    #[serde(default)]
    pub action_points: Vec<ActionPoint>,
    /// Cases left before the action points are regenerated.
    #[serde(default)]
    pub next_refresh_in_cases: u32,
}

/// Percentage of `passes` in `total`, 0 when there are no cases.
pub fn pass_rate(passes: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(passes) * 100.0 / f64::from(total)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Naive timestamps are UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
