//! Leaderboard rows, responses and the query sent to `/leaderboard/*`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserLeaderboardRow {
    pub rank: u32,
    pub username: String,
    #[serde(default)]
    pub med_school: String,
    #[serde(default)]
    pub year_group: String,
    #[serde(default)]
    pub cases_passed: u32,
    #[serde(default)]
    pub total_cases: u32,
    #[serde(default)]
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserLeaderboardResponse {
    #[serde(default)]
    pub results: Vec<UserLeaderboardRow>,
    #[serde(default)]
    pub total_users: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    /// The caller's own row, even when it is not on this page.
    #[serde(default)]
    pub user_row: Option<UserLeaderboardRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchoolLeaderboardRow {
    pub rank: u32,
    pub medical_school: String,
    #[serde(default)]
    pub num_users: u32,
    #[serde(default)]
    pub cases_passed: u32,
    #[serde(default)]
    pub total_cases: u32,
    #[serde(default)]
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchoolLeaderboardResponse {
    #[serde(default)]
    pub results: Vec<SchoolLeaderboardRow>,
    #[serde(default)]
    pub total_schools: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub user_school_row: Option<SchoolLeaderboardRow>,
}

impl UserLeaderboardResponse {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        has_more(self.page, self.page_size, self.total_users)
    }
}

impl SchoolLeaderboardResponse {
    pub fn has_more(&self) -> bool {
        has_more(self.page, self.page_size, self.total_schools)
    }
}

fn has_more(page: u32, page_size: u32, total: u32) -> bool {
    page_size > 0 && u64::from(page) * u64::from(page_size) < u64::from(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    CasesPassed,
    TotalCases,
    PassRate,
    Rank,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::CasesPassed => "cases_passed",
            SortBy::TotalCases => "total_cases",
            SortBy::PassRate => "pass_rate",
            SortBy::Rank => "rank",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    All,
    Day,
    Week,
    Month,
    Season,
}

impl TimePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::All => "all",
            TimePeriod::Day => "day",
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
            TimePeriod::Season => "season",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

/// Filters, sorting and pagination for the leaderboard endpoints.
///
/// Unset fields are left out of the query string. `medical_school`,
/// `year_group` and `ward` only apply to the user leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub medical_school: Option<String>,
    pub year_group: Option<String>,
    pub ward: Option<String>,
    pub time_period: Option<TimePeriod>,
    pub season: Option<Season>,
}

impl LeaderboardQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, by: SortBy, order: SortOrder) -> Self {
        self.sort_by = Some(by);
        self.sort_order = Some(order);
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    pub fn medical_school(mut self, school: impl Into<String>) -> Self {
        self.medical_school = Some(school.into());
        self
    }

    pub fn year_group(mut self, year: impl Into<String>) -> Self {
        self.year_group = Some(year.into());
        self
    }

    pub fn ward(mut self, ward: impl Into<String>) -> Self {
        self.ward = Some(ward.into());
        self
    }

    pub fn time_period(mut self, period: TimePeriod) -> Self {
        self.time_period = Some(period);
        self
    }

    pub fn season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    /// `key=value` pairs joined with `&`, values percent-encoded.
    /// Empty when nothing is set.
    pub fn to_query_string(&self) -> String {
        let page = self.page.map(|p| p.to_string());
        let page_size = self.page_size.map(|p| p.to_string());

        let pairs: [(&str, Option<&str>); 9] = [
            ("sort_by", self.sort_by.as_ref().map(SortBy::as_str)),
            ("sort_order", self.sort_order.as_ref().map(SortOrder::as_str)),
            ("page", page.as_deref()),
            ("page_size", page_size.as_deref()),
            ("medical_school", self.medical_school.as_deref()),
            ("year_group", self.year_group.as_deref()),
            ("ward", self.ward.as_deref()),
            ("time_period", self.time_period.as_ref().map(TimePeriod::as_str)),
            ("season", self.season.as_ref().map(Season::as_str)),
        ];

        pairs
            .iter()
            .filter_map(|(key, value)| {
                value.map(|v| format!("{}={}", key, urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
