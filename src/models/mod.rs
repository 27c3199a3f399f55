//! Wire types for the tutor API.

mod case;
mod catalog;
mod leaderboard;
mod progress;
mod user;

pub use case::{ContinueCaseRequest, SavePerformanceRequest, StartCaseRequest};
pub use catalog::WardCatalog;
pub use leaderboard::{
    LeaderboardQuery, SchoolLeaderboardResponse, SchoolLeaderboardRow, Season, SortBy,
    SortOrder, TimePeriod, UserLeaderboardResponse, UserLeaderboardRow,
};
pub use progress::{
    pass_rate, ActionPoint, Badge, BadgesResponse, LevelStats, OverallStats, ProgressData,
    RecentCase, StoredMessage, WeeklyDashboardStats,
};
pub use user::UserMetadata;
