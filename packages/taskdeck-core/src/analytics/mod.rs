pub mod counts;
pub mod filter;
pub mod insights;
pub mod progress;
pub mod timeline;

/// Read-only projections over a board snapshot.
///
/// Everything here is a pure function of the boards passed in (plus the
/// filter and the current date where relevant). Nothing is cached; callers
/// recompute from the latest snapshot.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use counts::{priority_counts, status_counts};
pub use filter::{filtered_items, work_items, TaskFilter, WorkItem};
pub use insights::{insights, pending_high_priority, Insight, InsightKind};
pub use progress::{board_comparison, board_progress, BoardComparison, BoardProgress};
pub use timeline::{
    burn_down, daily_production, upcoming, weekly_heatmap, BurnDownPoint, DailyCount, WeekdayCount,
};

use crate::types::{Board, Priority, Status};

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;
pub const DEFAULT_FALLING_BEHIND_RATIO: f64 = 0.30;

/// Tunables for the projections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOptions {
    pub upcoming_limit: usize,
    pub falling_behind_ratio: f64,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            falling_behind_ratio: DEFAULT_FALLING_BEHIND_RATIO,
        }
    }
}

/// Every dashboard projection for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub status_counts: BTreeMap<Status, usize>,
    pub priority_counts: BTreeMap<Priority, usize>,
    pub board_progress: Vec<BoardProgress>,
    pub board_comparison: Vec<BoardComparison>,
    pub daily_production: Vec<DailyCount>,
    pub weekly_heatmap: Vec<WeekdayCount>,
    pub burn_down: Vec<BurnDownPoint>,
    pub upcoming: Vec<WorkItem>,
    pub insights: Vec<Insight>,
}

impl DashboardSummary {
    pub fn compute(
        boards: &[Board],
        filter: &TaskFilter,
        today: NaiveDate,
        options: &AnalyticsOptions,
    ) -> Self {
        Self {
            status_counts: status_counts(boards, filter),
            priority_counts: priority_counts(boards, filter),
            board_progress: board_progress(boards, filter),
            board_comparison: board_comparison(boards),
            daily_production: daily_production(boards, filter),
            weekly_heatmap: weekly_heatmap(boards, filter),
            burn_down: burn_down(boards),
            upcoming: upcoming(boards, filter, options.upcoming_limit),
            insights: insights(boards, today, options.falling_behind_ratio),
        }
    }
}
