/// Date-based projections: completions per day and per weekday, the
/// burn-down series and the upcoming list.
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::filter::{filtered_items, TaskFilter, WorkItem};
use crate::types::{Board, Status};

/// Heatmap buckets, Sunday first.
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub day: Weekday,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BurnDownPoint {
    pub date: NaiveDate,
    pub remaining: usize,
}

/// Due dates of the finished tasks and subtasks passing `filter`.
fn completion_dates<'a>(
    boards: &'a [Board],
    filter: &'a TaskFilter,
) -> impl Iterator<Item = NaiveDate> + 'a {
    filtered_items(boards, filter)
        .filter(|item| item.status == Status::Done)
        .filter_map(|item| item.due_date)
}

/// Finished items per due date, oldest first.
pub fn daily_production(boards: &[Board], filter: &TaskFilter) -> Vec<DailyCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in completion_dates(boards, filter) {
        *counts.entry(date).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(date, completed)| DailyCount { date, completed })
        .collect()
}

/// Finished items per weekday of their due date. Always seven buckets.
pub fn weekly_heatmap(boards: &[Board], filter: &TaskFilter) -> Vec<WeekdayCount> {
    let mut counts = [0usize; 7];
    for date in completion_dates(boards, filter) {
        counts[date.weekday().num_days_from_sunday() as usize] += 1;
    }
    WEEK.iter()
        .zip(counts)
        .map(|(day, completed)| WeekdayCount { day: *day, completed })
        .collect()
}

/// Remaining tasks at every distinct due date.
///
/// Counts top-level tasks only, unfiltered: for each date, all tasks minus
/// the finished ones due on or before it.
pub fn burn_down(boards: &[Board]) -> Vec<BurnDownPoint> {
    let tasks: Vec<_> = boards.iter().flat_map(|b| b.tasks.iter()).collect();
    let dates: BTreeSet<NaiveDate> = tasks.iter().filter_map(|t| t.due_date).collect();
    let mut finished: Vec<NaiveDate> = tasks
        .iter()
        .filter(|t| t.completed())
        .filter_map(|t| t.due_date)
        .collect();
    finished.sort_unstable();

    dates
        .into_iter()
        .map(|date| {
            let done = finished.partition_point(|d| *d <= date);
            BurnDownPoint {
                date,
                remaining: tasks.len() - done,
            }
        })
        .collect()
}

/// The next `limit` items by due date. Undated items sort last; ties keep
/// board order.
pub fn upcoming(boards: &[Board], filter: &TaskFilter, limit: usize) -> Vec<WorkItem> {
    let mut items: Vec<WorkItem> = filtered_items(boards, filter).collect();
    items.sort_by_key(|item| (item.due_date.is_none(), item.due_date));
    items.truncate(limit);
    items
}
