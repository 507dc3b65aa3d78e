use std::collections::BTreeMap;

use super::filter::{filtered_items, TaskFilter};
use crate::types::{Board, Priority, Status};

/// Tasks and subtasks per status. Every status is present, zero-filled.
pub fn status_counts(boards: &[Board], filter: &TaskFilter) -> BTreeMap<Status, usize> {
    let mut counts: BTreeMap<Status, usize> = Status::COLUMNS.iter().map(|s| (*s, 0)).collect();
    for item in filtered_items(boards, filter) {
        *counts.entry(item.status).or_default() += 1;
    }
    counts
}

/// Tasks and subtasks per priority. Every priority is present, zero-filled.
pub fn priority_counts(boards: &[Board], filter: &TaskFilter) -> BTreeMap<Priority, usize> {
    let mut counts: BTreeMap<Priority, usize> = Priority::ALL.iter().map(|p| (*p, 0)).collect();
    for item in filtered_items(boards, filter) {
        *counts.entry(item.priority).or_default() += 1;
    }
    counts
}
