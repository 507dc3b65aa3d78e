/// Advisory messages for the dashboard.
///
/// Rules, each evaluated independently over top-level tasks:
///   a) a board with tasks whose done ratio is under the threshold is falling behind
///   b) pending tasks with priority High (Urgent is not counted)
///   c) nothing due today was finished while work remains
/// When none fire, a single "on track" message is returned.
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Board, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightKind {
    FallingBehind,
    HighPriorityPending,
    NothingDoneToday,
    OnTrack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn is_warning(&self) -> bool {
        self.kind != InsightKind::OnTrack
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Number of unfinished tasks with priority High.
pub fn pending_high_priority(boards: &[Board]) -> usize {
    boards
        .iter()
        .flat_map(|b| b.tasks.iter())
        .filter(|t| t.priority == Priority::High && !t.completed())
        .count()
}

pub fn insights(boards: &[Board], today: NaiveDate, falling_behind_ratio: f64) -> Vec<Insight> {
    let mut messages = Vec::new();

    for board in boards {
        let total = board.tasks.len();
        let done = board.done_count();
        if total > 0 && (done as f64 / total as f64) < falling_behind_ratio {
            messages.push(Insight::new(
                InsightKind::FallingBehind,
                format!(
                    "Project \"{}\" is falling behind ({}/{} tasks done).",
                    board.title, done, total
                ),
            ));
        }
    }

    let high = pending_high_priority(boards);
    if high > 0 {
        let message = if high == 1 {
            "1 high-priority task is still pending!".to_string()
        } else {
            format!("{} high-priority tasks are still pending!", high)
        };
        messages.push(Insight::new(InsightKind::HighPriorityPending, message));
    }

    let tasks = boards.iter().flat_map(|b| b.tasks.iter());
    let (total, done, done_today) = tasks.fold((0, 0, 0), |(total, done, today_done), t| {
        let finished = t.completed();
        (
            total + 1,
            done + usize::from(finished),
            today_done + usize::from(finished && t.due_date == Some(today)),
        )
    });
    if done_today == 0 && total > done {
        messages.push(Insight::new(
            InsightKind::NothingDoneToday,
            "No tasks completed today. Consider focusing on pending tasks.".to_string(),
        ));
    }

    if messages.is_empty() {
        messages.push(Insight::new(
            InsightKind::OnTrack,
            "All projects are on track. Keep up the good work!".to_string(),
        ));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Status, Task};

    const RATIO: f64 = 0.30;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn board(title: &str, tasks: Vec<Task>) -> Board {
        Board {
            id: 1,
            title: title.to_string(),
            tasks,
        }
    }

    #[test]
    fn test_falling_behind_names_board_and_ratio() {
        let tasks = (0..10)
            .map(|i| Task::new(i, "t", if i < 2 { Status::Done } else { Status::ToDo }))
            .collect();
        let out = insights(&[board("Alpha", tasks)], today(), RATIO);
        let behind: Vec<_> = out
            .iter()
            .filter(|i| i.kind == InsightKind::FallingBehind)
            .collect();
        assert_eq!(behind.len(), 1);
        assert!(behind[0].message.contains("Alpha"));
        assert!(behind[0].message.contains("2/10"));
    }

    #[test]
    fn test_empty_board_not_falling_behind() {
        let out = insights(&[board("Empty", Vec::new())], today(), RATIO);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, InsightKind::OnTrack);
    }

    #[test]
    fn test_pending_high_priority_count() {
        let mut a = Task::new(1, "a", Status::ToDo);
        a.priority = Priority::High;
        let mut b = Task::new(2, "b", Status::Done);
        b.priority = Priority::High;
        let mut c = Task::new(3, "c", Status::ToDo);
        c.priority = Priority::Urgent;
        let boards = [board("P", vec![a, b, c])];
        assert_eq!(pending_high_priority(&boards), 1);

        let out = insights(&boards, today(), RATIO);
        assert!(out.iter().any(|i| i.kind == InsightKind::HighPriorityPending
            && i.message == "1 high-priority task is still pending!"));
    }

    #[test]
    fn test_nothing_done_today() {
        let mut done_yesterday = Task::new(1, "a", Status::Done);
        done_yesterday.due_date = today().pred_opt();
        let open = Task::new(2, "b", Status::ToDo);
        let out = insights(&[board("B", vec![done_yesterday, open])], today(), RATIO);
        assert!(out.iter().any(|i| i.kind == InsightKind::NothingDoneToday));
        assert!(out.iter().all(|i| i.is_warning()));
    }

    #[test]
    fn test_on_track_only_when_nothing_fired() {
        let mut done_today = Task::new(1, "a", Status::Done);
        done_today.due_date = Some(today());
        let open = Task::new(2, "b", Status::InProgress);
        let out = insights(&[board("B", vec![done_today, open])], today(), RATIO);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, InsightKind::OnTrack);
        assert_eq!(out[0].to_string(), out[0].message);
    }

    #[test]
    fn test_rules_accumulate_in_order() {
        let mut urgent = Task::new(1, "u", Status::ToDo);
        urgent.priority = Priority::High;
        let out = insights(&[board("Solo", vec![urgent])], today(), RATIO);
        let kinds: Vec<_> = out.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                InsightKind::FallingBehind,
                InsightKind::HighPriorityPending,
                InsightKind::NothingDoneToday,
            ]
        );
    }
}
