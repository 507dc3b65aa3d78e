/// Per-board completion figures.
///
/// Two different measures are kept on purpose. Progress weighs subtasks
/// (each task is one unit plus one per subtask) and honours the dashboard
/// filter. Comparison counts whole tasks only and ignores the filter.
use serde::Serialize;

use super::filter::TaskFilter;
use crate::types::{Board, BoardId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardProgress {
    pub board_id: BoardId,
    pub title: String,
    pub completed_units: usize,
    pub total_units: usize,
    /// 0..=100, 0 for a board without units.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardComparison {
    pub board_id: BoardId,
    pub title: String,
    pub done: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percent: u32,
}

pub fn board_progress(boards: &[Board], filter: &TaskFilter) -> Vec<BoardProgress> {
    boards
        .iter()
        .map(|board| {
            let (completed_units, total_units) = board
                .tasks
                .iter()
                .filter(|t| filter.matches_task(t))
                .fold((0, 0), |(done, total), task| {
                    (
                        done + usize::from(task.completed()) + task.subtasks_done(),
                        total + 1 + task.subtasks.len(),
                    )
                });
            BoardProgress {
                board_id: board.id,
                title: board.title.clone(),
                completed_units,
                total_units,
                percent: percent(completed_units, total_units),
            }
        })
        .collect()
}

pub fn board_comparison(boards: &[Board]) -> Vec<BoardComparison> {
    boards
        .iter()
        .map(|board| {
            let total = board.tasks.len();
            let done = board.done_count();
            BoardComparison {
                board_id: board.id,
                title: board.title.clone(),
                done,
                total,
                percent: percent(done, total).round() as u32,
            }
        })
        .collect()
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, Status, Subtask, Task};

    fn board(id: BoardId, tasks: Vec<Task>) -> Board {
        Board {
            id,
            title: format!("Board {}", id),
            tasks,
        }
    }

    #[test]
    fn test_progress_weights_subtasks() {
        let mut t = Task::new(1, "t", Status::InProgress);
        t.subtasks = vec![
            Subtask { id: 1, title: "a".into(), done: true },
            Subtask { id: 2, title: "b".into(), done: true },
            Subtask { id: 3, title: "c".into(), done: false },
        ];
        let done = Task::new(2, "d", Status::Done);
        let progress = board_progress(&[board(1, vec![t, done])], &TaskFilter::default());
        assert_eq!(progress[0].completed_units, 3);
        assert_eq!(progress[0].total_units, 5);
        assert!((progress[0].percent - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_empty_board_is_zero() {
        let progress = board_progress(&[board(1, Vec::new())], &TaskFilter::default());
        assert_eq!(progress[0].percent, 0.0);
    }

    #[test]
    fn test_progress_always_in_range() {
        let mut boards = Vec::new();
        for n in 0..6u64 {
            let tasks = (0..n)
                .map(|i| {
                    let status = if i % 2 == 0 { Status::Done } else { Status::ToDo };
                    let mut t = Task::new(i, "t", status);
                    t.subtasks = (0..i)
                        .map(|j| Subtask { id: j, title: "s".into(), done: j % 3 == 0 })
                        .collect();
                    t
                })
                .collect();
            boards.push(board(n, tasks));
        }
        for p in board_progress(&boards, &TaskFilter::default()) {
            assert!((0.0..=100.0).contains(&p.percent));
        }
    }

    #[test]
    fn test_progress_respects_filter() {
        let mut high = Task::new(1, "h", Status::Done);
        high.priority = Priority::High;
        let low = Task::new(2, "l", Status::ToDo);
        let filter = TaskFilter::default().priority(Priority::High);
        let progress = board_progress(&[board(1, vec![high, low])], &filter);
        assert_eq!(progress[0].total_units, 1);
        assert_eq!(progress[0].percent, 100.0);
    }

    #[test]
    fn test_comparison_rounds() {
        let tasks = vec![
            Task::new(1, "a", Status::Done),
            Task::new(2, "b", Status::ToDo),
            Task::new(3, "c", Status::InProgress),
        ];
        let cmp = board_comparison(&[board(1, tasks), board(2, Vec::new())]);
        assert_eq!(cmp[0].done, 1);
        assert_eq!(cmp[0].total, 3);
        assert_eq!(cmp[0].percent, 33);
        assert_eq!(cmp[1].percent, 0);
    }

    #[test]
    fn test_comparison_rounds_half_up() {
        let mut tasks: Vec<Task> = (0..8).map(|i| Task::new(i, "t", Status::ToDo)).collect();
        tasks[0].status = Status::Done;
        // 1/8 = 12.5%
        let cmp = board_comparison(&[board(1, tasks)]);
        assert_eq!(cmp[0].percent, 13);
    }
}
