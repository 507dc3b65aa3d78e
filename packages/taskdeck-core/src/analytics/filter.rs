/// Dashboard filter and the flattened work items it is applied to.
///
/// Most projections look at tasks and subtasks side by side. A subtask is
/// lifted into a pseudo-task: its title is prefixed with the parent's, its
/// status is Done when checked and To Do otherwise, its priority is the
/// default, and it inherits the parent's due date. A subtask is only
/// considered when its parent passes the filter.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn search(mut self, needle: &str) -> Self {
        self.search = Some(needle.to_string());
        self
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.needle().is_none()
    }

    fn matches_fields(&self, status: Status, priority: Priority, title: &str, description: &str) -> bool {
        if self.status.is_some_and(|s| s != status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != priority) {
            return false;
        }
        match self.needle() {
            Some(needle) => {
                title.to_lowercase().contains(&needle)
                    || description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    pub fn matches_task(&self, task: &Task) -> bool {
        self.matches_fields(task.status, task.priority, &task.title, &task.description)
    }

    pub fn matches_item(&self, item: &WorkItem) -> bool {
        self.matches_fields(item.status, item.priority, &item.title, &item.description)
    }
}

/// A task, or a subtask viewed as a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub board_id: BoardId,
    pub task_id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask_id: Option<SubtaskId>,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl WorkItem {
    pub fn from_task(board_id: BoardId, task: &Task) -> Self {
        Self {
            board_id,
            task_id: task.id,
            subtask_id: None,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
        }
    }

    pub fn from_subtask(board_id: BoardId, task: &Task, subtask: &Subtask) -> Self {
        Self {
            board_id,
            task_id: task.id,
            subtask_id: Some(subtask.id),
            title: format!("{} → {}", task.title, subtask.title),
            description: String::new(),
            status: if subtask.done { Status::Done } else { Status::ToDo },
            priority: Priority::default(),
            due_date: task.due_date,
        }
    }

    pub fn is_subtask(&self) -> bool {
        self.subtask_id.is_some()
    }
}

/// Every task followed by its subtasks, in board order.
pub fn work_items(boards: &[Board]) -> impl Iterator<Item = WorkItem> + '_ {
    boards.iter().flat_map(|board| {
        board.tasks.iter().flat_map(move |task| {
            std::iter::once(WorkItem::from_task(board.id, task)).chain(
                task.subtasks
                    .iter()
                    .map(move |sub| WorkItem::from_subtask(board.id, task, sub)),
            )
        })
    })
}

/// Work items passing `filter`. Subtasks of a task that fails the filter
/// are skipped; the rest are checked as items of their own.
pub fn filtered_items<'a>(
    boards: &'a [Board],
    filter: &'a TaskFilter,
) -> impl Iterator<Item = WorkItem> + 'a {
    boards.iter().flat_map(move |board| {
        board
            .tasks
            .iter()
            .filter(move |task| filter.matches_task(task))
            .flat_map(move |task| {
                std::iter::once(WorkItem::from_task(board.id, task)).chain(
                    task.subtasks
                        .iter()
                        .map(move |sub| WorkItem::from_subtask(board.id, task, sub))
                        .filter(move |item| filter.matches_item(item)),
                )
            })
    })
}
