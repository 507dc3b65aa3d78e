use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::analytics::TaskFilter;
use crate::auth::UserRecord;
use crate::payload::{BoardRecord, TaskRecord};

pub type BoardId = u64;
pub type TaskId = u64;
pub type SubtaskId = u64;

/// Fallback title for boards loaded with an empty title.
pub const UNTITLED_BOARD: &str = "Untitled board";
/// Title given to tasks created from a column's add button.
pub const DEFAULT_TASK_TITLE: &str = "Task";
/// Title given to freshly added subtasks.
pub const DEFAULT_SUBTASK_TITLE: &str = "New Subtask";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }

    /// Case-insensitive parse. Older boards stored lower-case priorities.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl Status {
    /// Board columns, left to right. Column index N holds tasks with `COLUMNS[N]`.
    pub const COLUMNS: [Status; 3] = [Status::ToDo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    /// Lower-cased mirror of the display string ("to do", "in progress", "done").
    pub fn normalized(&self) -> &'static str {
        match self {
            Status::ToDo => "to do",
            Status::InProgress => "in progress",
            Status::Done => "done",
        }
    }

    pub fn from_column(index: usize) -> Option<Self> {
        Self::COLUMNS.get(index).copied()
    }

    pub fn column(&self) -> usize {
        match self {
            Status::ToDo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    /// Lenient parse: any casing, `-`/`_` as separators, and the compact `todo`.
    pub fn parse(value: &str) -> Option<Self> {
        let key: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        match key.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "to do" | "todo" => Some(Status::ToDo),
            "in progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default)]
    pub id: SubtaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

/// A unit of work on a board.
///
/// `completed` is not stored: it is derived from `status`, so the two can
/// never disagree in memory. The payload still carries both fields, plus the
/// lower-cased `statusNormalized` mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: Status,
    pub subtasks: Vec<Subtask>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, title: &str, status: Status) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: String::new(),
            due_date: None,
            priority: Priority::default(),
            status,
            subtasks: Vec::new(),
            updated_at: None,
        }
    }

    pub fn completed(&self) -> bool {
        self.status == Status::Done
    }

    pub fn status_normalized(&self) -> &'static str {
        self.status.normalized()
    }

    /// Move to another status. Completion follows automatically.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Canonicalize a caller-supplied task: trimmed NFC title (falling back
    /// to the default title), NFC description, subtask ids unique.
    pub fn normalized(mut self) -> Self {
        self.title = normalize_title(&self.title).unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string());
        self.description = self.description.nfc().collect();
        for subtask in &mut self.subtasks {
            subtask.title = subtask.title.nfc().collect();
        }
        crate::ids::dedupe(&mut self.subtasks, |s| s.id, |s, id| s.id = id);
        self
    }

    pub fn subtask(&self, subtask_id: SubtaskId) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    pub fn subtasks_done(&self) -> usize {
        self.subtasks.iter().filter(|s| s.done).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BoardRecord")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl Board {
    pub fn new(id: BoardId, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Tasks in one column, in board order.
    pub fn column(&self, status: Status) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.status == status)
    }

    /// Tasks in one column that also pass `filter`, as the board view shows them.
    pub fn column_filtered<'a>(
        &'a self,
        status: Status,
        filter: &'a TaskFilter,
    ) -> impl Iterator<Item = &'a Task> + 'a {
        self.column(status).filter(move |t| filter.matches_task(t))
    }

    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed()).count()
    }
}

/// A registered account. Email is unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserRecord")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Trim and NFC-normalize a user-entered title. `None` when nothing is left.
pub fn normalize_title(raw: &str) -> Option<String> {
    let title: String = raw.trim().nfc().collect();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
