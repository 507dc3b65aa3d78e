/// Serialized board payload.
///
/// The whole board list is written as one JSON array under a per-user key.
/// Field names are camelCase. Tasks carry two derived mirrors of their
/// status, `completed` and `statusNormalized`, which are recomputed on every
/// write and only consulted on read when the status itself is unusable.
///
/// Reading is lenient: older payloads have lower-case priorities, empty
/// strings for missing due dates, null descriptions and occasionally
/// repeated ids. Everything is normalized into the canonical types on the
/// way in.
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::storage::StorageError;
use crate::types::*;

/// Storage key holding a user's boards.
pub fn boards_key(user_id: &str) -> String {
    format!("boards_{}", user_id)
}

/// Wire shape of a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRecord {
    pub id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub status_normalized: Option<String>,
    pub completed: Option<bool>,
    pub subtasks: Option<Vec<Subtask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let status = resolve_status(&record);
        let priority = match record.priority.as_deref() {
            None | Some("") => Priority::default(),
            Some(raw) => Priority::parse(raw).unwrap_or_else(|| {
                log::warn!(
                    "[taskdeck.payload] Unknown priority {:?} on task {}, using Medium",
                    raw,
                    record.id
                );
                Priority::default()
            }),
        };
        let updated_at = record.updated_at.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Task {
            id: record.id,
            title: record.title.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            due_date: record.due_date.as_deref().and_then(parse_due_date),
            priority,
            status,
            subtasks: record.subtasks.unwrap_or_default(),
            updated_at,
        }
        .normalized()
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        TaskRecord {
            id: task.id,
            completed: Some(task.completed()),
            status_normalized: Some(task.status_normalized().to_string()),
            status: Some(task.status.as_str().to_string()),
            priority: Some(task.priority.as_str().to_string()),
            title: Some(task.title),
            description: Some(task.description),
            due_date: Some(format_due_date(task.due_date)),
            subtasks: Some(task.subtasks),
            updated_at: task
                .updated_at
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

/// The status string wins. When it is missing or unrecognized, fall back to
/// the lower-cased mirror, then to the `completed` flag.
fn resolve_status(record: &TaskRecord) -> Status {
    if let Some(status) = record.status.as_deref().and_then(Status::parse) {
        return status;
    }
    if let Some(raw) = record.status.as_deref().filter(|s| !s.trim().is_empty()) {
        log::warn!(
            "[taskdeck.payload] Unknown status {:?} on task {}",
            raw,
            record.id
        );
    }
    if let Some(status) = record.status_normalized.as_deref().and_then(Status::parse) {
        return status;
    }
    if record.completed == Some(true) {
        Status::Done
    } else {
        Status::ToDo
    }
}

/// Wire shape of a board.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoardRecord {
    pub id: u64,
    pub title: Option<String>,
    pub tasks: Option<Vec<Task>>,
}

impl From<BoardRecord> for Board {
    fn from(record: BoardRecord) -> Self {
        let title = record
            .title
            .as_deref()
            .and_then(normalize_title)
            .unwrap_or_else(|| {
                log::warn!(
                    "[taskdeck.payload] Board {} has no title, using {:?}",
                    record.id,
                    UNTITLED_BOARD
                );
                UNTITLED_BOARD.to_string()
            });
        let mut tasks = record.tasks.unwrap_or_default();
        let repaired = ids::dedupe(&mut tasks, |t| t.id, |t, id| t.id = id);
        if repaired > 0 {
            log::warn!(
                "[taskdeck.payload] Reassigned {} duplicate task ids on board {}",
                repaired,
                record.id
            );
        }
        Board {
            id: record.id,
            title,
            tasks,
        }
    }
}

/// Parse a due date as entered or stored. Accepts `YYYY-MM-DD` and full
/// RFC 3339 timestamps (reduced to their date). Blank means no due date.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    log::warn!("[taskdeck.payload] Dropping unparsable due date {:?}", raw);
    None
}

/// `YYYY-MM-DD`, or the empty string when there is no due date.
pub fn format_due_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn encode_boards(boards: &[Board]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(boards)?)
}

/// Decode a stored payload. A blank or `null` payload is an empty list.
pub fn decode_boards(payload: &str) -> Result<Vec<Board>, StorageError> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut boards: Vec<Board> = serde_json::from_str::<Option<Vec<Board>>>(payload)?
        .unwrap_or_default();
    let repaired = ids::dedupe(&mut boards, |b| b.id, |b, id| b.id = id);
    if repaired > 0 {
        log::warn!(
            "[taskdeck.payload] Reassigned {} duplicate board ids",
            repaired
        );
    }
    Ok(boards)
}
