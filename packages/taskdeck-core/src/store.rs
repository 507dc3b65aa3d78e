/// Board store: the single owner of the signed-in user's boards.
///
/// Every mutation builds a new board list from the current snapshot,
/// persists it wholesale under the user's key, and only then swaps it in.
/// A failed write therefore leaves the snapshot exactly as it was.
/// Readers holding an older `Snapshot` keep seeing the old list.
///
/// Business-rule rejections (blank titles, unknown ids, signed out) are
/// no-ops reported through the return value, never errors.
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::ids;
use crate::payload::{boards_key, decode_boards, encode_boards};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::*;

const EVENT_CAPACITY: usize = 64;

/// An immutable view of the board list at one version.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub version: u64,
    pub boards: Arc<Vec<Board>>,
}

/// Emitted after the snapshot is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    Loaded { user_id: String, version: u64 },
    Changed { version: u64 },
    Cleared { version: u64 },
}

pub struct BoardStore {
    storage: Arc<dyn KeyValueStore>,
    identity: Option<String>,
    snapshot: Snapshot,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl BoardStore {
    /// A signed-out store with no boards.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            identity: None,
            snapshot: Snapshot::default(),
            event_tx,
        }
    }

    /// A store already signed in as `user_id`.
    pub fn open(storage: Arc<dyn KeyValueStore>, user_id: &str) -> Result<Self, StorageError> {
        let mut store = Self::new(storage);
        store.switch_identity(Some(user_id))?;
        Ok(store)
    }

    /// Drop the current boards and load those of `user_id` (or none when
    /// signing out). On a storage or decode error the store stays signed
    /// out and empty.
    pub fn switch_identity(&mut self, user_id: Option<&str>) -> Result<(), StorageError> {
        self.identity = None;
        self.replace_snapshot(Vec::new());
        let cleared = self.snapshot.version;

        let Some(user_id) = user_id else {
            log::info!("[taskdeck.store] Signed out, boards cleared");
            self.notify(StoreEvent::Cleared { version: cleared });
            return Ok(());
        };

        let boards = match self.storage.get(&boards_key(user_id))? {
            Some(payload) => decode_boards(&payload)?,
            None => Vec::new(),
        };
        log::info!(
            "[taskdeck.store] Loaded {} boards for user {}",
            boards.len(),
            user_id
        );
        self.identity = Some(user_id.to_string());
        self.replace_snapshot(boards);
        self.notify(StoreEvent::Loaded {
            user_id: user_id.to_string(),
            version: self.snapshot.version,
        });
        Ok(())
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn boards(&self) -> &[Board] {
        &self.snapshot.boards
    }

    pub fn board(&self, board_id: BoardId) -> Option<&Board> {
        self.boards().iter().find(|b| b.id == board_id)
    }

    pub fn task(&self, board_id: BoardId, task_id: TaskId) -> Option<&Task> {
        self.board(board_id).and_then(|b| b.task(task_id))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    /// Create a board. `None` when the title is blank or nobody is signed in.
    pub fn add_board(&mut self, title: &str) -> Result<Option<Board>, StorageError> {
        if self.identity.is_none() {
            log::debug!("[taskdeck.store] add_board ignored: signed out");
            return Ok(None);
        }
        let Some(title) = normalize_title(title) else {
            return Ok(None);
        };

        let id = ids::next_id(self.boards().iter().map(|b| b.id));
        let board = Board::new(id, &title);
        let mut boards = self.boards().to_vec();
        boards.push(board.clone());
        self.commit(boards)?;
        log::info!("[taskdeck.store] Created board {} ({:?})", id, title);
        Ok(Some(board))
    }

    pub fn rename_board(&mut self, board_id: BoardId, title: &str) -> Result<bool, StorageError> {
        let Some(title) = normalize_title(title) else {
            return Ok(false);
        };
        self.mutate_board(board_id, |board| {
            board.title = title;
            true
        })
    }

    /// Remove a board together with all of its tasks and subtasks.
    pub fn delete_board(&mut self, board_id: BoardId) -> Result<bool, StorageError> {
        if self.identity.is_none() || self.board(board_id).is_none() {
            return Ok(false);
        }
        let boards: Vec<Board> = self
            .boards()
            .iter()
            .filter(|b| b.id != board_id)
            .cloned()
            .collect();
        self.commit(boards)?;
        log::info!("[taskdeck.store] Deleted board {}", board_id);
        Ok(true)
    }

    /// Replace a board's whole task list (appending, reordering, bulk edits).
    pub fn update_tasks(&mut self, board_id: BoardId, tasks: Vec<Task>) -> Result<bool, StorageError> {
        self.mutate_board(board_id, |board| {
            let mut tasks: Vec<Task> = tasks.into_iter().map(Task::normalized).collect();
            ids::dedupe(&mut tasks, |t| t.id, |t, id| t.id = id);
            board.tasks = tasks;
            true
        })
    }

    /// Replace the task with the same id, stamping `updated_at`.
    pub fn edit_task(&mut self, board_id: BoardId, task: Task) -> Result<bool, StorageError> {
        self.mutate_board(board_id, |board| {
            let Some(slot) = board.tasks.iter_mut().find(|t| t.id == task.id) else {
                return false;
            };
            let mut task = task.normalized();
            task.updated_at = Some(Utc::now());
            *slot = task;
            true
        })
    }

    pub fn delete_task(&mut self, board_id: BoardId, task_id: TaskId) -> Result<bool, StorageError> {
        self.mutate_board(board_id, |board| {
            let before = board.tasks.len();
            board.tasks.retain(|t| t.id != task_id);
            board.tasks.len() != before
        })
    }

    /// Append a default task to the given column.
    pub fn add_task(&mut self, board_id: BoardId, status: Status) -> Result<Option<Task>, StorageError> {
        let Some(board) = self.board(board_id) else {
            return Ok(None);
        };
        let task = Task::new(
            ids::next_id(board.tasks.iter().map(|t| t.id)),
            DEFAULT_TASK_TITLE,
            status,
        );
        let mut tasks = board.tasks.clone();
        tasks.push(task.clone());
        Ok(self.update_tasks(board_id, tasks)?.then_some(task))
    }

    /// Flip a task between Done and To Do.
    pub fn toggle_task_completion(&mut self, board_id: BoardId, task_id: TaskId) -> Result<bool, StorageError> {
        let Some(task) = self.task(board_id, task_id).cloned() else {
            return Ok(false);
        };
        let status = if task.completed() { Status::ToDo } else { Status::Done };
        self.edit_task(board_id, task.with_status(status))
    }

    pub fn toggle_subtask(
        &mut self,
        board_id: BoardId,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> Result<bool, StorageError> {
        let Some(mut task) = self.task(board_id, task_id).cloned() else {
            return Ok(false);
        };
        let Some(subtask) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
            return Ok(false);
        };
        subtask.done = !subtask.done;
        self.edit_task(board_id, task)
    }

    /// Apply `f` to a copy of one board and commit when it reports a change.
    fn mutate_board<F>(&mut self, board_id: BoardId, f: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Board) -> bool,
    {
        if self.identity.is_none() {
            return Ok(false);
        }
        let mut boards = self.boards().to_vec();
        let Some(board) = boards.iter_mut().find(|b| b.id == board_id) else {
            return Ok(false);
        };
        if !f(board) {
            return Ok(false);
        }
        self.commit(boards)?;
        Ok(true)
    }

    /// Persist then publish. Callers guarantee a signed-in identity.
    fn commit(&mut self, boards: Vec<Board>) -> Result<(), StorageError> {
        let Some(user_id) = self.identity.as_deref() else {
            return Ok(());
        };
        let payload = encode_boards(&boards)?;
        self.storage.set(&boards_key(user_id), &payload)?;
        self.replace_snapshot(boards);
        log::debug!(
            "[taskdeck.store] Persisted {} boards at version {}",
            self.snapshot.boards.len(),
            self.snapshot.version
        );
        self.notify(StoreEvent::Changed {
            version: self.snapshot.version,
        });
        Ok(())
    }

    fn replace_snapshot(&mut self, boards: Vec<Board>) {
        self.snapshot = Snapshot {
            version: self.snapshot.version + 1,
            boards: Arc::new(boards),
        };
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}
