/// Task edit form state.
///
/// A `TaskDraft` collects edits to one task without touching the store.
/// `TaskEditor` wraps a draft with the "saving" state the UI shows while a
/// save is outstanding: a second submit is refused until the first one has
/// been committed, so saves cannot be duplicated or reordered.
use chrono::NaiveDate;

use crate::ids;
use crate::payload::parse_due_date;
use crate::storage::StorageError;
use crate::store::BoardStore;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priority: task.priority,
            subtasks: task.subtasks.clone(),
        }
    }

    /// Set the due date from form input. Blank or unparsable clears it.
    pub fn set_due_date_str(&mut self, raw: &str) {
        self.due_date = parse_due_date(raw);
    }

    /// Set the priority from form input, ignoring unknown values.
    pub fn set_priority_str(&mut self, raw: &str) {
        if let Some(priority) = Priority::parse(raw) {
            self.priority = priority;
        }
    }

    pub fn add_subtask(&mut self) -> SubtaskId {
        let id = ids::next_id(self.subtasks.iter().map(|s| s.id));
        self.subtasks.push(Subtask {
            id,
            title: DEFAULT_SUBTASK_TITLE.to_string(),
            done: false,
        });
        id
    }

    pub fn set_subtask_done(&mut self, subtask_id: SubtaskId, done: bool) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.done = done;
                true
            }
            None => false,
        }
    }

    pub fn rename_subtask(&mut self, subtask_id: SubtaskId, title: &str) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(subtask) => {
                subtask.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_subtask(&mut self, subtask_id: SubtaskId) -> bool {
        let before = self.subtasks.len();
        self.subtasks.retain(|s| s.id != subtask_id);
        self.subtasks.len() != before
    }

    /// The task as it would be saved. Id and status come from `original`.
    pub fn apply(&self, original: &Task) -> Task {
        Task {
            id: original.id,
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
            status: original.status,
            subtasks: self.subtasks.clone(),
            updated_at: original.updated_at,
        }
    }
}

pub struct TaskEditor {
    board_id: BoardId,
    original: Task,
    pub draft: TaskDraft,
    pending: Option<Task>,
}

impl TaskEditor {
    pub fn new(board_id: BoardId, task: Task) -> Self {
        Self {
            board_id,
            draft: TaskDraft::from_task(&task),
            original: task,
            pending: None,
        }
    }

    /// Open an editor on a task in the store.
    pub fn open(store: &BoardStore, board_id: BoardId, task_id: TaskId) -> Option<Self> {
        store
            .task(board_id, task_id)
            .map(|task| Self::new(board_id, task.clone()))
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn is_saving(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != TaskDraft::from_task(&self.original)
    }

    /// Start a save. Returns the task that will be written, or `None` when a
    /// save is already outstanding.
    pub fn begin_save(&mut self) -> Option<Task> {
        if self.pending.is_some() {
            log::debug!(
                "[taskdeck.editor] Duplicate submit for task {} ignored",
                self.original.id
            );
            return None;
        }
        let task = self.draft.apply(&self.original);
        self.pending = Some(task.clone());
        Some(task)
    }

    /// Commit the outstanding save. The saving state is cleared whether or
    /// not the write succeeds. Returns false when nothing was pending or the
    /// task no longer exists.
    pub fn finish_save(&mut self, store: &mut BoardStore) -> Result<bool, StorageError> {
        let Some(task) = self.pending.take() else {
            return Ok(false);
        };
        let saved = store.edit_task(self.board_id, task)?;
        if saved {
            if let Some(stored) = store.task(self.board_id, self.original.id) {
                self.original = stored.clone();
                self.draft = TaskDraft::from_task(stored);
            }
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use std::sync::Arc;

    fn setup() -> (BoardStore, BoardId, TaskId) {
        let mut store = BoardStore::open(Arc::new(MemoryStore::new()), "u1").unwrap();
        let board = store.add_board("Home").unwrap().unwrap();
        let task = store.add_task(board.id, Status::InProgress).unwrap().unwrap();
        (store, board.id, task.id)
    }

    #[test]
    fn test_draft_subtasks() {
        let mut draft = TaskDraft::from_task(&Task::new(1, "t", Status::ToDo));
        let a = draft.add_subtask();
        let b = draft.add_subtask();
        assert_ne!(a, b);
        assert_eq!(draft.subtasks[0].title, DEFAULT_SUBTASK_TITLE);
        assert!(draft.set_subtask_done(a, true));
        assert!(draft.rename_subtask(b, "Paint"));
        assert!(draft.remove_subtask(a));
        assert!(!draft.remove_subtask(a));
        assert_eq!(draft.subtasks.len(), 1);
        assert_eq!(draft.subtasks[0].title, "Paint");
    }

    #[test]
    fn test_draft_form_inputs() {
        let mut draft = TaskDraft::from_task(&Task::new(1, "t", Status::ToDo));
        draft.set_due_date_str("2025-09-30");
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2025, 9, 30));
        draft.set_due_date_str("");
        assert_eq!(draft.due_date, None);
        draft.set_priority_str("urgent");
        assert_eq!(draft.priority, Priority::Urgent);
        draft.set_priority_str("nope");
        assert_eq!(draft.priority, Priority::Urgent);
    }

    #[test]
    fn test_save_roundtrip() {
        let (mut store, board_id, task_id) = setup();
        let mut editor = TaskEditor::open(&store, board_id, task_id).unwrap();
        editor.draft.title = "Fix sink".into();
        editor.draft.priority = Priority::High;
        editor.draft.add_subtask();
        assert!(editor.is_dirty());

        assert!(editor.begin_save().is_some());
        assert!(editor.is_saving());
        assert!(editor.finish_save(&mut store).unwrap());
        assert!(!editor.is_saving());
        assert!(!editor.is_dirty());

        let saved = store.task(board_id, task_id).unwrap();
        assert_eq!(saved.title, "Fix sink");
        assert_eq!(saved.priority, Priority::High);
        assert_eq!(saved.status, Status::InProgress);
        assert_eq!(saved.subtasks.len(), 1);
        assert!(saved.updated_at.is_some());
    }

    #[test]
    fn test_duplicate_submit_blocked() {
        let (mut store, board_id, task_id) = setup();
        let mut editor = TaskEditor::open(&store, board_id, task_id).unwrap();
        editor.draft.title = "Once".into();
        let version = store.version();

        assert!(editor.begin_save().is_some());
        assert!(editor.begin_save().is_none());
        assert!(editor.finish_save(&mut store).unwrap());
        assert!(!editor.finish_save(&mut store).unwrap());
        assert_eq!(store.version(), version + 1);
    }

    #[test]
    fn test_save_after_task_deleted() {
        let (mut store, board_id, task_id) = setup();
        let mut editor = TaskEditor::open(&store, board_id, task_id).unwrap();
        store.delete_task(board_id, task_id).unwrap();
        editor.begin_save();
        assert!(!editor.finish_save(&mut store).unwrap());
        assert!(!editor.is_saving());
        assert!(TaskEditor::open(&store, board_id, task_id).is_none());
    }
}
