/// Drag-and-drop between board columns.
///
/// The UI reports where a dragged task was dropped. The drop target is a
/// column index into `Status::COLUMNS`; the task moves to that status and
/// its completion follows. Any status can move to any other.
use serde::{Deserialize, Serialize};

use crate::storage::StorageError;
use crate::store::BoardStore;
use crate::types::{BoardId, Status, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub task_id: TaskId,
    /// Destination column; `None` when dropped outside every column.
    pub destination: Option<usize>,
}

pub fn status_for_column(index: usize) -> Option<Status> {
    Status::from_column(index)
}

/// Move the dragged task. Returns false when the drop is ignored.
pub fn apply_drag_end(store: &mut BoardStore, board_id: BoardId, event: &DragEnd) -> Result<bool, StorageError> {
    let Some(status) = event.destination.and_then(status_for_column) else {
        log::debug!(
            "[taskdeck.reorder] Drop of task {} outside any column ignored",
            event.task_id
        );
        return Ok(false);
    };
    let Some(task) = store.task(board_id, event.task_id).cloned() else {
        return Ok(false);
    };
    store.edit_task(board_id, task.with_status(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::types::Task;
    use std::sync::Arc;

    fn setup() -> (BoardStore, BoardId, Task) {
        let mut store = BoardStore::open(Arc::new(MemoryStore::new()), "u1").unwrap();
        let board = store.add_board("Sprint").unwrap().unwrap();
        let task = store.add_task(board.id, Status::ToDo).unwrap().unwrap();
        (store, board.id, task)
    }

    #[test]
    fn test_drop_on_done_column() {
        let (mut store, board_id, task) = setup();
        let moved = apply_drag_end(
            &mut store,
            board_id,
            &DragEnd { task_id: task.id, destination: Some(2) },
        )
        .unwrap();
        assert!(moved);
        let saved = store.task(board_id, task.id).unwrap();
        assert_eq!(saved.status, Status::Done);
        assert_eq!(saved.status_normalized(), "done");
        assert!(saved.completed());

        let json = serde_json::to_value(saved).unwrap();
        assert_eq!(json["statusNormalized"], "done");
        assert_eq!(json["completed"], true);
    }

    #[test]
    fn test_done_task_can_reopen() {
        let (mut store, board_id, task) = setup();
        apply_drag_end(&mut store, board_id, &DragEnd { task_id: task.id, destination: Some(2) }).unwrap();
        apply_drag_end(&mut store, board_id, &DragEnd { task_id: task.id, destination: Some(1) }).unwrap();
        let saved = store.task(board_id, task.id).unwrap();
        assert_eq!(saved.status, Status::InProgress);
        assert!(!saved.completed());
    }

    #[test]
    fn test_drop_without_destination_is_ignored() {
        let (mut store, board_id, task) = setup();
        let before = store.snapshot();
        let moved = apply_drag_end(
            &mut store,
            board_id,
            &DragEnd { task_id: task.id, destination: None },
        )
        .unwrap();
        assert!(!moved);
        assert_eq!(store.boards(), before.boards.as_slice());
        assert_eq!(store.version(), before.version);
    }

    #[test]
    fn test_drop_unknown_task_or_column_is_ignored() {
        let (mut store, board_id, task) = setup();
        let version = store.version();
        assert!(!apply_drag_end(&mut store, board_id, &DragEnd { task_id: task.id + 1, destination: Some(1) }).unwrap());
        assert!(!apply_drag_end(&mut store, board_id, &DragEnd { task_id: task.id, destination: Some(3) }).unwrap());
        assert_eq!(store.version(), version);
    }

    #[test]
    fn test_status_for_column() {
        assert_eq!(status_for_column(0), Some(Status::ToDo));
        assert_eq!(status_for_column(1), Some(Status::InProgress));
        assert_eq!(status_for_column(2), Some(Status::Done));
        assert_eq!(status_for_column(9), None);
    }
}
