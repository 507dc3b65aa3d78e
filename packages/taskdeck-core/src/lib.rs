//! Board and task state for a kanban-style project tracker.
//!
//! `store::BoardStore` owns the signed-in user's boards and persists them
//! through a `storage::KeyValueStore` after every mutation. `analytics`
//! derives dashboard figures from a snapshot, `reorder` applies drag-and-drop
//! moves, `editor` holds task form state and `auth` manages local accounts.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod editor;
pub mod ids;
pub mod payload;
pub mod reorder;
pub mod storage;
pub mod store;
pub mod types;
