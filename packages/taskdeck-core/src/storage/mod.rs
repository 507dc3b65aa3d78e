pub mod local;
pub mod memory;

/// String-keyed persistence used by the board store and the user directory.
/// Implementations: LocalStore (one file per key), MemoryStore (in-process).
///
/// Values are opaque strings; callers own the encoding (see `payload`).
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored payload: {0}")]
    Payload(#[from] serde_json::Error),
}
