/// Local filesystem key-value store.
///
/// Keeps one file per key inside a data directory with:
/// - SHA-256 file names (first 12 hex chars of the key, plus `.json`)
/// - Atomic writes (write to .tmp, fsync, rename)
/// - Content hashing so rewriting an unchanged value skips the disk
/// - Mutex-guarded writes per key
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use super::{KeyValueStore, StorageError};

pub struct LocalStore {
    dir: PathBuf,
    /// Per-key write mutex to prevent concurrent modification
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// key -> SHA-256 of the last value read or written
    content_hashes: Mutex<HashMap<String, String>>,
}

impl LocalStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("[taskdeck.storage.local] Opened store at {}", dir.display());
        Ok(Self {
            dir,
            write_locks: Mutex::new(HashMap::new()),
            content_hashes: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic file name for a key: SHA-256 first 12 hex chars.
    pub fn file_name_for_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let result = hasher.finalize();
        format!("{}.json", hex::encode(&result[..6]))
    }

    pub fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(Self::file_name_for_key(key))
    }

    fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn get_write_lock(&self, key: &str) -> Result<Arc<Mutex<()>>, StorageError> {
        let mut locks = self.write_locks.lock().map_err(poisoned)?;
        Ok(locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    fn remember_hash(&self, key: &str, content: &str) -> Result<(), StorageError> {
        self.content_hashes
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), Self::content_hash(content));
        Ok(())
    }

    /// Atomic write with fsync: write to .tmp, fsync, rename, fsync directory.
    /// Refuses to write empty content over a non-empty file.
    fn atomic_write(path: &Path, content: &str) -> Result<(), std::io::Error> {
        if content.trim().is_empty() {
            if let Ok(existing) = fs::read_to_string(path) {
                if !existing.trim().is_empty() {
                    return Err(std::io::Error::new(
                        ErrorKind::InvalidInput,
                        "Refusing to overwrite non-empty value with empty content",
                    ));
                }
            }
        }

        let tmp_path = path.with_extension("taskdeck.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;

        if let Some(dir) = path.parent() {
            if let Ok(d) = fs::File::open(dir) {
                let _ = d.sync_all();
            }
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("local store lock poisoned".to_string())
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for_key(key)) {
            Ok(content) => {
                self.remember_hash(key, &content)?;
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let lock = self.get_write_lock(key)?;
        let _guard = lock.lock().map_err(poisoned)?;

        let path = self.path_for_key(key);
        let hash = Self::content_hash(value);
        let unchanged = self
            .content_hashes
            .lock()
            .map_err(poisoned)?
            .get(key)
            .map_or(false, |h| *h == hash);
        if unchanged && path.exists() {
            log::debug!("[taskdeck.storage.local] {} unchanged, skipping write", key);
            return Ok(());
        }

        Self::atomic_write(&path, value)?;
        self.remember_hash(key, value)?;
        log::debug!(
            "[taskdeck.storage.local] Wrote {} ({} bytes) to {}",
            key,
            value.len(),
            path.display()
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let lock = self.get_write_lock(key)?;
        let _guard = lock.lock().map_err(poisoned)?;

        self.content_hashes.lock().map_err(poisoned)?.remove(key);
        match fs::remove_file(self.path_for_key(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
