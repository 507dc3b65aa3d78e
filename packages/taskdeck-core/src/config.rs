/// Configuration for Taskdeck.
/// Reads config.json from ~/.config/taskdeck/config.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analytics::{AnalyticsOptions, DEFAULT_FALLING_BEHIND_RATIO, DEFAULT_UPCOMING_LIMIT};
use crate::storage::local::LocalStore;
use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskdeckConfig {
    /// Where the local store keeps its files. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
    #[serde(default = "default_falling_behind_ratio")]
    pub falling_behind_ratio: f64,
}

fn default_upcoming_limit() -> usize {
    DEFAULT_UPCOMING_LIMIT
}

fn default_falling_behind_ratio() -> f64 {
    DEFAULT_FALLING_BEHIND_RATIO
}

impl Default for TaskdeckConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            upcoming_limit: default_upcoming_limit(),
            falling_behind_ratio: default_falling_behind_ratio(),
        }
    }
}

impl TaskdeckConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn analytics(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            upcoming_limit: self.upcoming_limit,
            falling_behind_ratio: self.falling_behind_ratio,
        }
    }

    pub fn open_storage(&self) -> Result<LocalStore, StorageError> {
        LocalStore::open(self.data_dir())
    }
}

/// Default config path: ~/.config/taskdeck/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdeck")
        .join("config.json")
}

/// Default data directory: ~/.local/share/taskdeck
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdeck")
}

/// Load config from path. Returns defaults if the file is missing or invalid.
pub fn load_config(path: &Path) -> TaskdeckConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!(
                "[taskdeck.config] Failed to parse config {}: {}",
                path.display(),
                e
            );
            TaskdeckConfig::default()
        }),
        Err(_) => {
            log::info!(
                "[taskdeck.config] No config at {}, using defaults",
                path.display()
            );
            TaskdeckConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStore;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.json"));
        assert_eq!(config, TaskdeckConfig::default());
        assert_eq!(config.analytics(), AnalyticsOptions::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"upcomingLimit": 10}"#).unwrap();
        let config = load_config(&path);
        assert_eq!(config.upcoming_limit, 10);
        assert_eq!(config.falling_behind_ratio, DEFAULT_FALLING_BEHIND_RATIO);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_config(&path), TaskdeckConfig::default());
    }

    #[test]
    fn test_open_storage_in_configured_dir() {
        let dir = TempDir::new().unwrap();
        let config = TaskdeckConfig {
            data_dir: Some(dir.path().join("data")),
            ..TaskdeckConfig::default()
        };
        let store = config.open_storage().unwrap();
        store.set("k", "v").unwrap();
        assert!(dir.path().join("data").is_dir());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
