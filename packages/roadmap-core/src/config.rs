/// Configuration for the roadmap board.
/// Reads config.json from ~/.config/roadmap-board/config.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::BoardError;
use crate::repository::{BoardRepository, Latency, DEFAULT_STORAGE_KEY};
use crate::storage::local::LocalStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Key the board snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory for `LocalStore`. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_fetch_latency_ms")]
    pub fetch_latency_ms: u64,
    #[serde(default = "default_save_latency_ms")]
    pub save_latency_ms: u64,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_fetch_latency_ms() -> u64 {
    300
}

fn default_save_latency_ms() -> u64 {
    200
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            data_dir: None,
            fetch_latency_ms: default_fetch_latency_ms(),
            save_latency_ms: default_save_latency_ms(),
        }
    }
}

impl BoardConfig {
    pub fn latency(&self) -> Latency {
        Latency {
            fetch: Duration::from_millis(self.fetch_latency_ms),
            save: Duration::from_millis(self.save_latency_ms),
        }
    }

    /// Configured data dir, or ~/.local/share/roadmap-board (or platform equivalent).
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roadmap-board")
        })
    }

    /// Repository over a `LocalStore` in the resolved data dir.
    pub fn open_local(&self) -> Result<BoardRepository<LocalStore>, BoardError> {
        let store = LocalStore::new(self.resolved_data_dir())?;
        Ok(BoardRepository::new(store)
            .with_key(&self.storage_key)
            .with_latency(self.latency()))
    }
}

/// Default config path: ~/.config/roadmap-board/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roadmap-board")
        .join("config.json")
}

/// Load config from path. Returns default if the file is missing or malformed.
pub fn load_config(path: &Path) -> BoardConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("[roadmap.config] Failed to parse config {}: {}", path.display(), e);
            BoardConfig::default()
        }),
        Err(_) => {
            log::info!("[roadmap.config] No config at {}, using defaults", path.display());
            BoardConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("nope.json"));
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.storage_key, "ui-architect-kanban-rq");
        assert_eq!(config.latency().fetch, Duration::from_millis(300));
        assert_eq!(config.latency().save, Duration::from_millis(200));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "fetch_latency_ms": 0, "data_dir": "/tmp/boards" }"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.fetch_latency_ms, 0);
        assert_eq!(config.save_latency_ms, 200);
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/boards"));
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path), BoardConfig::default());
    }

    #[test]
    fn test_open_local_uses_key_and_dir() {
        let dir = TempDir::new().unwrap();
        let config = BoardConfig {
            storage_key: "my-board".to_string(),
            data_dir: Some(dir.path().join("data")),
            fetch_latency_ms: 0,
            save_latency_ms: 0,
        };
        let repo = config.open_local().unwrap();
        assert_eq!(repo.key(), "my-board");
        assert_eq!(repo.store().dir(), dir.path().join("data").as_path());
    }

    #[test]
    fn test_default_config_path_name() {
        assert!(default_config_path().ends_with("roadmap-board/config.json"));
    }
}
