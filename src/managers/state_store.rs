//! Persisted state store for WebGlass.
//!
//! Two JSON documents in the per-user data directory: `webglass.json`
//! holds the session snapshot (history, last URL, open tabs) and
//! `bookmarks.json` holds the bookmark list. Writes always replace the
//! whole document; reads fall back to defaults when a file is missing
//! or unreadable so a damaged store never prevents startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::platform;
use crate::types::bookmark::Bookmark;
use crate::types::errors::StoreError;
use crate::types::snapshot::Snapshot;

const SNAPSHOT_FILE: &str = "webglass.json";
const BOOKMARKS_FILE: &str = "bookmarks.json";

/// Trait defining state-store operations.
pub trait StateStoreTrait {
    fn load(&self) -> Snapshot;
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
    fn load_bookmarks(&self) -> Vec<Bookmark>;
    fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError>;
    fn toggle_bookmark(&self, url: &str, title: &str) -> Result<bool, StoreError>;
}

/// JSON-file-backed state store.
pub struct StateStore {
    data_dir: PathBuf,
}

impl StateStore {
    /// Creates a store rooted at `data_dir`, or at the platform user-data
    /// directory when `None`.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        StateStore {
            data_dir: data_dir.unwrap_or_else(platform::get_data_dir),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    fn bookmarks_path(&self) -> PathBuf {
        self.data_dir.join(BOOKMARKS_FILE)
    }

    fn write_json(&self, path: &Path, json: String) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::write(path, json).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl StateStoreTrait for StateStore {
    /// Loads the session snapshot, returning defaults when the file is
    /// missing or does not parse.
    fn load(&self) -> Snapshot {
        let path = self.snapshot_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Snapshot::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable snapshot");
                Snapshot::default()
            }
        }
    }

    /// Writes the full snapshot, creating the data directory if needed.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.write_json(&self.snapshot_path(), json)
    }

    /// Loads the bookmark list, returning an empty list when the file is
    /// missing or does not parse.
    fn load_bookmarks(&self) -> Vec<Bookmark> {
        let path = self.bookmarks_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(bookmarks) => bookmarks,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable bookmarks");
                Vec::new()
            }
        }
    }

    fn save_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(bookmarks)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.write_json(&self.bookmarks_path(), json)
    }

    /// Adds a bookmark for `url`, or removes it when one already exists.
    /// Matching is by exact URL. Returns whether the URL is bookmarked
    /// after the call.
    fn toggle_bookmark(&self, url: &str, title: &str) -> Result<bool, StoreError> {
        let mut bookmarks = self.load_bookmarks();
        let before = bookmarks.len();
        bookmarks.retain(|b| b.url != url);
        let added = bookmarks.len() == before;
        if added {
            bookmarks.push(Bookmark {
                url: url.to_string(),
                title: title.to_string(),
                ts: now_ms(),
            });
        }
        self.save_bookmarks(&bookmarks)?;
        Ok(added)
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
