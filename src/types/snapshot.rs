use serde::{Deserialize, Serialize};

use super::tab::Tab;

/// URL loaded into a tab when nothing else is known.
pub const DEFAULT_START_URL: &str = "https://www.google.com/";

/// A single visited-page record in the append-only navigation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    /// Unix milliseconds at the time the navigation completed.
    pub ts: i64,
}

/// The persisted application state: navigation history, last visited URL,
/// and a structural projection of the live tab list.
///
/// `tabs` is re-derived from the registry on every tab mutation, so the
/// on-disk copy never drifts further than one unsaved mutation behind memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(rename = "lastURL", default = "default_last_url")]
    pub last_url: String,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

fn default_last_url() -> String {
    DEFAULT_START_URL.to_string()
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            last_url: default_last_url(),
            tabs: Vec::new(),
        }
    }
}
