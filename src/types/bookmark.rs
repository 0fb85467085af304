use serde::{Deserialize, Serialize};

/// Represents a saved bookmark. Uniqueness is by URL; the list is
/// mutated only by the toggle operation (add if absent, remove if present).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub url: String,
    pub title: String,
    /// Unix milliseconds at the time the bookmark was added.
    pub ts: i64,
}
