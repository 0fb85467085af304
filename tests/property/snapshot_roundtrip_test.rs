//! Property-based tests for snapshot serialization.
//!
//! Any snapshot written through the store is read back identical, and
//! the wire format keeps its published field names.

use proptest::prelude::*;
use tempfile::TempDir;

use webglass::managers::state_store::{StateStore, StateStoreTrait};
use webglass::types::snapshot::{HistoryEntry, Snapshot};
use webglass::types::tab::{RenderMode, Tab};

fn arb_url() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
        .prop_map(|host| format!("https://{}.example/", host))
}

fn arb_tab() -> impl Strategy<Value = Tab> {
    (
        "[a-z0-9]{4,12}",
        "[ -~]{0,24}",
        arb_url(),
        prop::bool::ANY,
    )
        .prop_map(|(id, title, url, external)| Tab {
            id: format!("tab-{}", id),
            title,
            url,
            render_mode: if external {
                RenderMode::ExternalDriver
            } else {
                RenderMode::Native
            },
        })
}

fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    (
        prop::collection::vec((arb_url(), 0i64..2_000_000_000_000), 0..8),
        arb_url(),
        prop::collection::vec(arb_tab(), 0..5),
    )
        .prop_map(|(history, last_url, tabs)| Snapshot {
            history: history
                .into_iter()
                .map(|(url, ts)| HistoryEntry { url, ts })
                .collect(),
            last_url,
            tabs,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn store_roundtrip_preserves_snapshot(snapshot in arb_snapshot()) {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(Some(dir.path().to_path_buf()));
        store.save(&snapshot).unwrap();
        prop_assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn json_roundtrip_preserves_snapshot(snapshot in arb_snapshot()) {
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, snapshot);
    }

    #[test]
    fn wire_format_keeps_published_names(snapshot in arb_snapshot()) {
        let json = serde_json::to_string(&snapshot).unwrap();
        prop_assert!(json.contains("\"lastURL\""));
        prop_assert!(!json.contains("\"last_url\""));
        if !snapshot.tabs.is_empty() {
            prop_assert!(json.contains("\"renderMode\""));
        }
        if snapshot.tabs.iter().any(|t| t.render_mode == RenderMode::ExternalDriver) {
            prop_assert!(json.contains("\"external-driver\""));
        }
    }
}
