//! Property-based tests for the tab registry.
//!
//! For any sequence of open, close, and switch operations, the registry
//! keeps exactly one rendering surface per tab, and the active pointer
//! names an existing tab exactly when tabs exist.

use crossbeam_channel::Receiver;
use proptest::prelude::*;
use tempfile::TempDir;

use webglass::managers::state_store::StateStore;
use webglass::managers::tab_registry::{OpenTabOptions, TabRegistry, TabRegistryTrait};
use webglass::types::events::ViewEvent;
use webglass::view::headless::HeadlessViewFactory;

/// Operations the shells perform on the registry.
#[derive(Debug, Clone)]
enum RegistryOp {
    Open(u8),
    Close(usize),
    Switch(usize),
}

fn arb_ops() -> impl Strategy<Value = Vec<RegistryOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0..100u8).prop_map(RegistryOp::Open),
            2 => (0..20usize).prop_map(RegistryOp::Close),
            2 => (0..20usize).prop_map(RegistryOp::Switch),
        ],
        1..50,
    )
}

fn build_registry(dir: &TempDir) -> (TabRegistry, Receiver<ViewEvent>) {
    let store = StateStore::new(Some(dir.path().to_path_buf()));
    let (view_tx, view_rx) = crossbeam_channel::unbounded();
    let (ui_tx, _ui_rx) = crossbeam_channel::unbounded();
    let registry = TabRegistry::new(store, Box::new(HeadlessViewFactory::new(view_tx)), ui_tx);
    (registry, view_rx)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn tab_view_pairing_and_active_pointer_hold(ops in arb_ops()) {
        let dir = TempDir::new().unwrap();
        let (mut registry, view_rx) = build_registry(&dir);

        for op in &ops {
            match op {
                RegistryOp::Open(n) => {
                    let url = format!("https://site{}.example/", n);
                    let tab = registry.open_tab(&url, OpenTabOptions::default()).unwrap();
                    registry.set_active_tab(&tab.id);
                }
                RegistryOp::Close(idx) => {
                    let ids: Vec<String> =
                        registry.tabs().iter().map(|t| t.id.clone()).collect();
                    if !ids.is_empty() {
                        registry.close_tab(&ids[idx % ids.len()]);
                    }
                }
                RegistryOp::Switch(idx) => {
                    let ids: Vec<String> =
                        registry.tabs().iter().map(|t| t.id.clone()).collect();
                    if !ids.is_empty() {
                        registry.set_active_tab(&ids[idx % ids.len()]);
                    }
                }
            }

            while let Ok(event) = view_rx.try_recv() {
                registry.process_view_event(event);
            }

            // One surface per tab, and nothing else.
            prop_assert_eq!(registry.view_count(), registry.tabs().len());
            for tab in registry.tabs() {
                prop_assert!(registry.has_view(&tab.id), "tab {} has no view", tab.id);
            }

            // The active pointer names an existing tab exactly when tabs exist.
            match registry.active_tab_id() {
                Some(active) => {
                    prop_assert!(registry.tabs().iter().any(|t| t.id == active));
                }
                None => prop_assert!(registry.tabs().is_empty()),
            }
        }
    }
}
