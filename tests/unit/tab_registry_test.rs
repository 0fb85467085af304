//! Unit tests for the tab registry.
//!
//! Covers session restore, the active-tab pointer, tab/view pairing,
//! persist-on-mutation, and engine event processing.

use crossbeam_channel::Receiver;
use tempfile::TempDir;

use webglass::managers::state_store::{StateStore, StateStoreTrait};
use webglass::managers::tab_registry::{OpenTabOptions, TabRegistry, TabRegistryTrait};
use webglass::types::errors::ViewError;
use webglass::types::events::{UiEvent, ViewEvent};
use webglass::types::snapshot::Snapshot;
use webglass::types::tab::{RenderMode, Tab};
use webglass::view::headless::HeadlessViewFactory;
use webglass::view::{View, ViewFactory, Viewport};

struct Harness {
    registry: TabRegistry,
    view_rx: Receiver<ViewEvent>,
    ui_rx: Receiver<UiEvent>,
    _dir: TempDir,
}

fn setup() -> Harness {
    setup_with_snapshot(None)
}

fn setup_with_snapshot(snapshot: Option<Snapshot>) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(Some(dir.path().to_path_buf()));
    if let Some(snapshot) = snapshot {
        store.save(&snapshot).unwrap();
    }
    let (view_tx, view_rx) = crossbeam_channel::unbounded();
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let registry = TabRegistry::new(store, Box::new(HeadlessViewFactory::new(view_tx)), ui_tx);
    Harness {
        registry,
        view_rx,
        ui_rx,
        _dir: dir,
    }
}

/// Feeds queued engine events back into the registry, as the shells do.
fn drain(h: &mut Harness) {
    while let Ok(event) = h.view_rx.try_recv() {
        h.registry.process_view_event(event);
    }
}

fn saved_tab(id: &str, url: &str) -> Tab {
    Tab {
        id: id.to_string(),
        title: id.to_string(),
        url: url.to_string(),
        render_mode: RenderMode::Native,
    }
}

/// A factory whose surfaces can never be created.
struct BrokenFactory;

impl ViewFactory for BrokenFactory {
    fn create_view(&mut self, _tab_id: &str) -> Result<Box<dyn View>, ViewError> {
        Err(ViewError::CreateFailed("engine unavailable".to_string()))
    }
}

// ─── Opening tabs ───

#[test]
fn test_open_tab_pairs_tab_with_view() {
    let mut h = setup();
    let tab = h
        .registry
        .open_tab("https://example.com/", OpenTabOptions::default())
        .unwrap();
    assert!(tab.id.starts_with("tab-"));
    assert_eq!(h.registry.tabs().len(), 1);
    assert_eq!(h.registry.view_count(), 1);
    assert!(h.registry.has_view(&tab.id));
}

#[test]
fn test_open_tab_generates_unique_ids() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    let b = h.registry.open_tab("https://b.example/", OpenTabOptions::default()).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_open_tab_does_not_steal_activation() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    h.registry.set_active_tab(&a.id);
    h.registry.open_tab("https://b.example/", OpenTabOptions::default()).unwrap();
    assert_eq!(h.registry.active_tab_id(), Some(a.id.as_str()));
}

#[test]
fn test_failed_view_creation_rolls_back_tab() {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(Some(dir.path().to_path_buf()));
    let (ui_tx, _ui_rx) = crossbeam_channel::unbounded::<UiEvent>();
    let mut registry = TabRegistry::new(store, Box::new(BrokenFactory), ui_tx);

    let result = registry.open_tab("https://example.com/", OpenTabOptions::default());
    assert!(result.is_err());
    assert!(registry.tabs().is_empty());
    assert_eq!(registry.view_count(), 0);
}

// ─── Session restore ───

#[test]
fn test_restore_reopens_saved_tabs_and_activates_first() {
    let snapshot = Snapshot {
        history: Vec::new(),
        last_url: "https://b.example/".to_string(),
        tabs: vec![
            saved_tab("tab-one", "https://a.example/"),
            saved_tab("tab-two", "https://b.example/"),
        ],
    };
    let mut h = setup_with_snapshot(Some(snapshot));
    h.registry.restore_session();

    let ids: Vec<&str> = h.registry.tabs().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["tab-one", "tab-two"]);
    assert_eq!(h.registry.active_tab_id(), Some("tab-one"));
    assert_eq!(h.registry.view_count(), 2);
}

#[test]
fn test_restore_with_empty_snapshot_opens_last_url() {
    let snapshot = Snapshot {
        history: Vec::new(),
        last_url: "https://remembered.example/".to_string(),
        tabs: Vec::new(),
    };
    let mut h = setup_with_snapshot(Some(snapshot));
    h.registry.restore_session();

    assert_eq!(h.registry.tabs().len(), 1);
    assert_eq!(h.registry.tabs()[0].url, "https://remembered.example/");
    assert!(h.registry.active_tab_id().is_some());
}

// ─── Closing and switching ───

#[test]
fn test_close_active_tab_activates_first_remaining() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    let b = h.registry.open_tab("https://b.example/", OpenTabOptions::default()).unwrap();
    h.registry.set_active_tab(&b.id);

    h.registry.close_tab(&b.id);
    assert_eq!(h.registry.active_tab_id(), Some(a.id.as_str()));
    assert!(!h.registry.has_view(&b.id));
}

#[test]
fn test_close_inactive_tab_keeps_activation() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    let b = h.registry.open_tab("https://b.example/", OpenTabOptions::default()).unwrap();
    h.registry.set_active_tab(&a.id);

    h.registry.close_tab(&b.id);
    assert_eq!(h.registry.active_tab_id(), Some(a.id.as_str()));
}

#[test]
fn test_close_last_tab_leaves_nothing_active() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    h.registry.set_active_tab(&a.id);

    h.registry.close_tab(&a.id);
    assert!(h.registry.tabs().is_empty());
    assert_eq!(h.registry.active_tab_id(), None);
    assert_eq!(h.registry.view_count(), 0);

    // Resizing with no visible view must be absorbed silently.
    h.registry.set_viewport(Viewport {
        width: 1024,
        height: 768,
    });
    h.registry.resize_visible_view();
}

#[test]
fn test_resize_visible_view_is_noop_safe() {
    let mut h = setup();

    // No viewport recorded yet.
    h.registry.resize_visible_view();

    let tab = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    h.registry.set_viewport(Viewport {
        width: 800,
        height: 600,
    });
    h.registry.resize_visible_view();

    // The resize path must not disturb the registry itself.
    assert_eq!(h.registry.tabs().len(), 1);
    assert!(h.registry.has_view(&tab.id));
}

#[test]
fn test_close_unknown_tab_is_noop() {
    let mut h = setup();
    h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    h.registry.close_tab("tab-never-existed");
    assert_eq!(h.registry.tabs().len(), 1);
}

#[test]
fn test_switch_to_unknown_tab_keeps_current() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    h.registry.set_active_tab(&a.id);
    h.registry.set_active_tab("tab-never-existed");
    assert_eq!(h.registry.active_tab_id(), Some(a.id.as_str()));
}

#[test]
fn test_switch_emits_tab_activated_event() {
    let mut h = setup();
    let a = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    while h.ui_rx.try_recv().is_ok() {}
    h.registry.set_active_tab(&a.id);

    let event = h.ui_rx.try_recv().unwrap();
    match event {
        UiEvent::TabActivated { id, url, .. } => {
            assert_eq!(id, a.id);
            assert_eq!(url, "https://a.example/");
        }
        other => panic!("expected TabActivated, got {:?}", other),
    }
}

// ─── Engine events ───

#[test]
fn test_navigation_updates_tab_history_and_store() {
    let mut h = setup();
    let tab = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    drain(&mut h);
    h.registry.navigate_tab(&tab.id, "https://b.example/page");
    drain(&mut h);

    assert_eq!(h.registry.tabs()[0].url, "https://b.example/page");
    assert_eq!(h.registry.last_url(), "https://b.example/page");
    assert!(h
        .registry
        .history()
        .iter()
        .any(|e| e.url == "https://b.example/page"));

    // Written through: a fresh store sees the same session.
    let reloaded = StateStore::new(Some(h._dir.path().to_path_buf())).load();
    assert_eq!(reloaded.last_url, "https://b.example/page");
    assert_eq!(reloaded.tabs.len(), 1);
    assert_eq!(reloaded.tabs[0].url, "https://b.example/page");
}

#[test]
fn test_title_change_updates_memory_only() {
    let mut h = setup();
    let tab = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    drain(&mut h);
    let persisted_before = StateStore::new(Some(h._dir.path().to_path_buf())).load();

    h.registry.process_view_event(ViewEvent::TitleChanged {
        tab_id: tab.id.clone(),
        title: "Fancy Title".to_string(),
    });

    assert_eq!(h.registry.tabs()[0].title, "Fancy Title");
    let persisted_after = StateStore::new(Some(h._dir.path().to_path_buf())).load();
    assert_eq!(persisted_before, persisted_after);
}

#[test]
fn test_console_messages_are_forwarded() {
    let mut h = setup();
    let tab = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    while h.ui_rx.try_recv().is_ok() {}

    h.registry.process_view_event(ViewEvent::ConsoleMessage {
        tab_id: tab.id.clone(),
        level: 2,
        msg: "deprecated API".to_string(),
        line: 42,
        source_id: "https://a.example/app.js".to_string(),
    });

    match h.ui_rx.try_recv().unwrap() {
        UiEvent::ConsoleMessage { tab_id, level, line, .. } => {
            assert_eq!(tab_id, tab.id);
            assert_eq!(level, 2);
            assert_eq!(line, 42);
        }
        other => panic!("expected ConsoleMessage, got {:?}", other),
    }
}

// ─── Navigation commands on views ───

#[test]
fn test_back_and_forward_replay_history() {
    let mut h = setup();
    let tab = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    h.registry.navigate_tab(&tab.id, "https://b.example/");
    drain(&mut h);
    assert_eq!(h.registry.last_url(), "https://b.example/");

    h.registry.go_back(&tab.id);
    drain(&mut h);
    assert_eq!(h.registry.last_url(), "https://a.example/");

    h.registry.go_forward(&tab.id);
    drain(&mut h);
    assert_eq!(h.registry.last_url(), "https://b.example/");
}

#[test]
fn test_commands_on_unknown_tab_are_noops() {
    let mut h = setup();
    h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    drain(&mut h);

    h.registry.navigate_tab("tab-gone", "https://x.example/");
    h.registry.reload("tab-gone");
    h.registry.go_back("tab-gone");
    drain(&mut h);
    assert_eq!(h.registry.last_url(), "https://a.example/");
}

#[test]
fn test_view_source_unavailable_headless() {
    let mut h = setup();
    let tab = h.registry.open_tab("https://a.example/", OpenTabOptions::default()).unwrap();
    assert_eq!(h.registry.view_source(&tab.id), None);
}
