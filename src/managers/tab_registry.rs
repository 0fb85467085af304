//! Tab registry for WebGlass.
//!
//! Owns the ordered tab list, the rendering surface for each tab, and the
//! single active-tab pointer. Every tab id present in the list has exactly
//! one view and vice versa; operations that could break that pairing roll
//! back rather than leave it dangling. Mutations that change the persisted
//! session (open, close, navigation) write through the state store.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::managers::state_store::{StateStore, StateStoreTrait};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{StoreError, ViewError};
use crate::types::events::{UiEvent, ViewEvent};
use crate::types::snapshot::{HistoryEntry, Snapshot};
use crate::types::tab::{RenderMode, Tab};
use crate::view::{content_bounds, View, ViewFactory, Viewport};

/// Options for opening a tab. Defaults create a brand-new tab with a
/// generated id; session restore supplies the persisted identity instead.
#[derive(Default)]
pub struct OpenTabOptions {
    pub id: Option<String>,
    pub title: Option<String>,
    pub render_mode: Option<RenderMode>,
    /// Restored tabs do not rewrite the snapshot they were read from.
    pub restore: bool,
}

/// Trait defining tab registry operations.
pub trait TabRegistryTrait {
    fn restore_session(&mut self);
    fn open_tab(&mut self, url: &str, options: OpenTabOptions) -> Result<Tab, ViewError>;
    fn close_tab(&mut self, tab_id: &str);
    fn set_active_tab(&mut self, tab_id: &str);
    fn navigate_tab(&mut self, tab_id: &str, url: &str);
    fn reload(&mut self, tab_id: &str);
    fn go_back(&mut self, tab_id: &str);
    fn go_forward(&mut self, tab_id: &str);
    fn open_devtools(&mut self, tab_id: &str);
    fn close_devtools(&mut self, tab_id: &str);
    fn view_source(&mut self, tab_id: &str) -> Option<String>;
    fn process_view_event(&mut self, event: ViewEvent);
    fn set_viewport(&mut self, viewport: Viewport);
    fn resize_visible_view(&mut self);
    fn flush(&mut self) -> Result<(), StoreError>;
}

pub struct TabRegistry {
    tabs: Vec<Tab>,
    views: HashMap<String, Box<dyn View>>,
    active_tab_id: Option<String>,
    visible_view_id: Option<String>,
    viewport: Option<Viewport>,
    snapshot: Snapshot,
    store: StateStore,
    factory: Box<dyn ViewFactory>,
    ui_events: Sender<UiEvent>,
}

impl TabRegistry {
    /// Creates a registry over `store`, reading the persisted snapshot.
    /// Call `restore_session` to materialize the persisted tabs.
    pub fn new(
        store: StateStore,
        factory: Box<dyn ViewFactory>,
        ui_events: Sender<UiEvent>,
    ) -> Self {
        let snapshot = store.load();
        TabRegistry {
            tabs: Vec::new(),
            views: HashMap::new(),
            active_tab_id: None,
            visible_view_id: None,
            viewport: None,
            snapshot,
            store,
            factory,
            ui_events,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        let id = self.active_tab_id.as_deref()?;
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn find_tab(&self, tab_id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    pub fn last_url(&self) -> &str {
        &self.snapshot.last_url
    }

    /// Whether a rendering surface exists for `tab_id`.
    pub fn has_view(&self, tab_id: &str) -> bool {
        self.views.contains_key(tab_id)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.snapshot.history
    }

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.store.load_bookmarks()
    }

    /// Adds or removes the bookmark for `url`; returns whether it is
    /// bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, url: &str, title: &str) -> Result<bool, StoreError> {
        self.store.toggle_bookmark(url, title)
    }

    /// Writes the current session through the store. Failures are logged
    /// rather than propagated so a full disk cannot wedge tab operations.
    fn persist(&mut self) {
        self.snapshot.tabs = self.tabs.clone();
        if let Err(e) = self.store.save(&self.snapshot) {
            warn!(error = %e, "failed to persist session snapshot");
        }
    }

    /// Makes the view for `tab_id` the one on screen, hiding whichever
    /// view was visible before and sizing it to the current viewport.
    fn show_view(&mut self, tab_id: &str) {
        if let Some(prev) = self.visible_view_id.take() {
            if prev != tab_id {
                if let Some(view) = self.views.get_mut(&prev) {
                    view.set_visible(false);
                }
            }
        }
        if let Some(view) = self.views.get_mut(tab_id) {
            if let Some(viewport) = self.viewport {
                view.set_bounds(content_bounds(viewport));
            }
            view.set_visible(true);
            self.visible_view_id = Some(tab_id.to_string());
        }
    }
}

impl TabRegistryTrait for TabRegistry {
    /// Reopens the tabs from the persisted snapshot, or a single tab at the
    /// last visited URL when none were saved. The first tab becomes active
    /// so the active pointer is never unset while tabs exist.
    fn restore_session(&mut self) {
        let saved = self.snapshot.tabs.clone();
        if saved.is_empty() {
            let url = self.snapshot.last_url.clone();
            if let Err(e) = self.open_tab(&url, OpenTabOptions::default()) {
                warn!(error = %e, "failed to open initial tab");
            }
        } else {
            info!(count = saved.len(), "restoring saved session");
            for tab in saved {
                let options = OpenTabOptions {
                    id: Some(tab.id),
                    title: Some(tab.title),
                    render_mode: Some(tab.render_mode),
                    restore: true,
                };
                if let Err(e) = self.open_tab(&tab.url, options) {
                    warn!(error = %e, "failed to restore tab");
                }
            }
        }
        if let Some(first) = self.tabs.first().map(|t| t.id.clone()) {
            self.set_active_tab(&first);
        }
    }

    /// Creates a tab and its rendering surface, then starts loading `url`.
    /// If the surface cannot be created the tab record is removed again and
    /// the error returned. Navigation failure is logged but does not fail
    /// the open.
    fn open_tab(&mut self, url: &str, options: OpenTabOptions) -> Result<Tab, ViewError> {
        let id = options.id.unwrap_or_else(generate_tab_id);
        let tab = Tab {
            id: id.clone(),
            title: options.title.unwrap_or_else(|| "New Tab".to_string()),
            url: url.to_string(),
            render_mode: options.render_mode.unwrap_or_default(),
        };
        self.tabs.push(tab.clone());

        let mut view = match self.factory.create_view(&id) {
            Ok(view) => view,
            Err(e) => {
                self.tabs.retain(|t| t.id != id);
                return Err(e);
            }
        };
        if let Err(e) = view.load_url(url) {
            warn!(tab_id = %id, error = %e, "initial navigation failed");
        }
        self.views.insert(id.clone(), view);
        self.show_view(&id);

        debug!(tab_id = %id, url = %url, "opened tab");
        if !options.restore {
            self.persist();
        }
        Ok(tab)
    }

    /// Closes a tab and drops its view. Unknown ids are ignored. When the
    /// active tab is closed, the first remaining tab takes over; closing
    /// the last tab leaves no tab active.
    fn close_tab(&mut self, tab_id: &str) {
        let before = self.tabs.len();
        self.tabs.retain(|t| t.id != tab_id);
        if self.tabs.len() == before {
            return;
        }
        self.views.remove(tab_id);
        if self.visible_view_id.as_deref() == Some(tab_id) {
            self.visible_view_id = None;
        }
        if self.active_tab_id.as_deref() == Some(tab_id) {
            self.active_tab_id = None;
            if let Some(next) = self.tabs.first().map(|t| t.id.clone()) {
                self.set_active_tab(&next);
            }
        }
        debug!(tab_id = %tab_id, remaining = self.tabs.len(), "closed tab");
        self.persist();
    }

    /// Activates a tab and brings its view on screen. Unknown ids are
    /// ignored and the current activation stands.
    fn set_active_tab(&mut self, tab_id: &str) {
        let Some(tab) = self.find_tab(tab_id).cloned() else {
            warn!(tab_id = %tab_id, "ignoring switch to unknown tab");
            return;
        };
        self.active_tab_id = Some(tab.id.clone());
        self.show_view(&tab.id);
        let _ = self.ui_events.send(UiEvent::TabActivated {
            id: tab.id,
            url: tab.url,
            title: tab.title,
        });
    }

    /// Starts loading `url` in the tab's view and records the intended
    /// address immediately; the committed navigation event refines it.
    fn navigate_tab(&mut self, tab_id: &str, url: &str) {
        let Some(view) = self.views.get_mut(tab_id) else {
            return;
        };
        if let Err(e) = view.load_url(url) {
            warn!(tab_id = %tab_id, error = %e, "navigation failed");
        }
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
            tab.url = url.to_string();
        }
        self.snapshot.last_url = url.to_string();
        self.persist();
    }

    fn reload(&mut self, tab_id: &str) {
        if let Some(view) = self.views.get_mut(tab_id) {
            view.reload();
        }
    }

    fn go_back(&mut self, tab_id: &str) {
        if let Some(view) = self.views.get_mut(tab_id) {
            view.go_back();
        }
    }

    fn go_forward(&mut self, tab_id: &str) {
        if let Some(view) = self.views.get_mut(tab_id) {
            view.go_forward();
        }
    }

    fn open_devtools(&mut self, tab_id: &str) {
        if let Some(view) = self.views.get_mut(tab_id) {
            view.open_devtools();
        }
    }

    fn close_devtools(&mut self, tab_id: &str) {
        if let Some(view) = self.views.get_mut(tab_id) {
            view.close_devtools();
        }
    }

    fn view_source(&mut self, tab_id: &str) -> Option<String> {
        let view = self.views.get_mut(tab_id)?;
        match view.view_source() {
            Ok(html) => Some(html),
            Err(e) => {
                debug!(tab_id = %tab_id, error = %e, "page source not available");
                None
            }
        }
    }

    /// Applies an engine event to registry state and republishes it to the
    /// UI stream. Committed navigations update the tab record, the last
    /// visited URL, and the history log, and are written through; title
    /// changes update only the in-memory tab record.
    fn process_view_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Navigated { tab_id, url } => {
                if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
                    tab.url = url.clone();
                }
                self.snapshot.last_url = url.clone();
                self.snapshot.history.push(HistoryEntry {
                    url: url.clone(),
                    ts: now_ms(),
                });
                self.persist();
                let _ = self.ui_events.send(UiEvent::Navigated { tab_id, url });
            }
            ViewEvent::TitleChanged { tab_id, title } => {
                if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
                    tab.title = title.clone();
                }
                let _ = self.ui_events.send(UiEvent::TitleUpdated { tab_id, title });
            }
            ViewEvent::ConsoleMessage {
                tab_id,
                level,
                msg,
                line,
                source_id,
            } => {
                let _ = self.ui_events.send(UiEvent::ConsoleMessage {
                    tab_id,
                    level,
                    msg,
                    line,
                    source_id,
                });
            }
            ViewEvent::SourceCaptured { tab_id, html } => {
                let _ = self.ui_events.send(UiEvent::SourceCaptured { tab_id, html });
            }
        }
    }

    /// Records the window content size and resizes the visible view.
    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.resize_visible_view();
    }

    /// Re-applies the content bounds to the visible view. A no-op without
    /// a recorded viewport or a visible view.
    fn resize_visible_view(&mut self) {
        let Some(viewport) = self.viewport else {
            return;
        };
        if let Some(id) = self.visible_view_id.clone() {
            if let Some(view) = self.views.get_mut(&id) {
                view.set_bounds(content_bounds(viewport));
            }
        }
    }

    /// Final write-through, for shutdown paths where a failure should be
    /// surfaced to the caller.
    fn flush(&mut self) -> Result<(), StoreError> {
        self.snapshot.tabs = self.tabs.clone();
        self.store.save(&self.snapshot)
    }
}

/// Tab ids combine a millisecond timestamp with a random suffix so ids
/// remain unique across restarts of the same session.
fn generate_tab_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("tab-{}-{}", now_ms(), suffix)
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
