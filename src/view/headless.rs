//! In-memory rendering surfaces.
//!
//! Used by the RPC binary and the test suite. Each view keeps its own
//! per-tab history list and reports navigations on the shared event
//! channel the same way the embedded engine does, so the registry and
//! router behave identically under both backends.

use crossbeam_channel::Sender;
use tracing::debug;

use crate::types::errors::ViewError;
use crate::types::events::ViewEvent;
use crate::view::{View, ViewBounds, ViewFactory};

pub struct HeadlessViewFactory {
    events: Sender<ViewEvent>,
}

impl HeadlessViewFactory {
    pub fn new(events: Sender<ViewEvent>) -> Self {
        HeadlessViewFactory { events }
    }
}

impl ViewFactory for HeadlessViewFactory {
    fn create_view(&mut self, tab_id: &str) -> Result<Box<dyn View>, ViewError> {
        Ok(Box::new(HeadlessView {
            tab_id: tab_id.to_string(),
            events: self.events.clone(),
            entries: Vec::new(),
            index: 0,
            devtools_open: false,
            visible: false,
            bounds: None,
        }))
    }
}

pub struct HeadlessView {
    tab_id: String,
    events: Sender<ViewEvent>,
    entries: Vec<String>,
    index: usize,
    devtools_open: bool,
    visible: bool,
    bounds: Option<ViewBounds>,
}

impl HeadlessView {
    fn emit_navigated(&self) {
        let url = match self.entries.get(self.index) {
            Some(u) => u.clone(),
            None => return,
        };
        let _ = self.events.send(ViewEvent::Navigated {
            tab_id: self.tab_id.clone(),
            url: url.clone(),
        });
        let _ = self.events.send(ViewEvent::TitleChanged {
            tab_id: self.tab_id.clone(),
            title: host_of(&url),
        });
    }
}

impl View for HeadlessView {
    fn load_url(&mut self, url: &str) -> Result<(), ViewError> {
        if !self.entries.is_empty() {
            // A fresh load discards any forward history.
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(url.to_string());
        self.index = self.entries.len() - 1;
        self.emit_navigated();
        Ok(())
    }

    fn reload(&mut self) {
        self.emit_navigated();
    }

    fn go_back(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.emit_navigated();
        }
    }

    fn go_forward(&mut self) {
        if self.index + 1 < self.entries.len() {
            self.index += 1;
            self.emit_navigated();
        }
    }

    fn open_devtools(&mut self) {
        self.devtools_open = true;
        debug!(tab_id = %self.tab_id, "devtools opened");
    }

    fn close_devtools(&mut self) {
        self.devtools_open = false;
    }

    fn view_source(&mut self) -> Result<String, ViewError> {
        // No live document to serialize without a rendering engine.
        Err(ViewError::SourceUnavailable(
            "no document in headless mode".to_string(),
        ))
    }

    fn set_bounds(&mut self, bounds: ViewBounds) {
        self.bounds = Some(bounds);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Best-effort display title for a URL, mirroring what an engine would
/// report before the page delivers its real title.
fn host_of(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}
