//! Event types flowing between the rendering engine, the tab registry,
//! and the UI shell.
//!
//! Views never capture registry state in their callbacks: each event carries
//! the owning tab id as data, bound at view-creation time. The registry is
//! the single point that turns `ViewEvent`s into `UiEvent`s for the shell.

use serde_json::{json, Value};

/// Raw events emitted by a rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A navigation in the view finished and the page is committed.
    Navigated { tab_id: String, url: String },
    /// The document title changed.
    TitleChanged { tab_id: String, title: String },
    /// The page wrote to its console.
    ConsoleMessage {
        tab_id: String,
        level: i64,
        msg: String,
        line: i64,
        source_id: String,
    },
    /// Serialized document markup, delivered asynchronously after a
    /// source-extraction request.
    SourceCaptured { tab_id: String, html: String },
}

/// Events pushed to the single UI consumer. No acknowledgment is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Navigated { tab_id: String, url: String },
    TitleUpdated { tab_id: String, title: String },
    ConsoleMessage {
        tab_id: String,
        level: i64,
        msg: String,
        line: i64,
        source_id: String,
    },
    TabActivated { id: String, url: String, title: String },
    SourceCaptured { tab_id: String, html: String },
    /// Host-level shortcut: focus the address bar.
    FocusAddress,
    /// Host-level shortcut: show the current page's source.
    ShortcutViewSource,
}

impl UiEvent {
    /// The event channel name, as seen by the UI shell.
    pub fn channel(&self) -> &'static str {
        match self {
            UiEvent::Navigated { .. } => "navigated",
            UiEvent::TitleUpdated { .. } => "title-updated",
            UiEvent::ConsoleMessage { .. } => "console-message",
            UiEvent::TabActivated { .. } => "tab-activated",
            UiEvent::SourceCaptured { .. } => "source-captured",
            UiEvent::FocusAddress => "focus-address",
            UiEvent::ShortcutViewSource => "shortcut-view-source",
        }
    }

    /// The JSON payload sent alongside the channel name.
    pub fn payload(&self) -> Value {
        match self {
            UiEvent::Navigated { tab_id, url } => json!({ "tabId": tab_id, "url": url }),
            UiEvent::TitleUpdated { tab_id, title } => json!({ "tabId": tab_id, "title": title }),
            UiEvent::ConsoleMessage {
                tab_id,
                level,
                msg,
                line,
                source_id,
            } => json!({
                "tabId": tab_id,
                "level": level,
                "msg": msg,
                "line": line,
                "sourceId": source_id,
            }),
            UiEvent::TabActivated { id, url, title } => {
                json!({ "id": id, "url": url, "title": title })
            }
            UiEvent::SourceCaptured { tab_id, html } => {
                json!({ "tabId": tab_id, "html": html })
            }
            UiEvent::FocusAddress | UiEvent::ShortcutViewSource => json!({}),
        }
    }
}
