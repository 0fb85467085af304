//! Embedded-engine rendering surfaces.
//!
//! Each tab gets its own child webview positioned below the toolbar.
//! Engine callbacks translate into `ViewEvent`s on the shared channel;
//! every send is followed by a user event so the tao loop wakes up and
//! drains the channel on its own thread.

use std::rc::Rc;

use crossbeam_channel::Sender;
use serde_json::Value;
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use tracing::warn;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

use crate::types::errors::ViewError;
use crate::types::events::ViewEvent;
use crate::ui::webview_app::ShellEvent;
use crate::view::{content_bounds, View, ViewBounds, ViewFactory, Viewport};

/// Hooks the page's console and error reporting so messages surface in
/// the shell. Runs before any page script.
const CONSOLE_CAPTURE_JS: &str = r#"
(function () {
  if (window.__wgConsoleHooked) return;
  window.__wgConsoleHooked = true;
  var post = function (payload) {
    try { window.ipc.postMessage(JSON.stringify(payload)); } catch (_) {}
  };
  var levels = { debug: 0, log: 1, info: 1, warn: 2, error: 3 };
  Object.keys(levels).forEach(function (name) {
    var original = console[name];
    console[name] = function () {
      var args = Array.prototype.slice.call(arguments);
      post({
        kind: 'console',
        level: levels[name],
        msg: args.map(String).join(' '),
        line: 0,
        source: location.href
      });
      if (original) original.apply(console, args);
    };
  });
  window.addEventListener('error', function (e) {
    post({
      kind: 'console',
      level: 3,
      msg: String(e.message),
      line: e.lineno || 0,
      source: e.filename || location.href
    });
  });
})();
"#;

pub struct WryViewFactory {
    window: Rc<Window>,
    events: Sender<ViewEvent>,
    proxy: EventLoopProxy<ShellEvent>,
}

impl WryViewFactory {
    pub fn new(
        window: Rc<Window>,
        events: Sender<ViewEvent>,
        proxy: EventLoopProxy<ShellEvent>,
    ) -> Self {
        WryViewFactory {
            window,
            events,
            proxy,
        }
    }

    fn current_content_bounds(&self) -> ViewBounds {
        let size: tao::dpi::LogicalSize<f64> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        content_bounds(Viewport {
            width: size.width as u32,
            height: size.height as u32,
        })
    }
}

impl ViewFactory for WryViewFactory {
    fn create_view(&mut self, tab_id: &str) -> Result<Box<dyn View>, ViewError> {
        let bounds = self.current_content_bounds();

        let ipc_events = self.events.clone();
        let ipc_proxy = self.proxy.clone();
        let ipc_tab = tab_id.to_string();

        let title_events = self.events.clone();
        let title_proxy = self.proxy.clone();
        let title_tab = tab_id.to_string();

        let load_events = self.events.clone();
        let load_proxy = self.proxy.clone();
        let load_tab = tab_id.to_string();

        let webview = WebViewBuilder::new()
            .with_bounds(to_rect(bounds))
            .with_devtools(true)
            .with_initialization_script(CONSOLE_CAPTURE_JS)
            .with_ipc_handler(move |msg: wry::http::Request<String>| {
                if let Some(event) = parse_ipc(&ipc_tab, msg.body()) {
                    let _ = ipc_events.send(event);
                    let _ = ipc_proxy.send_event(ShellEvent::Pump);
                }
            })
            .with_document_title_changed_handler(move |title| {
                let _ = title_events.send(ViewEvent::TitleChanged {
                    tab_id: title_tab.clone(),
                    title,
                });
                let _ = title_proxy.send_event(ShellEvent::Pump);
            })
            .with_on_page_load_handler(move |event, url| {
                if matches!(event, PageLoadEvent::Finished) {
                    let _ = load_events.send(ViewEvent::Navigated {
                        tab_id: load_tab.clone(),
                        url,
                    });
                    let _ = load_proxy.send_event(ShellEvent::Pump);
                }
            })
            .build(&*self.window)
            .map_err(|e| ViewError::CreateFailed(e.to_string()))?;

        Ok(Box::new(WryView { webview }))
    }
}

/// Decodes a message posted by the injected page scripts.
fn parse_ipc(tab_id: &str, body: &str) -> Option<ViewEvent> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("kind").and_then(|v| v.as_str())? {
        "console" => Some(ViewEvent::ConsoleMessage {
            tab_id: tab_id.to_string(),
            level: value.get("level").and_then(|v| v.as_i64()).unwrap_or(1),
            msg: value
                .get("msg")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            line: value.get("line").and_then(|v| v.as_i64()).unwrap_or(0),
            source_id: value
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        }),
        "source" => Some(ViewEvent::SourceCaptured {
            tab_id: tab_id.to_string(),
            html: value
                .get("html")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        }),
        _ => None,
    }
}

pub struct WryView {
    webview: WebView,
}

impl View for WryView {
    fn load_url(&mut self, url: &str) -> Result<(), ViewError> {
        self.webview
            .load_url(url)
            .map_err(|e| ViewError::LoadFailed(e.to_string()))
    }

    fn reload(&mut self) {
        let _ = self.webview.evaluate_script("location.reload()");
    }

    fn go_back(&mut self) {
        let _ = self.webview.evaluate_script("history.back()");
    }

    fn go_forward(&mut self) {
        let _ = self.webview.evaluate_script("history.forward()");
    }

    fn open_devtools(&mut self) {
        self.webview.open_devtools();
    }

    fn close_devtools(&mut self) {
        self.webview.close_devtools();
    }

    /// The engine can only hand the document back through script, so the
    /// markup arrives later as a `SourceCaptured` event; the synchronous
    /// answer is always unavailable here.
    fn view_source(&mut self) -> Result<String, ViewError> {
        let script = "window.ipc.postMessage(JSON.stringify({kind:'source',\
             html: document.documentElement ? document.documentElement.outerHTML : ''}))";
        if let Err(e) = self.webview.evaluate_script(script) {
            warn!(error = %e, "source extraction script failed");
        }
        Err(ViewError::SourceUnavailable(
            "delivered as a source-captured event".to_string(),
        ))
    }

    fn set_bounds(&mut self, bounds: ViewBounds) {
        if let Err(e) = self.webview.set_bounds(to_rect(bounds)) {
            warn!(error = %e, "failed to resize view");
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if let Err(e) = self.webview.set_visible(visible) {
            warn!(error = %e, "failed to toggle view visibility");
        }
    }
}

fn to_rect(bounds: ViewBounds) -> Rect {
    Rect {
        position: wry::dpi::Position::Logical(LogicalPosition::new(
            bounds.x as f64,
            bounds.y as f64,
        )),
        size: wry::dpi::Size::Logical(LogicalSize::new(
            bounds.width as f64,
            bounds.height as f64,
        )),
    }
}
