//! WebGlass shell window.
//!
//! One tao window hosting the toolbar webview (top strip) and one child
//! webview per tab below it. The toolbar drives the core through the
//! command router; registry events flow back to it as script calls. The
//! toolbar is built after the restored tabs so it sits above them.

use std::rc::Rc;
use std::sync::Mutex;

use crossbeam_channel::Receiver;
use serde_json::{json, Value};
use tao::event::{ElementState, Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tao::keyboard::{KeyCode, ModifiersState};
use tao::window::WindowBuilder;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{Rect, WebView, WebViewBuilder};

use crate::app::App;
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::managers::state_store::StateStore;
use crate::managers::tab_registry::TabRegistryTrait;
use crate::router;
use crate::types::events::{UiEvent, ViewEvent};
use crate::ui::wry_view::WryViewFactory;
use crate::view::{Viewport, TOP_CHROME_INSET};

/// Events posted to the tao loop from webview callbacks and worker tasks.
pub enum ShellEvent {
    /// A command line from the toolbar: `{"method":..., "params":...}`.
    Command(String),
    /// Engine events are waiting on the channel.
    Pump,
    /// A capture finished on the async side.
    #[cfg(feature = "capture")]
    CaptureDone(Value),
}

/// Toolbar markup is inlined so the binary has no resource files to find
/// at runtime.
const TOOLBAR_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  html, body { margin: 0; height: 100%; font: 13px sans-serif; background: #2b2b2b; color: #ddd; overflow: hidden; }
  #tabs { display: flex; height: 34px; align-items: center; padding: 0 4px; gap: 4px; }
  .tab { padding: 4px 10px; background: #3c3c3c; border-radius: 6px 6px 0 0; cursor: pointer;
         max-width: 180px; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; }
  .tab.active { background: #555; }
  .tab .x { margin-left: 6px; color: #999; }
  #newtab { cursor: pointer; padding: 2px 8px; }
  #nav { display: flex; height: 38px; align-items: center; padding: 2px 6px; gap: 6px; }
  #nav button { background: #3c3c3c; color: #ddd; border: none; border-radius: 4px; padding: 5px 9px; cursor: pointer; }
  #address { flex: 1; background: #1e1e1e; color: #eee; border: 1px solid #444; border-radius: 4px; padding: 6px 10px; }
  #source { position: fixed; inset: 0; background: #1e1e1e; color: #9d9; display: none;
            white-space: pre-wrap; overflow: auto; padding: 8px; font-family: monospace; z-index: 10; }
</style>
</head>
<body>
<div id="tabs"><span id="newtab">+</span></div>
<div id="nav">
  <button id="back">&#8592;</button>
  <button id="fwd">&#8594;</button>
  <button id="reload">&#8635;</button>
  <input id="address" placeholder="Search or enter address">
  <button id="bookmark">&#9733;</button>
  <button id="src">&lt;/&gt;</button>
</div>
<div id="source"></div>
<script>
  var state = { tabs: [], activeTabId: null };
  function send(method, params) {
    window.ipc.postMessage(JSON.stringify({ method: method, params: params || {} }));
  }
  function renderTabs() {
    var strip = document.getElementById('tabs');
    strip.querySelectorAll('.tab').forEach(function (el) { el.remove(); });
    var plus = document.getElementById('newtab');
    state.tabs.forEach(function (tab) {
      var el = document.createElement('span');
      el.className = 'tab' + (tab.id === state.activeTabId ? ' active' : '');
      el.textContent = tab.title || tab.url;
      el.title = tab.url;
      el.onclick = function () { send('switch-tab', { tabId: tab.id }); };
      var x = document.createElement('span');
      x.className = 'x';
      x.textContent = '×';
      x.onclick = function (e) { e.stopPropagation(); send('close-tab', { tabId: tab.id }); };
      el.appendChild(x);
      strip.insertBefore(el, plus);
    });
  }
  window.__wgState = function (s) {
    state = s;
    renderTabs();
    var active = state.tabs.find(function (t) { return t.id === state.activeTabId; });
    if (active && document.activeElement !== document.getElementById('address')) {
      document.getElementById('address').value = active.url;
    }
  };
  window.__wgFocusAddress = function () {
    var input = document.getElementById('address');
    input.focus();
    input.select();
  };
  window.__wgEvent = function (channel, data) {
    if (channel === 'navigated' && data.tabId === state.activeTabId) {
      document.getElementById('address').value = data.url;
    } else if (channel === 'tab-activated') {
      document.getElementById('address').value = data.url;
    } else if (channel === 'focus-address') {
      window.__wgFocusAddress();
    } else if (channel === 'shortcut-view-source') {
      send('view-source', {});
    } else if (channel === 'source-captured') {
      var pane = document.getElementById('source');
      pane.textContent = data.html;
      pane.style.display = 'block';
    } else if (channel === 'console-message') {
      console.log('[page]', data.level, data.msg);
    }
  };
  document.getElementById('source').onclick = function () { this.style.display = 'none'; };
  document.getElementById('back').onclick = function () { send('go-back', {}); };
  document.getElementById('fwd').onclick = function () { send('go-forward', {}); };
  document.getElementById('reload').onclick = function () { send('reload', {}); };
  document.getElementById('bookmark').onclick = function () { send('toggle-bookmark', {}); };
  document.getElementById('src').onclick = function () { send('view-source', {}); };
  document.getElementById('newtab').onclick = function () { send('new-tab', {}); };
  document.getElementById('address').addEventListener('keydown', function (e) {
    if (e.key === 'Enter') send('navigate', { url: this.value });
  });
</script>
</body>
</html>
"#;

// ─── Main entry point ───

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let event_loop: EventLoop<ShellEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = Rc::new(
        WindowBuilder::new()
            .with_title("WebGlass")
            .with_inner_size(tao::dpi::LogicalSize::new(1280.0, 800.0))
            .build(&event_loop)
            .expect("failed to create window"),
    );

    let (view_tx, view_rx) = crossbeam_channel::unbounded::<ViewEvent>();
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded::<UiEvent>();

    let store = StateStore::new(None);
    let factory = Box::new(WryViewFactory::new(
        window.clone(),
        view_tx,
        proxy.clone(),
    ));
    let app = Mutex::new(App::new(store, factory, ui_tx));

    {
        let mut a = app.lock().expect("app lock");
        a.tab_registry.set_viewport(window_viewport(&window));
        a.startup();
    }

    let ipc_proxy = proxy.clone();
    let toolbar = WebViewBuilder::new()
        .with_bounds(toolbar_rect(window_viewport(&window).width))
        .with_html(TOOLBAR_HTML)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let _ = ipc_proxy.send_event(ShellEvent::Command(msg.body().clone()));
        })
        .build(&*window)
        .expect("failed to create toolbar");

    pump(&app, &view_rx, &ui_rx, &toolbar);
    push_state(&app, &toolbar);

    #[cfg(feature = "capture")]
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to start capture runtime");

    let mut modifiers = ModifiersState::default();
    let mut devtools_open = false;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    if let Ok(mut a) = app.lock() {
                        a.shutdown();
                    }
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(_) => {
                    let viewport = window_viewport(&window);
                    if let Ok(mut a) = app.lock() {
                        a.tab_registry.set_viewport(viewport);
                    }
                    if let Err(e) = toolbar.set_bounds(toolbar_rect(viewport.width)) {
                        warn!(error = %e, "failed to resize toolbar");
                    }
                }
                WindowEvent::ModifiersChanged(state) => {
                    modifiers = state;
                }
                WindowEvent::KeyboardInput { event: key, .. } => {
                    if key.state == ElementState::Pressed {
                        if let Some(chord) = chord(modifiers, key.physical_key) {
                            let action = app.lock().ok().and_then(|a| {
                                a.shortcut_manager
                                    .action_for_keys(&chord)
                                    .map(|s| s.to_string())
                            });
                            if let Some(action) = action {
                                run_action(&action, &app, &toolbar, &mut devtools_open);
                                pump(&app, &view_rx, &ui_rx, &toolbar);
                                push_state(&app, &toolbar);
                            }
                        }
                    }
                }
                _ => {}
            },

            Event::UserEvent(shell_event) => match shell_event {
                ShellEvent::Command(body) => {
                    let (method, params) = match parse_command(&body) {
                        Some(pair) => pair,
                        None => {
                            warn!(body = %body, "malformed toolbar command");
                            return;
                        }
                    };
                    if router::is_capture_method(&method) {
                        #[cfg(feature = "capture")]
                        {
                            let capture_proxy = proxy.clone();
                            runtime.spawn(async move {
                                let result = router::handle_capture(&method, &params).await;
                                let value = match result {
                                    Ok(v) => v,
                                    Err(e) => json!({"error": e}),
                                };
                                let _ = capture_proxy.send_event(ShellEvent::CaptureDone(value));
                            });
                        }
                        #[cfg(not(feature = "capture"))]
                        emit(&toolbar, "capture-done", &json!({"error": "capture support not built"}));
                    } else if let Err(e) = router::handle_method(&app, &method, &params) {
                        debug!(method = %method, error = %e, "command failed");
                    }
                    pump(&app, &view_rx, &ui_rx, &toolbar);
                    push_state(&app, &toolbar);
                }
                ShellEvent::Pump => {
                    pump(&app, &view_rx, &ui_rx, &toolbar);
                    push_state(&app, &toolbar);
                }
                #[cfg(feature = "capture")]
                ShellEvent::CaptureDone(value) => {
                    emit(&toolbar, "capture-done", &value);
                }
            },

            _ => {}
        }
    });
}

/// Applies queued engine events and forwards the resulting UI events to
/// the toolbar.
fn pump(
    app: &Mutex<App>,
    view_rx: &Receiver<ViewEvent>,
    ui_rx: &Receiver<UiEvent>,
    toolbar: &WebView,
) {
    if let Ok(mut a) = app.lock() {
        while let Ok(event) = view_rx.try_recv() {
            a.tab_registry.process_view_event(event);
        }
    }
    while let Ok(event) = ui_rx.try_recv() {
        emit(toolbar, event.channel(), &event.payload());
    }
}

/// Pushes the full tab list and active pointer into the toolbar.
fn push_state(app: &Mutex<App>, toolbar: &WebView) {
    let Ok(a) = app.lock() else { return };
    let state = json!({
        "tabs": a.tab_registry.tabs(),
        "activeTabId": a.tab_registry.active_tab_id(),
    });
    drop(a);
    let _ = toolbar.evaluate_script(&format!("window.__wgState({})", state));
}

fn emit(toolbar: &WebView, channel: &str, data: &Value) {
    let script = format!("window.__wgEvent({}, {})", json!(channel), data);
    let _ = toolbar.evaluate_script(&script);
}

fn parse_command(body: &str) -> Option<(String, Value)> {
    let value: Value = serde_json::from_str(body).ok()?;
    let method = value.get("method")?.as_str()?.to_string();
    let params = value.get("params").cloned().unwrap_or_else(|| json!({}));
    Some((method, params))
}

fn run_action(action: &str, app: &Mutex<App>, toolbar: &WebView, devtools_open: &mut bool) {
    match action {
        "focus-address" => emit(toolbar, UiEvent::FocusAddress.channel(), &json!({})),
        "view-source" => emit(toolbar, UiEvent::ShortcutViewSource.channel(), &json!({})),
        "toggle-devtools" => {
            let method = if *devtools_open {
                "close-devtools"
            } else {
                "open-devtools"
            };
            *devtools_open = !*devtools_open;
            if let Err(e) = router::handle_method(app, method, &json!({})) {
                debug!(error = %e, "devtools toggle failed");
            }
        }
        "new-tab" => {
            if let Err(e) = router::handle_method(app, "new-tab", &json!({})) {
                debug!(error = %e, "new tab failed");
            }
        }
        "close-tab" => {
            if let Err(e) = router::handle_method(app, "close-tab", &json!({})) {
                debug!(error = %e, "close tab failed");
            }
        }
        _ => {}
    }
}

fn window_viewport(window: &tao::window::Window) -> Viewport {
    let size: tao::dpi::LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
    Viewport {
        width: size.width as u32,
        height: size.height as u32,
    }
}

fn toolbar_rect(width: u32) -> Rect {
    Rect {
        position: wry::dpi::Position::Logical(LogicalPosition::new(0.0, 0.0)),
        size: wry::dpi::Size::Logical(LogicalSize::new(width as f64, TOP_CHROME_INSET as f64)),
    }
}

fn chord(modifiers: ModifiersState, key: KeyCode) -> Option<String> {
    let key_name = match key {
        KeyCode::KeyL => "L",
        KeyCode::KeyU => "U",
        KeyCode::KeyI => "I",
        KeyCode::KeyT => "T",
        KeyCode::KeyW => "W",
        _ => return None,
    };
    let mut chord = String::new();
    if modifiers.control_key() {
        chord.push_str("Ctrl+");
    }
    if modifiers.super_key() {
        chord.push_str("Cmd+");
    }
    if modifiers.shift_key() {
        chord.push_str("Shift+");
    }
    if modifiers.alt_key() {
        chord.push_str("Alt+");
    }
    if chord.is_empty() {
        return None;
    }
    chord.push_str(key_name);
    Some(chord)
}
