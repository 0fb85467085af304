//! Command router for WebGlass.
//!
//! Dispatches the commands the UI (or the RPC server) issues to the
//! managers via the `App` struct. Extracted from the shells so it can be
//! unit-tested independently. Tab-scoped commands resolve their target
//! once on entry: an explicit `tabId` parameter wins, otherwise the
//! active tab is used. Commands aimed at a tab that no longer exists are
//! absorbed silently, since a click can race a tab closing.

use std::sync::Mutex;

use serde_json::{json, Value};
use tracing::debug;

use crate::app::App;
use crate::managers::tab_registry::{OpenTabOptions, TabRegistryTrait};

/// Address-bar input that does not look like a URL becomes a web search.
const SEARCH_URL_PREFIX: &str = "https://www.google.com/search?q=";

/// Sentinel returned by `view-source` when no markup could be extracted.
/// Kept as an in-band value so the command itself never fails.
const SOURCE_ERROR_SENTINEL: &str = "<error>";

/// Dispatch a command to the appropriate manager.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// Capture commands do not go through here; they run on the async side
/// (see `handle_capture`) because they never touch `App`.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"ok": true})),

        "navigate" => {
            let input = params
                .get("url")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string();
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if input.is_empty() {
                // Nothing typed: report the remembered URL, load nothing.
                return Ok(json!({"url": a.tab_registry.last_url()}));
            }
            let url = normalize_input(&input);
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.navigate_tab(&tab_id, &url);
            }
            Ok(json!({"url": url}))
        }

        "reload" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.reload(&tab_id);
            }
            Ok(Value::Null)
        }
        "go-back" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.go_back(&tab_id);
            }
            Ok(Value::Null)
        }
        "go-forward" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.go_forward(&tab_id);
            }
            Ok(Value::Null)
        }
        "open-devtools" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.open_devtools(&tab_id);
            }
            Ok(Value::Null)
        }
        "close-devtools" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.close_devtools(&tab_id);
            }
            Ok(Value::Null)
        }

        "view-source" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let html = resolve_tab_id(&a, params)
                .and_then(|tab_id| a.tab_registry.view_source(&tab_id))
                .unwrap_or_else(|| SOURCE_ERROR_SENTINEL.to_string());
            Ok(Value::String(html))
        }

        "get-state" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let tabs = serde_json::to_value(a.tab_registry.tabs()).map_err(|e| e.to_string())?;
            let history =
                serde_json::to_value(a.tab_registry.history()).map_err(|e| e.to_string())?;
            let bookmarks =
                serde_json::to_value(a.tab_registry.bookmarks()).map_err(|e| e.to_string())?;
            Ok(json!({
                "tabs": tabs,
                "activeTabId": a.tab_registry.active_tab_id(),
                "lastURL": a.tab_registry.last_url(),
                "history": history,
                "bookmarks": bookmarks,
            }))
        }

        "toggle-bookmark" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let (url, title) = match params.get("url").and_then(|v| v.as_str()) {
                Some(url) => (
                    url.to_string(),
                    params
                        .get("title")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                ),
                None => match a.tab_registry.active_tab() {
                    Some(tab) => (tab.url.clone(), tab.title.clone()),
                    None => return Err("no tab to bookmark".to_string()),
                },
            };
            let bookmarked = a
                .tab_registry
                .toggle_bookmark(&url, &title)
                .map_err(|e| e.to_string())?;
            let bookmarks =
                serde_json::to_value(a.tab_registry.bookmarks()).map_err(|e| e.to_string())?;
            Ok(json!({"bookmarked": bookmarked, "bookmarks": bookmarks}))
        }

        "new-tab" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let url = match params.get("url").and_then(|v| v.as_str()) {
                Some(input) if !input.trim().is_empty() => normalize_input(input.trim()),
                _ => a.tab_registry.last_url().to_string(),
            };
            let tab = a
                .tab_registry
                .open_tab(&url, OpenTabOptions::default())
                .map_err(|e| e.to_string())?;
            a.tab_registry.set_active_tab(&tab.id);
            serde_json::to_value(&tab).map_err(|e| e.to_string())
        }

        "close-tab" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = resolve_tab_id(&a, params) {
                a.tab_registry.close_tab(&tab_id);
            }
            let tabs = serde_json::to_value(a.tab_registry.tabs()).map_err(|e| e.to_string())?;
            Ok(json!({"tabs": tabs}))
        }

        "switch-tab" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            if let Some(tab_id) = params.get("tabId").and_then(|v| v.as_str()) {
                a.tab_registry.set_active_tab(tab_id);
            }
            Ok(json!({"active": a.tab_registry.active_tab_id()}))
        }

        _ => {
            debug!(method = %method, "unknown command");
            Err(format!("unknown method: {}", method))
        }
    }
}

/// Runs a capture command on the headless drivers. Driver failures are
/// reported as an in-band `{"error": ...}` value rather than a transport
/// error, so a dead driver never tears down the caller.
#[cfg(feature = "capture")]
pub async fn handle_capture(method: &str, params: &Value) -> Result<Value, String> {
    use crate::capture::{self, CaptureDriver};

    let url = params
        .get("url")
        .and_then(|v| v.as_str())
        .ok_or("missing url")?;
    let driver = params
        .get("engine")
        .or_else(|| params.get("driver"))
        .and_then(|v| v.as_str())
        .map(CaptureDriver::from_tag)
        .unwrap_or(CaptureDriver::WebDriver);

    match method {
        "render-screenshot" => match capture::screenshot(url, driver).await {
            Ok(path) => Ok(json!({"path": path.to_string_lossy()})),
            Err(e) => Ok(json!({"error": e.to_string()})),
        },
        // "get-html-playwright" is the historical name; both run on
        // whichever driver the caller picked.
        "capture-html" | "get-html-playwright" => match capture::page_html(url, driver).await {
            Ok(html) => Ok(json!({"html": html})),
            Err(e) => Ok(json!({"error": e.to_string()})),
        },
        _ => Err(format!("unknown method: {}", method)),
    }
}

/// Returns true for a method that `handle_capture` serves.
pub fn is_capture_method(method: &str) -> bool {
    matches!(
        method,
        "render-screenshot" | "capture-html" | "get-html-playwright"
    )
}

/// Resolves the tab a command targets: explicit `tabId` parameter first,
/// active tab otherwise.
fn resolve_tab_id(app: &App, params: &Value) -> Option<String> {
    if let Some(id) = params.get("tabId").and_then(|v| v.as_str()) {
        return Some(id.to_string());
    }
    app.tab_registry.active_tab_id().map(|s| s.to_string())
}

/// Turns raw address-bar input into a loadable URL.
///
/// Input with a dot and no whitespace is treated as an address and given
/// an `http://` scheme when it has none; anything else becomes a search
/// query. Already-schemed input passes through untouched.
pub fn normalize_input(input: &str) -> String {
    let has_scheme = input.starts_with("http://") || input.starts_with("https://");
    let has_whitespace = input.contains(char::is_whitespace);
    let looks_like_address = has_scheme || input.contains('.');

    if !looks_like_address || (has_whitespace && !has_scheme) {
        return format!("{}{}", SEARCH_URL_PREFIX, encode_query_component(input));
    }
    if has_scheme {
        input.to_string()
    } else {
        format!("http://{}", input)
    }
}

/// Percent-encodes a search query. Unreserved characters pass through,
/// everything else (including spaces) is `%XX`-escaped.
fn encode_query_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
