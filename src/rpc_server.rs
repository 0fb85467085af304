//! WebGlass RPC server — JSON-RPC over stdin/stdout for embedding hosts.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"navigate", "params":{"url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"navigated", "data":{...}} pushed between responses.
//!
//! Runs the core against headless views; the embedded engine is only
//! available through the `webglass` binary.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use crossbeam_channel::Receiver;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use webglass::app::App;
use webglass::managers::state_store::StateStore;
use webglass::managers::tab_registry::TabRegistryTrait;
use webglass::router;
use webglass::types::events::{UiEvent, ViewEvent};
use webglass::view::headless::HeadlessViewFactory;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn data_dir() -> Option<PathBuf> {
    std::env::var("WEBGLASS_DATA_DIR").ok().map(PathBuf::from)
}

/// Applies queued engine events, then pushes the resulting UI events out
/// as NDJSON event lines.
fn pump_events(app: &Mutex<App>, view_rx: &Receiver<ViewEvent>, ui_rx: &Receiver<UiEvent>) {
    if let Ok(mut a) = app.lock() {
        while let Ok(event) = view_rx.try_recv() {
            a.tab_registry.process_view_event(event);
        }
    }
    let mut stdout = io::stdout();
    while let Ok(event) = ui_rx.try_recv() {
        let line = json!({"event": event.channel(), "data": event.payload()});
        let _ = writeln!(stdout, "{}", line);
    }
    let _ = stdout.flush();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let (view_tx, view_rx) = crossbeam_channel::unbounded::<ViewEvent>();
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded::<UiEvent>();

    let store = StateStore::new(data_dir());
    let factory = Box::new(HeadlessViewFactory::new(view_tx));
    let app = Mutex::new(App::new(store, factory, ui_tx));
    if let Ok(mut a) = app.lock() {
        a.startup();
    }
    pump_events(&app, &view_rx, &ui_rx);

    // Signal ready
    let ready = json!({"event":"ready","version":env!("CARGO_PKG_VERSION")});
    println!("{}", ready);
    let _ = io::stdout().flush();

    // Max 200 requests per second.
    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                println!("{}", json!({"id":null,"error":format!("parse error: {}",e)}));
                let _ = io::stdout().flush();
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            println!("{}", json!({"id": id, "error": "rate limit exceeded"}));
            let _ = io::stdout().flush();
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let result = if router::is_capture_method(method) {
            dispatch_capture(method, &params).await
        } else {
            router::handle_method(&app, method, &params)
        };

        let response = match result {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        println!("{}", response);
        let _ = io::stdout().flush();

        pump_events(&app, &view_rx, &ui_rx);
    }

    if let Ok(mut a) = app.lock() {
        a.shutdown();
    };
}

#[cfg(feature = "capture")]
async fn dispatch_capture(method: &str, params: &Value) -> Result<Value, String> {
    router::handle_capture(method, params).await
}

#[cfg(not(feature = "capture"))]
async fn dispatch_capture(_method: &str, _params: &Value) -> Result<Value, String> {
    Err("capture support not built".to_string())
}
