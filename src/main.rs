//! WebGlass — a minimal multi-tab browser shell.
//!
//! Entry point: opens the shell window with the embedded engine. When
//! built without the `gui` feature, runs a short headless walkthrough of
//! the core instead.

#[cfg(feature = "gui")]
fn main() {
    webglass::ui::webview_app::run();
}

#[cfg(not(feature = "gui"))]
fn main() {
    use std::sync::Mutex;

    use serde_json::json;
    use tracing_subscriber::EnvFilter;

    use webglass::app::App;
    use webglass::managers::state_store::StateStore;
    use webglass::managers::tab_registry::TabRegistryTrait;
    use webglass::router;
    use webglass::view::headless::HeadlessViewFactory;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("WebGlass v{} (headless)", env!("CARGO_PKG_VERSION"));

    let (view_tx, view_rx) = crossbeam_channel::unbounded();
    let (ui_tx, ui_rx) = crossbeam_channel::unbounded();
    let store = StateStore::new(None);
    let app = Mutex::new(App::new(
        store,
        Box::new(HeadlessViewFactory::new(view_tx)),
        ui_tx,
    ));
    app.lock().unwrap().startup();

    let commands = [
        ("new-tab", json!({"url": "example.com"})),
        ("navigate", json!({"url": "rust book"})),
        ("get-state", json!({})),
    ];
    for (method, params) in commands {
        match router::handle_method(&app, method, &params) {
            Ok(result) => println!("{} -> {}", method, result),
            Err(e) => println!("{} -> error: {}", method, e),
        }
        let mut a = app.lock().unwrap();
        while let Ok(event) = view_rx.try_recv() {
            a.tab_registry.process_view_event(event);
        }
    }
    while let Ok(event) = ui_rx.try_recv() {
        println!("event {}: {}", event.channel(), event.payload());
    }

    app.lock().unwrap().shutdown();
}
