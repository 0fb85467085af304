//! Shell UI for WebGlass (requires the `gui` feature).

pub mod webview_app;
pub mod wry_view;
