//! WebGlass — a minimal multi-tab browser shell.
//!
//! This library crate exposes all modules for use by the binaries and
//! integration tests.

pub mod app;
pub mod managers;
pub mod platform;
pub mod router;
pub mod types;
pub mod view;

#[cfg(feature = "capture")]
pub mod capture;

#[cfg(feature = "gui")]
pub mod ui;
