// WebGlass platform abstraction
// Provides the per-user data directory for Windows, macOS, and Linux.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific user-data directory for WebGlass.
/// The snapshot and bookmark files live here.
///
/// - **Linux**: `~/.local/share/webglass` (or `$XDG_DATA_HOME/webglass`)
/// - **macOS**: `~/Library/Application Support/WebGlass`
/// - **Windows**: `%APPDATA%/WebGlass`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
