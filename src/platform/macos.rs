// macOS keeps per-user application data under ~/Library/Application Support.

use std::env;
use std::path::PathBuf;

pub fn get_data_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join("Library")
        .join("Application Support")
        .join("WebGlass")
}
