// Windows keeps per-user application data under %APPDATA%.

use std::env;
use std::path::PathBuf;

pub fn get_data_dir() -> PathBuf {
    let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(appdata).join("WebGlass")
}
