//! Headless capture bridge.
//!
//! Renders a URL outside the shell's own views, through one of two
//! interchangeable drivers: a DevTools-protocol browser launched on
//! demand, or a WebDriver session against an already-running server.
//! Driver failures come back as `CaptureError` values; nothing in this
//! module panics on a missing or broken driver.

mod cdp;
mod webdriver;

use std::env;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::types::errors::CaptureError;

/// Upper bound on waiting for a page to finish loading.
pub const NAV_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Which backend renders the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureDriver {
    /// Spawns a browser and drives it over the DevTools protocol.
    /// Screenshots capture the full page height.
    Cdp,
    /// Connects to a WebDriver server (chromedriver, geckodriver, selenium).
    /// W3C WebDriver screenshots cover the viewport only, so pages taller
    /// than the session window are clipped with this driver.
    WebDriver,
}

impl CaptureDriver {
    /// Maps a caller-supplied driver tag to a backend. Unrecognized tags
    /// fall back to WebDriver.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "cdp" | "puppeteer" => CaptureDriver::Cdp,
            _ => CaptureDriver::WebDriver,
        }
    }
}

/// The WebDriver endpoint, overridable via `WEBGLASS_WEBDRIVER_URL`.
pub fn webdriver_url() -> String {
    env::var("WEBGLASS_WEBDRIVER_URL").unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string())
}

/// Renders `url` and writes a PNG screenshot to a temp file, returning
/// its path.
pub async fn screenshot(url: &str, driver: CaptureDriver) -> Result<PathBuf, CaptureError> {
    let out_path = temp_screenshot_path();
    info!(url = %url, driver = ?driver, path = %out_path.display(), "capturing screenshot");
    match driver {
        CaptureDriver::Cdp => cdp::screenshot(url, &out_path).await?,
        CaptureDriver::WebDriver => webdriver::screenshot(url, &out_path).await?,
    }
    Ok(out_path)
}

/// Renders `url` and returns the serialized document markup.
pub async fn page_html(url: &str, driver: CaptureDriver) -> Result<String, CaptureError> {
    info!(url = %url, driver = ?driver, "capturing page html");
    match driver {
        CaptureDriver::Cdp => cdp::page_html(url).await,
        CaptureDriver::WebDriver => webdriver::page_html(url).await,
    }
}

fn temp_screenshot_path() -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    env::temp_dir().join(format!("webglass-{}.png", ts))
}
