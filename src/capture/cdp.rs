//! DevTools-protocol capture driver.
//!
//! Launches a headless browser per request, performs the capture, and
//! always closes the browser before returning, success or not.

use std::fs;
use std::path::Path;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::capture::NAV_TIMEOUT;
use crate::types::errors::CaptureError;

pub async fn screenshot(url: &str, out_path: &Path) -> Result<(), CaptureError> {
    let (mut browser, handler_task) = launch().await?;
    let result = async {
        let page = open_page(&browser, url).await?;
        let bytes = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| CaptureError::Capture(e.to_string()))?;
        fs::write(out_path, bytes).map_err(|e| CaptureError::Io(e.to_string()))
    }
    .await;
    shutdown(&mut browser).await;
    handler_task.abort();
    result
}

pub async fn page_html(url: &str) -> Result<String, CaptureError> {
    let (mut browser, handler_task) = launch().await?;
    let result = async {
        let page = open_page(&browser, url).await?;
        page.content()
            .await
            .map_err(|e| CaptureError::Capture(e.to_string()))
    }
    .await;
    shutdown(&mut browser).await;
    handler_task.abort();
    result
}

/// Launches the browser and spawns the task that pumps protocol events.
async fn launch() -> Result<(Browser, tokio::task::JoinHandle<()>), CaptureError> {
    let config = BrowserConfig::builder()
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .build()
        .map_err(CaptureError::Launch)?;
    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| CaptureError::Launch(e.to_string()))?;
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
        debug!("protocol handler finished");
    });
    Ok((browser, handler_task))
}

async fn open_page(browser: &Browser, url: &str) -> Result<Page, CaptureError> {
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| CaptureError::Navigation(e.to_string()))?;
    timeout(NAV_TIMEOUT, page.wait_for_navigation())
        .await
        .map_err(|_| CaptureError::Navigation(format!("timed out loading {}", url)))?
        .map_err(|e| CaptureError::Navigation(e.to_string()))?;
    Ok(page)
}

async fn shutdown(browser: &mut Browser) {
    if let Err(e) = browser.close().await {
        warn!(error = %e, "failed to close browser cleanly");
    }
    let _ = browser.wait().await;
}
