//! WebDriver capture driver.
//!
//! Talks to an external WebDriver server (chromedriver or selenium).
//! A session is opened per request and always closed before returning,
//! success or not.

use std::fs;
use std::path::Path;

use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tokio::time::timeout;
use tracing::warn;

use crate::capture::{webdriver_url, NAV_TIMEOUT};
use crate::types::errors::CaptureError;

pub async fn screenshot(url: &str, out_path: &Path) -> Result<(), CaptureError> {
    let mut client = connect().await?;
    let result = match goto(&mut client, url).await {
        Ok(()) => match client.screenshot().await {
            Ok(bytes) => fs::write(out_path, bytes).map_err(|e| CaptureError::Io(e.to_string())),
            Err(e) => Err(CaptureError::Capture(e.to_string())),
        },
        Err(e) => Err(e),
    };
    close(client).await;
    result
}

pub async fn page_html(url: &str) -> Result<String, CaptureError> {
    let mut client = connect().await?;
    let result = match goto(&mut client, url).await {
        Ok(()) => client
            .source()
            .await
            .map_err(|e| CaptureError::Capture(e.to_string())),
        Err(e) => Err(e),
    };
    close(client).await;
    result
}

async fn connect() -> Result<Client, CaptureError> {
    let mut builder = ClientBuilder::rustls().map_err(|e| CaptureError::Launch(e.to_string()))?;
    let caps = json!({
        "browserName": "chrome",
        "goog:chromeOptions": {
            "args": ["--headless=new", "--no-sandbox", "--disable-gpu"]
        }
    });
    builder.capabilities(caps.as_object().cloned().unwrap_or_default());
    let endpoint = webdriver_url();
    builder
        .connect(endpoint.trim_end_matches('/'))
        .await
        .map_err(|e| CaptureError::Launch(format!("webdriver at {}: {}", endpoint, e)))
}

async fn goto(client: &mut Client, url: &str) -> Result<(), CaptureError> {
    timeout(NAV_TIMEOUT, client.goto(url))
        .await
        .map_err(|_| CaptureError::Navigation(format!("timed out loading {}", url)))?
        .map_err(|e| CaptureError::Navigation(e.to_string()))
}

async fn close(client: Client) {
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close webdriver session");
    }
}
