//! Unit tests for the capture bridge.
//!
//! Driver failures must come back as error values; none of these calls
//! may panic even with no browser or WebDriver server available.

use webglass::capture::{page_html, screenshot, webdriver_url, CaptureDriver};
use webglass::router;

use serde_json::json;

// Port 9 (discard) is guaranteed to have no WebDriver listening.
const DEAD_WEBDRIVER: &str = "http://127.0.0.1:9";

fn point_webdriver_at_nothing() {
    std::env::set_var("WEBGLASS_WEBDRIVER_URL", DEAD_WEBDRIVER);
}

#[test]
fn test_webdriver_url_env_override() {
    point_webdriver_at_nothing();
    assert_eq!(webdriver_url(), DEAD_WEBDRIVER);
}

#[tokio::test]
async fn test_webdriver_screenshot_failure_is_an_error_value() {
    point_webdriver_at_nothing();
    let result = screenshot("https://example.com/", CaptureDriver::WebDriver).await;
    let err = result.unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn test_webdriver_page_html_failure_is_an_error_value() {
    point_webdriver_at_nothing();
    let result = page_html("https://example.com/", CaptureDriver::WebDriver).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cdp_capture_of_unreachable_url_is_an_error_value() {
    // Fails at launch when no browser is installed, or at navigation
    // when one is; either way it must come back as a value.
    let result = page_html("http://127.0.0.1:9/", CaptureDriver::Cdp).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_capture_command_reports_error_in_band() {
    point_webdriver_at_nothing();
    // The command itself succeeds; the failure travels in the payload.
    let result = router::handle_capture(
        "capture-html",
        &json!({"url": "https://example.com/", "driver": "playwright"}),
    )
    .await
    .unwrap();
    assert!(result.get("error").is_some());
}

#[tokio::test]
async fn test_capture_command_missing_url_is_rejected() {
    let err = router::handle_capture("render-screenshot", &json!({}))
        .await
        .unwrap_err();
    assert!(err.contains("url"));
}

#[tokio::test]
async fn test_unknown_capture_method_is_rejected() {
    let err = router::handle_capture("capture-everything", &json!({"url": "https://x.example/"}))
        .await
        .unwrap_err();
    assert!(err.contains("unknown method"));
}
