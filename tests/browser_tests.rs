//! Browser module tests
//!
//! These cover configuration and format types through the public API.
//! Note: anything that talks to Chrome needs a browser started with
//! `--remote-debugging-port` and is not exercised here.

use pagesnap::browser::{
    CaptureFormat, NavigationOptions, SessionConfig, WaitUntil, DEFAULT_ENDPOINT,
};
use pagesnap::cleanup::{CleanupConfig, DEFAULT_EXPANDERS};
use pagesnap::target;

#[test]
fn test_session_config_default() {
    let config = SessionConfig::default();
    assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(config.timeout_ms, 30000);
    assert!(config.close_browser);
}

#[test]
fn test_session_config_builder() {
    let config = SessionConfig::builder()
        .endpoint("ws://127.0.0.1:9222/devtools/browser/1")
        .timeout_ms(10_000)
        .close_browser(false)
        .build();

    assert!(config.endpoint.starts_with("ws://"));
    assert_eq!(config.timeout_ms, 10_000);
    assert!(!config.close_browser);
}

#[test]
fn test_navigation_waits_for_network_idle() {
    let opts = NavigationOptions::default();
    assert_eq!(opts.wait_until, WaitUntil::NetworkIdle2);
}

#[test]
fn test_capture_format_serialization() {
    let formats = [
        (CaptureFormat::Pdf, "\"pdf\""),
        (CaptureFormat::Html, "\"html\""),
        (CaptureFormat::Text, "\"text\""),
    ];

    for (format, expected) in formats {
        let json = serde_json::to_string(&format).unwrap();
        assert_eq!(json, expected);
    }
}

#[test]
fn test_expanders_in_order() {
    let config = CleanupConfig::default();
    assert_eq!(config.expanders, DEFAULT_EXPANDERS);
    assert_eq!(config.expanders[2], "#expand");
}

#[test]
fn test_output_path_for_post_and_root() {
    let dir = std::path::Path::new("/work/tmp");

    let post = url::Url::parse("https://example.com/blog/My-Post!?x=1").unwrap();
    assert_eq!(
        target::output_path(dir, &target::base_name_from_url(&post), CaptureFormat::Pdf),
        dir.join("My-Post.pdf")
    );

    let root = url::Url::parse("https://example.com/").unwrap();
    assert_eq!(
        target::output_path(dir, &target::base_name_from_url(&root), CaptureFormat::Pdf),
        dir.join("output.pdf")
    );
}
