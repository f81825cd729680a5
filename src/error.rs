//! Error types for pagesnap
//!
//! One `thiserror` enum per concern, folded into [`enum@Error`]. Conditions the
//! cleanup heuristics treat as "nothing matched" are never errors; only
//! collaborator failures and bad configuration end up here.

use thiserror::Error;

/// The main error type for pagesnap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser session errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Capture errors (PDF, HTML, text)
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Page cleanup errors
    #[error("Cleanup error: {0}")]
    Cleanup(#[from] CleanupError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),
}

/// Remote browser session errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// The debugging endpoint could not be reached or described itself badly
    #[error("Failed to discover websocket endpoint at {endpoint}: {reason}")]
    EndpointDiscovery {
        /// Endpoint that was queried
        endpoint: String,
        /// What went wrong
        reason: String,
    },

    /// Websocket connection to the browser failed
    #[error("Failed to connect to browser: {0}")]
    ConnectFailed(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Failed to subscribe to page events
    #[error("Failed to subscribe to page events: {0}")]
    EventSubscription(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// Selector never appeared
    #[error("Timed out after {timeout_ms}ms waiting for selector {selector}")]
    SelectorTimeout {
        /// Selector that was awaited
        selector: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },
}

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// PDF generation failed
    #[error("PDF generation failed: {0}")]
    PdfFailed(String),

    /// HTML capture failed
    #[error("HTML capture failed: {0}")]
    HtmlFailed(String),

    /// Text capture failed
    #[error("Text capture failed: {0}")]
    TextFailed(String),

    /// Format not available for this kind of source
    #[error("Format {0} is not available for offline documents")]
    UnsupportedOffline(String),
}

/// Page cleanup errors
#[derive(Error, Debug)]
pub enum CleanupError {
    /// Marker phrase is empty or does not compile
    #[error("Invalid marker pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// CSS selector does not parse
    #[error("Invalid selector {0:?}")]
    InvalidSelector(String),

    /// A cleanup script threw inside the page
    #[error("Cleanup script failed: {0}")]
    ScriptFailed(String),
}

/// Result type alias for pagesnap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::ConnectFailed("refused".to_string()));
        assert!(err.to_string().contains("Failed to connect to browser"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_endpoint_discovery_error() {
        let err = BrowserError::EndpointDiscovery {
            endpoint: "http://localhost:9224".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("localhost:9224"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_selector_timeout_error() {
        let err = NavigationError::SelectorTimeout {
            selector: "body".to_string(),
            timeout_ms: 1500,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 1500ms waiting for selector body"
        );
    }

    #[test]
    fn test_cleanup_error_wraps() {
        let err: Error = CleanupError::InvalidSelector("[[".to_string()).into();
        assert!(err.to_string().starts_with("Cleanup error"));
    }
}
