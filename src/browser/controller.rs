//! Remote browser session management
//!
//! Attaches to an already running Chrome/Chromium through its remote
//! debugging endpoint, hands out pages, and tears the session down.

use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Default remote debugging endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9224";

/// Configuration for the browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote debugging endpoint, `http(s)://` or `ws(s)://` (default: http://localhost:9224)
    pub endpoint: String,
    /// Navigation and wait timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Close the remote browser when the run ends instead of only disconnecting (default: true)
    pub close_browser: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 30000,
            close_browser: true,
        }
    }
}

impl SessionConfig {
    /// Create a new config builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for SessionConfig
#[derive(Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the remote debugging endpoint
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set navigation timeout
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Close the browser on shutdown, or only disconnect
    pub fn close_browser(mut self, close: bool) -> Self {
        self.config.close_browser = close;
        self
    }

    /// Build the config
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

#[derive(Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

/// URL of the `/json/version` document for an http(s) endpoint
pub fn version_url(endpoint: &str) -> String {
    format!("{}/json/version", endpoint.trim_end_matches('/'))
}

/// A connection to a remote browser
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    config: SessionConfig,
}

impl BrowserSession {
    /// Connect using the given config
    #[instrument(skip(config), fields(endpoint = %config.endpoint))]
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let ws_url = Self::resolve_ws_url(&config.endpoint).await?;
        info!("Connecting to browser at {}", ws_url);

        // Leave the viewport alone so pages keep the window's own size
        let handler_config = HandlerConfig {
            viewport: None,
            request_timeout: Duration::from_millis(config.timeout_ms),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| BrowserError::ConnectFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Connected to browser");

        Ok(Self {
            browser,
            handler: handler_task,
            config,
        })
    }

    /// Turn an http(s) endpoint into the browser's websocket URL
    async fn resolve_ws_url(endpoint: &str) -> Result<String> {
        if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
            return Ok(endpoint.to_string());
        }

        let discovery_error = |reason: String| BrowserError::EndpointDiscovery {
            endpoint: endpoint.to_string(),
            reason,
        };

        let info: VersionInfo = reqwest::get(version_url(endpoint))
            .await
            .map_err(|e| discovery_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| discovery_error(e.to_string()))?
            .json()
            .await
            .map_err(|e| discovery_error(e.to_string()))?;

        Ok(info.web_socket_debugger_url)
    }

    /// Open a blank page
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;
        debug!("Created new page");
        Ok(page)
    }

    /// Get the session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// End the session, closing the browser if configured to
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        if self.config.close_browser {
            info!("Closing browser");
            self.browser
                .close()
                .await
                .map_err(|e| Error::cdp(e.to_string()))?;
        } else {
            info!("Disconnecting from browser");
        }

        drop(self.browser);
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;

        debug!("Session ended");
        Ok(())
    }
}
