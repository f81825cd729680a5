//! Page navigation
//!
//! Single-attempt navigation with a wait policy and timeout. A failed load
//! is reported to the caller as is.

use crate::error::{Error, NavigationError, Result};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace};

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Wait until condition (default: networkidle2)
    pub wait_until: WaitUntil,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            wait_until: WaitUntil::NetworkIdle2,
        }
    }
}

/// Condition to wait for after navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Wait until load event fires
    Load,
    /// Wait until DOMContentLoaded event fires
    DomContentLoaded,
    /// Wait until network is idle (0 connections for 500ms)
    NetworkIdle0,
    /// Wait until network is idle (max 2 connections for 500ms)
    NetworkIdle2,
}

impl WaitUntil {
    /// Name of the `Page.lifecycleEvent` Chrome emits once the condition holds
    pub fn lifecycle_event(self) -> &'static str {
        match self {
            WaitUntil::Load => "load",
            WaitUntil::DomContentLoaded => "DOMContentLoaded",
            WaitUntil::NetworkIdle0 => "networkIdle",
            WaitUntil::NetworkIdle2 => "networkAlmostIdle",
        }
    }
}

/// Tracks the main frame's lifecycle events for one navigation.
///
/// Events from the document being replaced are ignored; a new document
/// starts with `init`.
#[derive(Debug)]
struct LifecycleWatch {
    wanted: &'static str,
    started: bool,
}

impl LifecycleWatch {
    fn new(wait_until: WaitUntil) -> Self {
        Self {
            wanted: wait_until.lifecycle_event(),
            started: false,
        }
    }

    /// Feed one event name; true once the wanted event of the new document arrived
    fn observe(&mut self, name: &str) -> bool {
        if name == "init" {
            self.started = true;
            return false;
        }
        self.started && name == self.wanted
    }
}

/// Navigate, then wait for the main frame to reach `wait_until`
async fn load(
    page: &Page,
    url: &str,
    events: &mut EventStream<EventLifecycleEvent>,
    wait_until: WaitUntil,
) -> Result<()> {
    page.goto(url)
        .await
        .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

    let main_frame = page.mainframe().await.map_err(|e| Error::cdp(e.to_string()))?;
    let mut watch = LifecycleWatch::new(wait_until);

    while let Some(event) = events.next().await {
        if main_frame.as_ref().is_some_and(|id| *id != event.frame_id) {
            continue;
        }
        trace!(name = %event.name, "Lifecycle event");
        if watch.observe(&event.name) {
            return Ok(());
        }
    }

    Err(NavigationError::LoadFailed("page closed before the wait condition held".to_string()).into())
}

/// Result of a navigation operation
#[derive(Debug)]
pub struct NavigationResult {
    /// Final URL after any redirects
    pub final_url: String,
    /// Page title
    pub title: Option<String>,
    /// Navigation duration in milliseconds
    pub duration_ms: u64,
}

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL and wait for the configured condition
    #[instrument(skip(page, options))]
    pub async fn goto(
        page: &Page,
        url: &str,
        options: &NavigationOptions,
    ) -> Result<NavigationResult> {
        let start = Instant::now();
        let timeout = Duration::from_millis(options.timeout_ms);

        info!("Navigating to: {}", url);

        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;
        let mut events = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        let navigate = load(page, url, &mut events, options.wait_until);
        tokio::time::timeout(timeout, navigate)
            .await
            .map_err(|_| NavigationError::Timeout(options.timeout_ms))??;

        let final_url = page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        let title = page
            .evaluate("document.title")
            .await
            .ok()
            .and_then(|v| v.into_value::<String>().ok());

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!("Navigation complete: {} -> {} in {}ms", url, final_url, duration_ms);

        Ok(NavigationResult {
            final_url,
            title,
            duration_ms,
        })
    }

    /// Wait for a specific element to appear
    #[instrument(skip(page))]
    pub async fn wait_for_selector(page: &Page, selector: &str, timeout_ms: u64) -> Result<()> {
        let script = format!(
            r#"
                new Promise((resolve, reject) => {{
                    const timeout = {timeout_ms};
                    const start = Date.now();

                    function check() {{
                        const el = document.querySelector({selector});
                        if (el) {{
                            resolve(true);
                        }} else if (Date.now() - start > timeout) {{
                            reject(new Error('Timeout waiting for selector'));
                        }} else {{
                            requestAnimationFrame(check);
                        }}
                    }}
                    check();
                }})
            "#,
            selector = serde_json::to_string(selector)?
        );

        let selector_timeout = || NavigationError::SelectorTimeout {
            selector: selector.to_string(),
            timeout_ms,
        };

        let timeout = Duration::from_millis(timeout_ms + 1000);
        tokio::time::timeout(timeout, page.evaluate(script.as_str()))
            .await
            .map_err(|_| selector_timeout())?
            .map_err(|_| selector_timeout())?;

        Ok(())
    }
}
