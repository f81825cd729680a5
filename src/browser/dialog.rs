//! Native dialog suppression
//!
//! Pages that raise `alert`/`confirm`/`prompt` block script execution until
//! the dialog is answered. The interceptor answers every one with "dismiss".

use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Background task dismissing a page's JavaScript dialogs
pub struct DialogInterceptor {
    task: JoinHandle<()>,
    dismissed: Arc<AtomicUsize>,
}

impl DialogInterceptor {
    /// Start dismissing dialogs raised by `page`
    #[instrument(skip(page))]
    pub async fn install(page: &Page) -> Result<Self> {
        let mut dialogs = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| BrowserError::EventSubscription(e.to_string()))?;
        let page = page.clone();
        let dismissed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&dismissed);

        let task = tokio::spawn(async move {
            while let Some(dialog) = dialogs.next().await {
                info!("Dismissing dialog: {}", dialog.message);
                match page.execute(dismiss()).await {
                    Ok(_) => {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => warn!("Failed to dismiss dialog: {}", e),
                }
            }
        });

        Ok(Self { task, dismissed })
    }

    /// Number of dialogs dismissed so far
    pub fn dismissed(&self) -> usize {
        self.dismissed.load(Ordering::Relaxed)
    }

    /// Stop intercepting and report how many dialogs were dismissed
    pub fn stop(self) -> usize {
        self.task.abort();
        self.dismissed()
    }
}

/// The answer sent for every dialog
fn dismiss() -> HandleJavaScriptDialogParams {
    HandleJavaScriptDialogParams::new(false)
}
