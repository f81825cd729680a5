//! One capture run from URL to file
//!
//! Connect, open a tab, dismiss dialogs, load the page, normalize it, export
//! it, and tear everything down again. Each step runs once; the first failure
//! ends the run.

use crate::browser::{
    BrowserSession, CaptureFormat, DialogInterceptor, NavigationOptions, PageCapture,
    PageNavigator, SessionConfig, WaitUntil,
};
use crate::cleanup::{CleanupConfig, CleanupReport, LivePage, PageNormalizer, StaticDocument};
use crate::error::{CaptureError, Result};
use crate::target::{self, DEFAULT_OUTPUT_DIR};
use chromiumoxide::Page;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use url::Url;

/// Element that must exist before cleanup starts
const READY_SELECTOR: &str = "body";

/// Everything a run needs to know
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Remote browser session settings
    pub session: SessionConfig,
    /// Cleanup pass settings
    pub cleanup: CleanupConfig,
    /// Artifact format (default: pdf)
    pub format: CaptureFormat,
    /// Output folder relative to the working directory (default: tmp)
    pub output_dir: PathBuf,
    /// Load condition awaited after navigation (default: networkidle2)
    pub wait_until: WaitUntil,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            cleanup: CleanupConfig::default(),
            format: CaptureFormat::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            wait_until: WaitUntil::NetworkIdle2,
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    /// Where the artifact was written
    pub path: PathBuf,
    /// Artifact size in bytes
    pub size: usize,
    /// Cleanup summary
    pub report: CleanupReport,
    /// Native dialogs dismissed while the page was open
    pub dialogs_dismissed: usize,
}

/// Runs captures with a fixed set of options
pub struct Snapshotter {
    options: SnapshotOptions,
    normalizer: PageNormalizer,
}

impl Snapshotter {
    /// Create a snapshotter, validating the cleanup configuration
    pub fn new(options: SnapshotOptions) -> Result<Self> {
        let normalizer = PageNormalizer::new(options.cleanup.clone())?;
        Ok(Self {
            options,
            normalizer,
        })
    }

    /// Get the options
    pub fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    /// Capture a live page through the remote browser
    #[instrument(skip(self))]
    pub async fn capture_url(&self, raw_url: &str) -> Result<SnapshotOutcome> {
        let requested = target::parse_target(raw_url)?;
        let dir = target::prepare_output_dir(&self.options.output_dir).await?;
        let path = target::output_path(&dir, &requested.base_name(), self.options.format);

        let session = BrowserSession::connect(self.options.session.clone()).await?;
        let result = self
            .capture_in_session(&session, &requested.navigate, &path)
            .await;
        let closed = session.close().await;

        let outcome = result?;
        closed?;

        info!(path = %outcome.path.display(), size = outcome.size, "Snapshot written");
        Ok(outcome)
    }

    async fn capture_in_session(
        &self,
        session: &BrowserSession,
        url: &Url,
        path: &Path,
    ) -> Result<SnapshotOutcome> {
        let page = session.new_page().await?;
        let interceptor = DialogInterceptor::install(&page).await?;

        let result = self.process_page(&page, url, path).await;

        let dialogs_dismissed = interceptor.stop();
        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }

        let (size, report) = result?;
        Ok(SnapshotOutcome {
            path: path.to_path_buf(),
            size,
            report,
            dialogs_dismissed,
        })
    }

    async fn process_page(
        &self,
        page: &Page,
        url: &Url,
        path: &Path,
    ) -> Result<(usize, CleanupReport)> {
        let timeout_ms = self.options.session.timeout_ms;
        let navigation = NavigationOptions {
            timeout_ms,
            wait_until: self.options.wait_until,
        };

        let loaded = PageNavigator::goto(page, url.as_str(), &navigation).await?;
        if let Some(title) = &loaded.title {
            info!("Loaded \"{}\" in {}ms", title, loaded.duration_ms);
        }
        PageNavigator::wait_for_selector(page, READY_SELECTOR, timeout_ms).await?;

        let report = self.normalizer.normalize(&mut LivePage::new(page)).await?;

        let capture = PageCapture::capture(page, self.options.format).await?;
        capture.write_to(path).await?;

        Ok((capture.size, report))
    }

    /// Clean a local HTML file without a browser
    #[instrument(skip(self))]
    pub async fn capture_file(&self, source: &Path) -> Result<SnapshotOutcome> {
        if self.options.format == CaptureFormat::Pdf {
            return Err(CaptureError::UnsupportedOffline("pdf".to_string()).into());
        }

        let html = tokio::fs::read_to_string(source).await?;
        let dir = target::prepare_output_dir(&self.options.output_dir).await?;
        let path = target::output_path(
            &dir,
            &target::base_name_from_path(source),
            self.options.format,
        );

        let mut document = StaticDocument::parse(&html);
        let report = self.normalizer.normalize(&mut document).await?;

        let capture = PageCapture::capture_document(&document, self.options.format)?;
        capture.write_to(&path).await?;

        info!(path = %path.display(), size = capture.size, "Offline snapshot written");
        Ok(SnapshotOutcome {
            path,
            size: capture.size,
            report,
            dialogs_dismissed: 0,
        })
    }
}
