//! Page content normalization
//!
//! Turns a loaded page into something fit for static export. Four passes run
//! strictly in order, each finishing before the next starts:
//!
//! 1. overlay removal (cookie banners, popups, modals)
//! 2. expansion of "read more" controls, with a settle delay after each click
//! 3. a timed scroll to the bottom so lazy content loads
//! 4. truncation of the main content at a trailing marker such as "Written by"
//!
//! None of the passes treat "nothing matched" as an error.

pub mod document;
pub mod live;
pub mod surface;

pub use document::StaticDocument;
pub use live::LivePage;
pub use surface::{PageSurface, ScrollExtent, Truncation};

use crate::error::{CleanupError, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Candidates for the main content root, in priority order
pub const MAIN_ROOT_SELECTORS: [&str; 3] = ["article", "section", "body"];

/// Default id/class substrings identifying overlays
pub const DEFAULT_OVERLAY_MARKERS: [&str; 5] = ["cookie", "banner", "popup", "dialog", "modal"];

/// Default expander controls, clicked in this order
pub const DEFAULT_EXPANDERS: [&str; 3] = [
    "#description-inline-expander .yt-core-attributed-string__expander-link",
    "#content-text .more-button",
    "#expand",
];

/// Default trailing marker phrase
pub const DEFAULT_MARKER_PHRASE: &str = "Written by";

/// Default block-container class
pub const DEFAULT_CONTAINER_CLASS: &str = "cb";

/// Configuration for the cleanup passes
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Case-sensitive substrings matched against `id` and `class`
    pub overlay_markers: Vec<String>,
    /// Also remove elements declaring `aria-modal="true"` (default: true)
    pub match_aria_modal: bool,
    /// Expander selectors, tried independently in order
    pub expanders: Vec<String>,
    /// Pause after each successful click in milliseconds (default: 500)
    pub settle_delay_ms: u64,
    /// Pixels advanced per scroll tick (default: 300)
    pub scroll_distance: u32,
    /// Time between scroll ticks in milliseconds (default: 500)
    pub scroll_interval_ms: u64,
    /// Optional upper bound on scroll ticks for endless pages (default: none)
    pub max_scroll_ticks: Option<u32>,
    /// Trailing marker phrase, matched literally between word boundaries
    /// and case-insensitively
    pub marker_phrase: String,
    /// Classes that qualify an ancestor as a removable block
    pub container_classes: Vec<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            overlay_markers: DEFAULT_OVERLAY_MARKERS.iter().map(|m| m.to_string()).collect(),
            match_aria_modal: true,
            expanders: DEFAULT_EXPANDERS.iter().map(|s| s.to_string()).collect(),
            settle_delay_ms: 500,
            scroll_distance: 300,
            scroll_interval_ms: 500,
            max_scroll_ticks: None,
            marker_phrase: DEFAULT_MARKER_PHRASE.to_string(),
            container_classes: vec![DEFAULT_CONTAINER_CLASS.to_string()],
        }
    }
}

impl CleanupConfig {
    /// Create a new config builder
    pub fn builder() -> CleanupConfigBuilder {
        CleanupConfigBuilder::default()
    }

    /// Combined selector matching every overlay candidate.
    ///
    /// Empty when there are no markers and the modal attribute is ignored.
    pub fn overlay_selector(&self) -> String {
        let mut parts: Vec<String> = self
            .overlay_markers
            .iter()
            .map(|m| m.replace('\\', "\\\\").replace('"', "\\\""))
            .flat_map(|m| [format!("[id*=\"{m}\"]"), format!("[class*=\"{m}\"]")])
            .collect();

        if self.match_aria_modal {
            parts.push("[aria-modal=\"true\"]".to_string());
        }

        parts.join(", ")
    }

    /// Compile the truncation rule from the marker phrase and container classes
    pub fn truncation_rule(&self) -> Result<TruncationRule> {
        TruncationRule::new(&self.marker_phrase, self.container_classes.clone())
    }
}

/// Builder for CleanupConfig
#[derive(Default)]
pub struct CleanupConfigBuilder {
    config: CleanupConfig,
}

impl CleanupConfigBuilder {
    /// Replace the overlay markers
    pub fn overlay_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.overlay_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Enable/disable `aria-modal` matching
    pub fn match_aria_modal(mut self, enabled: bool) -> Self {
        self.config.match_aria_modal = enabled;
        self
    }

    /// Replace the expander selectors
    pub fn expanders<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.expanders = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the post-click settle delay
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    /// Set scroll distance and tick interval
    pub fn scroll(mut self, distance: u32, interval_ms: u64) -> Self {
        self.config.scroll_distance = distance.max(1);
        self.config.scroll_interval_ms = interval_ms;
        self
    }

    /// Bound the number of scroll ticks
    pub fn max_scroll_ticks(mut self, ticks: u32) -> Self {
        self.config.max_scroll_ticks = Some(ticks.max(1));
        self
    }

    /// Set the trailing marker phrase
    pub fn marker_phrase<S: Into<String>>(mut self, phrase: S) -> Self {
        self.config.marker_phrase = phrase.into();
        self
    }

    /// Replace the block-container classes
    pub fn container_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.container_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Build the config
    pub fn build(self) -> CleanupConfig {
        self.config
    }
}

/// Compiled marker phrase plus the block-container predicate.
///
/// The phrase is literal text. Word boundaries are ASCII-only, matching
/// `\b` in a page `RegExp`.
#[derive(Debug, Clone)]
pub struct TruncationRule {
    phrase: String,
    marker: Regex,
    container_classes: Vec<String>,
}

impl TruncationRule {
    /// Compile `phrase` as `\b<phrase>\b`, case-insensitively
    pub fn new(phrase: &str, container_classes: Vec<String>) -> Result<Self> {
        if phrase.trim().is_empty() {
            return Err(CleanupError::InvalidPattern {
                pattern: phrase.to_string(),
                reason: "marker phrase is empty".to_string(),
            }
            .into());
        }

        let pattern = format!(r"(?-u:\b){}(?-u:\b)", regex::escape(phrase));
        let marker = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| CleanupError::InvalidPattern {
                pattern: phrase.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            phrase: phrase.to_string(),
            marker,
            container_classes,
        })
    }

    /// Marker phrase as configured
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Classes accepted by the container predicate
    pub fn container_classes(&self) -> &[String] {
        &self.container_classes
    }

    /// Whether an element's combined text contains the marker
    pub fn matches_marker(&self, text: &str) -> bool {
        self.marker.is_match(text)
    }

    /// Whether an element carrying `classes` is a block container
    pub fn is_container<'a, I>(&self, classes: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        classes
            .into_iter()
            .any(|class| self.container_classes.iter().any(|c| c == class))
    }
}

/// Result of the scroll pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScrollOutcome {
    /// Ticks performed
    pub ticks: u32,
    /// Accumulated scroll distance
    pub distance: u64,
    /// Whether the tick bound stopped the loop before the bottom was reached
    pub capped: bool,
}

/// What a normalization run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Overlay elements removed
    pub overlays_removed: usize,
    /// Expanders that were found and clicked
    pub expanders_clicked: usize,
    /// Scroll pass summary
    pub scroll: ScrollOutcome,
    /// Truncation outcome
    pub truncation: Truncation,
}

/// Runs the cleanup passes against any [`PageSurface`]
#[derive(Debug, Clone)]
pub struct PageNormalizer {
    config: CleanupConfig,
    overlay_selector: String,
    rule: TruncationRule,
}

impl PageNormalizer {
    /// Create a normalizer, compiling the marker pattern up front
    pub fn new(config: CleanupConfig) -> Result<Self> {
        let rule = config.truncation_rule()?;
        let overlay_selector = config.overlay_selector();
        Ok(Self {
            config,
            overlay_selector,
            rule,
        })
    }

    /// Get the cleanup configuration
    pub fn config(&self) -> &CleanupConfig {
        &self.config
    }

    /// Run all four passes in order
    #[instrument(skip_all)]
    pub async fn normalize<S: PageSurface>(&self, surface: &mut S) -> Result<CleanupReport> {
        let overlays_removed = self.remove_overlays(surface).await?;
        let expanders_clicked = self.expand(surface).await?;
        let scroll = self.scroll_to_end(surface).await?;
        let truncation = self.truncate(surface).await?;

        let report = CleanupReport {
            overlays_removed,
            expanders_clicked,
            scroll,
            truncation,
        };
        info!(?report, "Page normalized");
        Ok(report)
    }

    /// Remove overlays in a single pass
    pub async fn remove_overlays<S: PageSurface>(&self, surface: &mut S) -> Result<usize> {
        if self.overlay_selector.is_empty() {
            return Ok(0);
        }
        let removed = surface.remove_matching(&self.overlay_selector).await?;
        debug!("Removed {} overlay elements", removed);
        Ok(removed)
    }

    /// Click each expander that exists, pausing after every click
    pub async fn expand<S: PageSurface>(&self, surface: &mut S) -> Result<usize> {
        let settle = Duration::from_millis(self.config.settle_delay_ms);
        let mut clicked = 0;

        for selector in &self.config.expanders {
            if surface.click_first(selector).await? {
                debug!("Clicked expander {}", selector);
                clicked += 1;
                tokio::time::sleep(settle).await;
            }
        }

        Ok(clicked)
    }

    /// Scroll in fixed steps until the accumulated distance reaches the
    /// bottom of the document as measured after each step.
    pub async fn scroll_to_end<S: PageSurface>(&self, surface: &mut S) -> Result<ScrollOutcome> {
        let interval = Duration::from_millis(self.config.scroll_interval_ms);
        let distance = self.config.scroll_distance.max(1);
        let mut outcome = ScrollOutcome::default();

        loop {
            tokio::time::sleep(interval).await;
            let extent = surface.scroll_by(distance).await?;
            outcome.ticks += 1;
            outcome.distance += u64::from(distance);

            if outcome.distance >= extent.scrollable() {
                break;
            }
            if self
                .config
                .max_scroll_ticks
                .is_some_and(|max| outcome.ticks >= max)
            {
                warn!(
                    "Stopped scrolling after {} ticks with {}px still below",
                    outcome.ticks,
                    extent.scrollable() - outcome.distance
                );
                outcome.capped = true;
                break;
            }
        }

        debug!("Scrolled {}px in {} ticks", outcome.distance, outcome.ticks);
        Ok(outcome)
    }

    /// Cut trailing content at the marker
    pub async fn truncate<S: PageSurface>(&self, surface: &mut S) -> Result<Truncation> {
        let truncation = surface.truncate_at_marker(&self.rule).await?;
        debug!(?truncation, "Truncation finished");
        Ok(truncation)
    }
}
