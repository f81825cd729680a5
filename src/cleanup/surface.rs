//! The document-tree handle the normalizer works against
//!
//! Every cleanup step is written once, in terms of the four primitives on
//! [`PageSurface`]. A live browser tab and a parsed HTML string both
//! implement it, so the heuristics run the same way in either place.

use super::TruncationRule;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Document and viewport heights reported after a scroll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollExtent {
    /// Full scrollable height of the document body
    pub document_height: u64,
    /// Height of the visible viewport
    pub viewport_height: u64,
}

impl ScrollExtent {
    /// Distance that has to be scrolled before the bottom is in view.
    ///
    /// Zero when the document is shorter than the viewport.
    pub fn scrollable(&self) -> u64 {
        self.document_height.saturating_sub(self.viewport_height)
    }
}

/// Outcome of trailing-content truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Truncation {
    /// No element under the main content root matched the marker
    NoMarker,
    /// A marker was found but no block container sits between it and the root
    PassThrough,
    /// The block container and everything after it was removed
    Removed {
        /// Following siblings removed across all ancestor levels
        #[serde(rename = "siblingsRemoved")]
        siblings_removed: usize,
    },
}

/// In-place mutation primitives over a single loaded document.
///
/// Implementations must treat "nothing matched" as success: zero removals,
/// `false`, or [`Truncation::NoMarker`].
#[allow(async_fn_in_trait)]
pub trait PageSurface {
    /// Remove every element matching `selector`, returning how many matched.
    async fn remove_matching(&mut self, selector: &str) -> Result<usize>;

    /// Activate the first element matching `selector`, if any.
    async fn click_first(&mut self, selector: &str) -> Result<bool>;

    /// Advance the scroll position and report the extent afterwards.
    async fn scroll_by(&mut self, distance: u32) -> Result<ScrollExtent>;

    /// Cut the main content root at the first marker per `rule`.
    async fn truncate_at_marker(&mut self, rule: &TruncationRule) -> Result<Truncation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrollable_saturates() {
        let short = ScrollExtent {
            document_height: 400,
            viewport_height: 800,
        };
        assert_eq!(short.scrollable(), 0);

        let tall = ScrollExtent {
            document_height: 900,
            viewport_height: 800,
        };
        assert_eq!(tall.scrollable(), 100);
    }

    #[test]
    fn test_scroll_extent_from_page_json() {
        let extent: ScrollExtent =
            serde_json::from_str(r#"{"documentHeight": 2400, "viewportHeight": 900}"#).unwrap();
        assert_eq!(extent.document_height, 2400);
        assert_eq!(extent.viewport_height, 900);
    }

    #[test]
    fn test_truncation_from_page_json() {
        let removed: Truncation =
            serde_json::from_str(r#"{"outcome": "removed", "siblingsRemoved": 3}"#).unwrap();
        assert_eq!(removed, Truncation::Removed { siblings_removed: 3 });

        let none: Truncation = serde_json::from_str(r#"{"outcome": "noMarker"}"#).unwrap();
        assert_eq!(none, Truncation::NoMarker);

        let pass: Truncation = serde_json::from_str(r#"{"outcome": "passThrough"}"#).unwrap();
        assert_eq!(pass, Truncation::PassThrough);
    }
}
