//! Property-based tests for cleanup and output naming.
//!
//! Documents are generated as flat lists of blocks inside an article, which
//! keeps expected outcomes easy to state.

use pagesnap::cleanup::{CleanupConfig, PageNormalizer, StaticDocument, Truncation};
use pagesnap::target::{base_name_from_url, sanitize_name};
use proptest::prelude::*;
use std::future::Future;
use std::sync::OnceLock;
use tokio::runtime::Runtime;
use url::Url;

/// One runtime shared by every generated case
fn block_on<F: Future>(future: F) -> F::Output {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
        })
        .block_on(future)
}

fn normalizer() -> PageNormalizer {
    PageNormalizer::new(CleanupConfig::default()).unwrap()
}

/// Text that can never contain the marker or an overlay keyword
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[a-m ]{1,20}"
}

/// Class attribute values, some of which are overlays
fn arb_class() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("content".to_string()),
        Just("cb".to_string()),
        Just("sidebar".to_string()),
        Just("cookie-notice".to_string()),
        Just("promo-banner".to_string()),
        Just("js-popup".to_string()),
        Just("modal open".to_string()),
        Just("ui-dialog".to_string()),
    ]
}

fn render_article(blocks: &[(String, String)]) -> String {
    let body: String = blocks
        .iter()
        .map(|(class, text)| format!(r#"<div class="{class}">{text}</div>"#))
        .collect();
    format!("<html><body><article>{body}</article></body></html>")
}

fn is_overlay(class: &str) -> bool {
    ["cookie", "banner", "popup", "dialog", "modal"]
        .iter()
        .any(|m| class.contains(m))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ========================================================================
    // Output naming
    // ========================================================================

    #[test]
    fn prop_sanitized_names_use_safe_chars(raw in ".{0,40}") {
        let name = sanitize_name(&raw);
        prop_assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        prop_assert_eq!(sanitize_name(&name), name.clone());
    }

    #[test]
    fn prop_base_name_never_empty(segments in prop::collection::vec("[a-zA-Z0-9!.~-]{0,12}", 0..4)) {
        let url = Url::parse(&format!("https://example.com/{}", segments.join("/"))).unwrap();
        let name = base_name_from_url(&url);
        prop_assert!(!name.is_empty());
    }

    // ========================================================================
    // Overlay removal
    // ========================================================================

    #[test]
    fn prop_no_overlay_survives(blocks in prop::collection::vec((arb_class(), arb_plain_text()), 0..12)) {
        let mut doc = StaticDocument::parse(&render_article(&blocks));
        let normalizer = normalizer();
        let selector = CleanupConfig::default().overlay_selector();

        let removed = block_on(normalizer.remove_overlays(&mut doc)).unwrap();

        let expected = blocks.iter().filter(|(class, _)| is_overlay(class)).count();
        prop_assert_eq!(removed, expected);
        prop_assert_eq!(doc.count(&selector).unwrap(), 0);
        prop_assert_eq!(doc.count("article > div").unwrap(), blocks.len() - expected);
    }

    #[test]
    fn prop_overlay_free_document_is_untouched(texts in prop::collection::vec(arb_plain_text(), 0..12)) {
        let blocks: Vec<_> = texts.into_iter().map(|t| ("content".to_string(), t)).collect();
        let mut doc = StaticDocument::parse(&render_article(&blocks));
        let before = doc.to_html();

        let removed = block_on(normalizer().remove_overlays(&mut doc)).unwrap();

        prop_assert_eq!(removed, 0);
        prop_assert_eq!(doc.to_html(), before);
    }

    // ========================================================================
    // Truncation
    // ========================================================================

    #[test]
    fn prop_without_marker_nothing_changes(blocks in prop::collection::vec((arb_class(), arb_plain_text()), 0..12)) {
        let mut doc = StaticDocument::parse(&render_article(&blocks));
        let before = doc.to_html();

        let outcome = block_on(normalizer().truncate(&mut doc)).unwrap();

        prop_assert_eq!(outcome, Truncation::NoMarker);
        prop_assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn prop_marker_block_and_tail_removed(
        before in prop::collection::vec(arb_plain_text(), 0..6),
        after in prop::collection::vec(arb_plain_text(), 0..6),
        author in "[A-Z][a-m]{1,8}",
    ) {
        let mut blocks: Vec<(String, String)> =
            before.iter().map(|t| ("content".to_string(), t.clone())).collect();
        blocks.push(("cb".to_string(), format!("Written by {author}")));
        blocks.extend(after.iter().map(|t| ("content".to_string(), t.clone())));
        let mut doc = StaticDocument::parse(&render_article(&blocks));

        let outcome = block_on(normalizer().truncate(&mut doc)).unwrap();

        prop_assert_eq!(outcome, Truncation::Removed { siblings_removed: after.len() });
        prop_assert_eq!(doc.count("article > div").unwrap(), before.len());
        prop_assert_eq!(doc.count(".cb").unwrap(), 0);
        let text = doc.text_of("article").unwrap().unwrap_or_default();
        prop_assert!(!text.to_lowercase().contains("written by"));
    }
}
