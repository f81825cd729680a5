//! Live page surface
//!
//! Each primitive is one script evaluated in the page. Arguments are spliced
//! in as JSON literals, so selectors and phrases never need manual quoting.
//! Timing stays on the Rust side; none of these scripts wait.

use super::surface::{PageSurface, ScrollExtent, Truncation};
use super::{TruncationRule, MAIN_ROOT_SELECTORS};
use crate::error::{CleanupError, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use tracing::trace;

/// A loaded browser tab seen as a [`PageSurface`]
pub struct LivePage<'a> {
    page: &'a Page,
}

impl<'a> LivePage<'a> {
    /// Wrap a page that has finished loading
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    async fn run<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        trace!(script = %script, "Evaluating cleanup script");
        let value = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| CleanupError::ScriptFailed(e.to_string()))?
            .into_value()
            .map_err(|e| CleanupError::ScriptFailed(e.to_string()))?;
        Ok(value)
    }
}

fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn remove_script(selector: &str) -> Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const matches = document.querySelectorAll({selector});
            matches.forEach(el => el.remove());
            return matches.length;
        }})()
        "#,
        selector = json(selector)?
    ))
}

fn click_script(selector: &str) -> Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.click();
            return true;
        }})()
        "#,
        selector = json(selector)?
    ))
}

fn scroll_script(distance: u32) -> String {
    format!(
        r#"
        (() => {{
            window.scrollBy(0, {distance});
            return {{
                documentHeight: document.body ? document.body.scrollHeight : 0,
                viewportHeight: window.innerHeight
            }};
        }})()
        "#
    )
}

fn truncate_script(rule: &TruncationRule) -> Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const phrase = {phrase}.replace(/[.*+?^${{}}()|[\]\\]/g, '\\$&');
            const marker = new RegExp('\\b' + phrase + '\\b', 'i');
            const containerClasses = {classes};
            const root = {roots}
                .map(s => document.querySelector(s))
                .find(el => el);
            if (!root) return {{ outcome: 'noMarker' }};

            const walker = document.createTreeWalker(root, NodeFilter.SHOW_ELEMENT);
            let found = null;
            while (walker.nextNode()) {{
                const node = walker.currentNode;
                if (node.textContent && marker.test(node.textContent)) {{
                    found = node;
                    break;
                }}
            }}
            if (!found) return {{ outcome: 'noMarker' }};

            const isContainer = el => containerClasses.some(c => el.classList.contains(c));
            let boundary = found;
            while (boundary && boundary !== root && !isContainer(boundary)) {{
                boundary = boundary.parentElement;
            }}
            if (!boundary || boundary === root) return {{ outcome: 'passThrough' }};

            let removed = 0;
            for (let current = boundary; current && current !== root; current = current.parentElement) {{
                let sibling = current.nextElementSibling;
                while (sibling) {{
                    const next = sibling.nextElementSibling;
                    sibling.remove();
                    removed += 1;
                    sibling = next;
                }}
            }}
            boundary.remove();
            return {{ outcome: 'removed', siblingsRemoved: removed }};
        }})()
        "#,
        phrase = json(rule.phrase())?,
        classes = json(rule.container_classes())?,
        roots = json(&MAIN_ROOT_SELECTORS)?,
    ))
}

impl PageSurface for LivePage<'_> {
    async fn remove_matching(&mut self, selector: &str) -> Result<usize> {
        self.run(remove_script(selector)?).await
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool> {
        self.run(click_script(selector)?).await
    }

    async fn scroll_by(&mut self, distance: u32) -> Result<ScrollExtent> {
        self.run(scroll_script(distance)).await
    }

    async fn truncate_at_marker(&mut self, rule: &TruncationRule) -> Result<Truncation> {
        self.run(truncate_script(rule)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_are_json_quoted() {
        let script = remove_script(r#"[id*="cookie"], [aria-modal="true"]"#).unwrap();
        assert!(script.contains(r#"querySelectorAll("[id*=\"cookie\"], [aria-modal=\"true\"]")"#));
    }

    #[test]
    fn test_click_script_targets_first_match() {
        let script = click_script("#expand").unwrap();
        assert!(script.contains(r##"document.querySelector("#expand")"##));
        assert!(script.contains("el.click()"));
    }

    #[test]
    fn test_scroll_script_reports_extent() {
        let script = scroll_script(300);
        assert!(script.contains("window.scrollBy(0, 300)"));
        assert!(script.contains("documentHeight"));
        assert!(script.contains("viewportHeight"));
    }

    #[test]
    fn test_truncate_script_embeds_rule() {
        let rule = TruncationRule::new("Written by", vec!["cb".to_string()]).unwrap();
        let script = truncate_script(&rule).unwrap();
        assert!(script.contains(r#"const phrase = "Written by".replace("#));
        assert!(script.contains(r"new RegExp('\\b' + phrase + '\\b', 'i')"));
        assert!(script.contains(r#"const containerClasses = ["cb"];"#));
        assert!(script.contains(r#"["article","section","body"]"#));
    }

    #[test]
    fn test_truncate_script_escapes_phrase_in_page() {
        let rule = TruncationRule::new(r"x.y\d", vec![]).unwrap();
        let script = truncate_script(&rule).unwrap();
        assert!(script.contains(r#"const phrase = "x.y\\d".replace("#));
        assert!(script.contains(r"'\\$&'"));
    }
}
