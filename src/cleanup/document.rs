//! Offline document surface
//!
//! A parsed HTML tree that the cleanup passes can mutate without a browser.
//! Nothing is rendered, so clicks only report whether the control exists and
//! scrolling always reports a zero extent.

use super::surface::{PageSurface, ScrollExtent, Truncation};
use super::{TruncationRule, MAIN_ROOT_SELECTORS};
use crate::error::{CleanupError, Result};
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as visible
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// An HTML document held in memory
pub struct StaticDocument {
    html: Html,
}

impl StaticDocument {
    /// Parse a full HTML document
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// Serialize the current tree back to HTML
    pub fn to_html(&self) -> String {
        self.html.root_element().html()
    }

    /// Visible text of the body, one trimmed line per text run.
    ///
    /// Script and style contents are skipped.
    pub fn visible_text(&self) -> String {
        let Some(body) = self.first_match("body").ok().flatten() else {
            return String::new();
        };

        body.descendants()
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some((node, text)),
                _ => None,
            })
            .filter(|(node, _)| {
                !node.ancestors().filter_map(ElementRef::wrap).any(|el| {
                    INVISIBLE_ELEMENTS.contains(&el.value().name())
                })
            })
            .map(|(_, text)| text.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of elements matching `selector`
    pub fn count(&self, selector: &str) -> Result<usize> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).count())
    }

    /// Combined text of the first element matching `selector`
    pub fn text_of(&self, selector: &str) -> Result<Option<String>> {
        Ok(self
            .first_match(selector)?
            .map(|el| el.text().collect::<String>()))
    }

    fn first_match(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next())
    }

    /// First of article/section/body present in the document
    fn main_root(&self) -> Result<Option<ElementRef<'_>>> {
        for candidate in MAIN_ROOT_SELECTORS {
            if let Some(root) = self.first_match(candidate)? {
                return Ok(Some(root));
            }
        }
        Ok(None)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| CleanupError::InvalidSelector(selector.to_string()).into())
}

impl PageSurface for StaticDocument {
    async fn remove_matching(&mut self, selector: &str) -> Result<usize> {
        let selector = parse_selector(selector)?;
        let matched: Vec<_> = self.html.select(&selector).map(|el| (*el).id()).collect();

        for id in &matched {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }

        Ok(matched.len())
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool> {
        Ok(self.first_match(selector)?.is_some())
    }

    async fn scroll_by(&mut self, _distance: u32) -> Result<ScrollExtent> {
        Ok(ScrollExtent::default())
    }

    async fn truncate_at_marker(&mut self, rule: &TruncationRule) -> Result<Truncation> {
        let (doomed, boundary) = {
            let Some(root) = self.main_root()? else {
                return Ok(Truncation::NoMarker);
            };
            let root_id = (*root).id();

            let marker = root
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .find(|el| rule.matches_marker(&el.text().collect::<String>()));
            let Some(marker) = marker else {
                return Ok(Truncation::NoMarker);
            };

            let mut boundary = *marker;
            while boundary.id() != root_id {
                let is_container = ElementRef::wrap(boundary)
                    .is_some_and(|el| rule.is_container(el.value().classes()));
                if is_container {
                    break;
                }
                match boundary.parent() {
                    Some(parent) => boundary = parent,
                    None => break,
                }
            }

            if boundary.id() == root_id {
                return Ok(Truncation::PassThrough);
            }

            let mut doomed = Vec::new();
            let mut current = Some(boundary);
            while let Some(node) = current {
                if node.id() == root_id {
                    break;
                }
                doomed.extend(
                    node.next_siblings()
                        .filter(|sibling| sibling.value().is_element())
                        .map(|sibling| sibling.id()),
                );
                current = node.parent();
            }

            (doomed, boundary.id())
        };

        let siblings_removed = doomed.len();
        for id in doomed.into_iter().chain(std::iter::once(boundary)) {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
            }
        }

        Ok(Truncation::Removed { siblings_removed })
    }
}
