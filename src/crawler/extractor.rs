//! Link extraction from loaded pages
//!
//! Turns the anchors of a loaded page into new `Link`s for the frontier:
//! - only absolute http(s) targets are kept (after normalization)
//! - URLs already seen, or already selected from the same page, are skipped
//! - selection stops once the discovery cap would be reached
//!
//! Extraction is best-effort. An engine failure while reading anchors yields
//! no links rather than an error.

use crate::crawler::capture::Capturer;
use crate::engine::{Anchor, Page};
use crate::state::Link;
use crate::url::normalize_url;
use std::collections::HashSet;
use std::time::Duration;

/// Suffix of the annotated source-page screenshot
const SOURCE_SUFFIX: &str = "source";

/// Selects the new outbound links among `anchors`
///
/// # Arguments
///
/// * `anchors` - Anchors of the page, in document order
/// * `source_url` - URL of the page the anchors were found on
/// * `seen` - Every URL already accepted by the frontier
/// * `max_links` - Discovery cap
///
/// # Returns
///
/// Candidate links in document order, at most `max_links - seen.len()`
pub fn select_candidates(
    anchors: &[Anchor],
    source_url: &str,
    seen: &HashSet<String>,
    max_links: usize,
) -> Vec<Link> {
    let budget = max_links.saturating_sub(seen.len());
    let mut selected: Vec<Link> = Vec::new();
    let mut selected_urls = HashSet::new();

    for anchor in anchors {
        if selected.len() >= budget {
            break;
        }

        let href = anchor.href.trim();
        if href.is_empty() {
            continue;
        }

        let url = match normalize_url(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::trace!("Skipping anchor {} on {}: {}", href, source_url, e);
                continue;
            }
        };

        if seen.contains(&url) || !selected_urls.insert(url.clone()) {
            continue;
        }

        selected.push(Link::discovered(
            url,
            source_url,
            collapse_whitespace(&anchor.text),
        ));
    }

    selected
}

/// Trims and collapses internal whitespace; `None` when nothing is left
fn collapse_whitespace(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Reads anchors from the current page and selects new links
pub struct LinkExtractor {
    timeout: Duration,
    max_links: usize,
    annotate_source: bool,
    highlight_style: String,
}

impl LinkExtractor {
    pub fn new(
        timeout: Duration,
        max_links: usize,
        annotate_source: bool,
        highlight_style: impl Into<String>,
    ) -> Self {
        Self {
            timeout,
            max_links,
            annotate_source,
            highlight_style: highlight_style.into(),
        }
    }

    /// Extracts the new outbound links of the loaded page
    ///
    /// When source annotation is enabled and a capturer is available, the
    /// selected anchors are highlighted, the page is captured, and the
    /// highlight is reverted. The artifact is attached to every candidate.
    pub async fn extract<P: Page>(
        &self,
        page: &mut P,
        source_url: &str,
        seen: &HashSet<String>,
        capturer: Option<&mut Capturer>,
    ) -> Vec<Link> {
        let anchors = match tokio::time::timeout(self.timeout, page.anchors()).await {
            Ok(Ok(anchors)) => anchors,
            Ok(Err(e)) => {
                tracing::warn!("Failed to read anchors on {}: {}", source_url, e);
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!(
                    "Reading anchors on {} timed out after {} ms",
                    source_url,
                    self.timeout.as_millis()
                );
                return Vec::new();
            }
        };

        let candidates = select_candidates(&anchors, source_url, seen, self.max_links);
        tracing::debug!(
            "Found {} anchors on {}, {} new",
            anchors.len(),
            source_url,
            candidates.len()
        );

        match capturer {
            Some(capturer) if self.annotate_source && !candidates.is_empty() => {
                self.annotate(page, source_url, &anchors, candidates, capturer)
                    .await
            }
            _ => candidates,
        }
    }

    async fn annotate<P: Page>(
        &self,
        page: &mut P,
        source_url: &str,
        anchors: &[Anchor],
        candidates: Vec<Link>,
        capturer: &mut Capturer,
    ) -> Vec<Link> {
        let urls: HashSet<&str> = candidates.iter().map(|l| l.url()).collect();
        let hrefs: Vec<String> = anchors
            .iter()
            .filter(|a| {
                normalize_url(&a.href).map_or(false, |u| urls.contains(u.as_str()))
            })
            .map(|a| a.href.clone())
            .collect();

        let annotation = Annotation::apply(page, &hrefs, &self.highlight_style, self.timeout).await;
        let artifact = capturer.capture(page, source_url, SOURCE_SUFFIX).await;
        annotation.revert(page).await;

        match artifact {
            Some(artifact) => candidates
                .into_iter()
                .map(|link| link.with_screenshot(artifact.clone()))
                .collect(),
            None => candidates,
        }
    }
}

/// A highlight applied to the page that must be reverted
#[must_use = "an applied annotation must be reverted"]
pub struct Annotation {
    timeout: Duration,
}

impl Annotation {
    /// Highlights the anchors pointing at `hrefs`
    ///
    /// A failure is logged; the returned token still reverts whatever part
    /// of the highlight made it onto the page.
    pub async fn apply<P: Page>(page: &mut P, hrefs: &[String], style: &str, timeout: Duration) -> Self {
        match tokio::time::timeout(timeout, page.highlight(hrefs, style)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to highlight anchors: {}", e),
            Err(_) => tracing::warn!("Highlighting anchors timed out"),
        }
        Self { timeout }
    }

    /// Restores the page
    pub async fn revert<P: Page>(self, page: &mut P) {
        match tokio::time::timeout(self.timeout, page.clear_highlight()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to clear highlight: {}", e),
            Err(_) => tracing::warn!("Clearing highlight timed out"),
        }
    }
}
