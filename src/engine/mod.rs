//! Browser engine capabilities
//!
//! The crawler never talks to a browser directly. It goes through two narrow
//! traits:
//! - `Browser`: session lifecycle (launch, close, current page)
//! - `Page`: navigation, DOM evaluation, highlighting, screenshots
//!
//! Engines:
//! - `http::HttpBrowser`: reqwest + scraper, always available
//! - `chrome::ChromeBrowser`: headless Chromium over CDP (feature `chrome`)

#[cfg(feature = "chrome")]
pub mod chrome;
#[cfg(test)]
pub(crate) mod fake;
pub mod http;

use crate::config::WaitUntil;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// URL used to put a page into a neutral state between navigations
pub const BLANK_PAGE: &str = "about:blank";

/// Errors raised by engine implementations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Browser session is not launched")]
    NotLaunched,

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("{0}")]
    Transport(String),

    #[error("Request to {url} was aborted by the request policy")]
    Aborted { url: String },

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Page evaluation failed: {0}")]
    Evaluation(String),

    #[error("Unsupported by this engine: {0}")]
    Unsupported(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Options applied to a single navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub timeout: Duration,
    pub wait_until: WaitUntil,
}

impl NavigationOptions {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// The response object produced by a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// HTTP status; `None` when the engine reported none
    pub status: Option<u16>,
    pub status_text: String,
}

impl NavigationResponse {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            status_text: status_text.into(),
        }
    }
}

/// An anchor element as seen in the loaded page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Anchor {
    /// The resolved href (browser `a.href` semantics)
    pub href: String,
    /// Visible text of the element
    #[serde(default)]
    pub text: String,
}

impl Anchor {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Captured visual state of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub bytes: Vec<u8>,
    /// File extension matching the bytes (e.g., "png", "html")
    pub extension: &'static str,
}

/// A browser session
///
/// Only the session manager calls these methods.
#[async_trait]
pub trait Browser: Send {
    type Page: Page;

    /// Starts a fresh session with one open page
    async fn launch(&mut self) -> EngineResult<()>;

    /// Tears the session down, releasing all engine resources
    async fn close(&mut self) -> EngineResult<()>;

    /// Returns the page of the running session
    fn current_page(&mut self) -> EngineResult<&mut Self::Page>;
}

/// A single page (tab) of a browser session
#[async_trait]
pub trait Page: Send {
    /// Navigates to `url`
    ///
    /// Returns `Ok(None)` when the navigation completed without a network
    /// response (e.g. `about:blank` or a same-document navigation).
    async fn goto(
        &mut self,
        url: &str,
        options: &NavigationOptions,
    ) -> EngineResult<Option<NavigationResponse>>;

    /// Evaluates the loaded DOM and returns its anchors in document order
    async fn anchors(&mut self) -> EngineResult<Vec<Anchor>>;

    /// Applies `style` to every anchor whose href is in `hrefs`
    async fn highlight(&mut self, hrefs: &[String], style: &str) -> EngineResult<()>;

    /// Restores anchors changed by `highlight`
    async fn clear_highlight(&mut self) -> EngineResult<()>;

    /// Captures the current page
    async fn screenshot(&mut self, full_page: bool) -> EngineResult<Snapshot>;
}
