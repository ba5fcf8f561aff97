//! Browser session lifecycle
//!
//! Long crawls accumulate resources inside the engine (cache, storage,
//! detached DOM). Before every navigation the session manager picks one of:
//! - `Relaunch`: close and launch a fresh browser, every `R` links
//! - `Reset`: send the existing page to `about:blank`
//! - `Reuse`: use the page as-is (only for the first link)
//!
//! No relaunch happens at `count == M`, since the crawl cannot continue
//! past that link.

use crate::engine::{Browser, EngineError, EngineResult, NavigationOptions, Page, BLANK_PAGE};

/// Action taken before a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Reuse,
    Reset,
    Relaunch,
}

/// Chooses the action before processing link number `count` (1-based)
///
/// # Arguments
///
/// * `count` - Number of links processed including the upcoming one
/// * `relaunch_interval` - `R`
/// * `max_links` - `M`
pub fn plan(count: usize, relaunch_interval: usize, max_links: usize) -> SessionAction {
    if count > 0 && relaunch_interval > 0 && count % relaunch_interval == 0 && count != max_links
    {
        SessionAction::Relaunch
    } else if count != 1 {
        SessionAction::Reset
    } else {
        SessionAction::Reuse
    }
}

/// Sole owner of the browser session
pub struct SessionManager<B: Browser> {
    browser: B,
    options: NavigationOptions,
    relaunch_interval: usize,
    max_links: usize,
    processed: usize,
    relaunches: usize,
    running: bool,
}

impl<B: Browser> SessionManager<B> {
    pub fn new(
        browser: B,
        options: NavigationOptions,
        relaunch_interval: usize,
        max_links: usize,
    ) -> Self {
        Self {
            browser,
            options,
            relaunch_interval,
            max_links,
            processed: 0,
            relaunches: 0,
            running: false,
        }
    }

    /// Launches the browser
    pub async fn start(&mut self) -> EngineResult<()> {
        self.launch().await?;
        tracing::debug!("Browser session started");
        Ok(())
    }

    /// Launches under the navigation timeout; a timeout is fatal like any
    /// other launch failure
    async fn launch(&mut self) -> EngineResult<()> {
        match tokio::time::timeout(self.options.timeout, self.browser.launch()).await {
            Ok(result) => result?,
            Err(_) => return Err(EngineError::Timeout(self.options.timeout_ms())),
        }
        self.running = true;
        Ok(())
    }

    /// Closes under the navigation timeout, logging failures
    async fn close(&mut self) {
        match tokio::time::timeout(self.options.timeout, self.browser.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to close browser: {}", e),
            Err(_) => tracing::warn!(
                "Closing browser timed out after {} ms",
                self.options.timeout_ms()
            ),
        }
        self.running = false;
    }

    /// Prepares the page for the next navigation
    ///
    /// Only a failed launch is an error; a failed reset is logged and the
    /// page is handed out in whatever state it is in.
    pub async fn prepare(&mut self) -> EngineResult<&mut B::Page> {
        if !self.running {
            self.start().await?;
        }

        self.processed += 1;
        match plan(self.processed, self.relaunch_interval, self.max_links) {
            SessionAction::Relaunch => self.relaunch().await?,
            SessionAction::Reset => self.reset().await,
            SessionAction::Reuse => {}
        }

        self.browser.current_page()
    }

    async fn relaunch(&mut self) -> EngineResult<()> {
        tracing::debug!("Relaunching browser before link {}", self.processed);

        self.close().await;
        self.launch().await?;
        self.relaunches += 1;
        Ok(())
    }

    async fn reset(&mut self) {
        let page = match self.browser.current_page() {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("No page to reset: {}", e);
                return;
            }
        };

        match tokio::time::timeout(self.options.timeout, page.goto(BLANK_PAGE, &self.options)).await
        {
            Ok(Ok(_)) => tracing::trace!("Page reset to {}", BLANK_PAGE),
            Ok(Err(e)) => tracing::warn!("Failed to reset page: {}", e),
            Err(_) => tracing::warn!(
                "Resetting page timed out after {} ms",
                self.options.timeout_ms()
            ),
        }
    }

    /// Closes the browser, logging failures
    pub async fn shutdown(&mut self) {
        if self.running {
            self.close().await;
        }
    }

    /// Number of links prepared so far
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn relaunches(&self) -> usize {
        self.relaunches
    }
}
