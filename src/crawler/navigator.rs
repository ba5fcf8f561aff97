//! Navigation and classification
//!
//! The navigator issues one bounded navigation per link and classifies the
//! outcome:
//!
//! | Outcome | Classification | `failure_reason` |
//! |---------|----------------|------------------|
//! | Engine error or timeout | Errored | the error message |
//! | No response, or status 0 | Errored | `NO_RESPONSE_REASON` |
//! | Status < 400 | Succeeded | none |
//! | Status >= 400 | Broken | `Status code: <code> <text>` |

use crate::config::ScreenshotConfig;
use crate::crawler::capture::Capturer;
use crate::engine::{EngineError, NavigationOptions, NavigationResponse, Page};
use crate::state::{Link, LinkState};

/// Failure reason for navigations that produced no response
pub const NO_RESPONSE_REASON: &str = "No network response received";

/// First status code classified as broken
const BROKEN_STATUS_THRESHOLD: u16 = 400;

/// What a navigation produced, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The navigation threw or timed out
    Transport(String),
    /// The navigation completed without a response object
    NoResponse,
    Response(NavigationResponse),
}

/// Enriches `link` with the classification of `outcome`
pub fn classify(link: Link, outcome: NavigationOutcome) -> Link {
    match outcome {
        NavigationOutcome::Transport(error) => link.with_failure(error),
        NavigationOutcome::NoResponse => link.with_failure(NO_RESPONSE_REASON),
        NavigationOutcome::Response(response) => match response.status {
            None | Some(0) => link.with_failure(NO_RESPONSE_REASON),
            Some(status) if status < BROKEN_STATUS_THRESHOLD => {
                link.with_response(status, response.status_text)
            }
            Some(status) => {
                let reason = format!("Status code: {} {}", status, response.status_text);
                link.with_response(status, response.status_text)
                    .with_failure(reason.trim_end())
            }
        },
    }
}

/// Drives navigations for the coordinator
pub struct Navigator {
    options: NavigationOptions,
    capture_success: bool,
    capture_failure: bool,
}

impl Navigator {
    pub fn new(options: NavigationOptions, screenshots: &ScreenshotConfig) -> Self {
        Self {
            options,
            capture_success: screenshots.destination_success,
            capture_failure: screenshots.destination_failure,
        }
    }

    /// Navigates `page` to `url`, bounded by the navigation timeout
    pub async fn navigate<P: Page>(&self, page: &mut P, url: &str) -> NavigationOutcome {
        let timeout_ms = self.options.timeout_ms();

        match tokio::time::timeout(self.options.timeout, page.goto(url, &self.options)).await {
            Ok(Ok(Some(response))) => NavigationOutcome::Response(response),
            Ok(Ok(None)) => NavigationOutcome::NoResponse,
            Ok(Err(EngineError::Timeout(ms))) => {
                NavigationOutcome::Transport(navigation_timeout_reason(ms))
            }
            Ok(Err(e)) => NavigationOutcome::Transport(e.to_string()),
            Err(_) => NavigationOutcome::Transport(navigation_timeout_reason(timeout_ms)),
        }
    }

    /// Navigates to the link, classifies it, and captures the destination
    /// when the matching toggle is enabled
    pub async fn visit<P: Page>(
        &self,
        page: &mut P,
        link: Link,
        capturer: Option<&mut Capturer>,
    ) -> Link {
        let outcome = self.navigate(page, link.url()).await;
        let link = classify(link, outcome);

        let suffix = match link.state() {
            LinkState::Succeeded if self.capture_success => "success",
            LinkState::Broken if self.capture_failure => "failure",
            _ => return link,
        };

        let Some(capturer) = capturer else {
            return link;
        };

        let url = link.url().to_string();
        match capturer.capture(page, &url, suffix).await {
            Some(artifact) => link.with_screenshot(artifact),
            None => link,
        }
    }
}

fn navigation_timeout_reason(ms: u64) -> String {
    format!("Navigation timeout of {} ms exceeded", ms)
}
