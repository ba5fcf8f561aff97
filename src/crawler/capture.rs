//! Best-effort screenshot capture
//!
//! Capturing never affects a link's classification. Every failure (engine
//! error, timeout, storage error) is logged at `warn` and turned into `None`.

use crate::engine::Page;
use crate::output::{ArtifactRef, ArtifactSink};
use std::time::Duration;

/// Captures pages into an artifact sink
pub struct Capturer {
    sink: Box<dyn ArtifactSink + Send>,
    full_page: bool,
    timeout: Duration,
}

impl Capturer {
    pub fn new(sink: Box<dyn ArtifactSink + Send>, full_page: bool, timeout: Duration) -> Self {
        Self {
            sink,
            full_page,
            timeout,
        }
    }

    /// Captures `page` and stores it as `<name>`/`<suffix>`
    ///
    /// # Returns
    ///
    /// The stored artifact, or `None` if any step failed
    pub async fn capture<P: Page>(
        &mut self,
        page: &mut P,
        name: &str,
        suffix: &str,
    ) -> Option<ArtifactRef> {
        let snapshot = match tokio::time::timeout(self.timeout, page.screenshot(self.full_page)).await
        {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                tracing::warn!("Screenshot ({}) of {} failed: {}", suffix, name, e);
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    "Screenshot ({}) of {} timed out after {} ms",
                    suffix,
                    name,
                    self.timeout.as_millis()
                );
                return None;
            }
        };

        match self.sink.store(name, suffix, &snapshot) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                tracing::warn!("Failed to store {} screenshot of {}: {}", suffix, name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::{FakeBrowser, FakeSite};
    use crate::engine::{Browser, NavigationOptions};
    use crate::config::WaitUntil;
    use crate::output::DirectorySink;
    use tempfile::TempDir;

    fn options() -> NavigationOptions {
        NavigationOptions {
            timeout: Duration::from_secs(1),
            wait_until: WaitUntil::Load,
        }
    }

    #[tokio::test]
    async fn test_capture_stores_artifact() {
        let dir = TempDir::new().unwrap();
        let mut capturer =
            Capturer::new(Box::new(DirectorySink::new(dir.path())), false, Duration::from_secs(1));
        let mut browser = FakeBrowser::new(FakeSite::new());
        browser.launch().await.unwrap();
        let page = browser.current_page().unwrap();
        page.goto("https://example.com/", &options()).await.unwrap();

        let artifact = capturer
            .capture(page, "https://example.com/", "success")
            .await
            .unwrap();
        assert!(artifact.as_str().ends_with("-example_com-success.png"));
    }

    #[tokio::test]
    async fn test_capture_failure_is_none() {
        let dir = TempDir::new().unwrap();
        let mut capturer =
            Capturer::new(Box::new(DirectorySink::new(dir.path())), true, Duration::from_secs(1));
        let mut browser = FakeBrowser::new(FakeSite::new().failing_screenshots());
        browser.launch().await.unwrap();
        let page = browser.current_page().unwrap();

        assert!(capturer.capture(page, "https://example.com/", "failure").await.is_none());
    }
}
