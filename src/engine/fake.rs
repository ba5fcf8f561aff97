//! Scripted in-memory engine for unit tests

use super::{
    Anchor, Browser, EngineError, EngineResult, NavigationOptions, NavigationResponse, Page,
    Snapshot, BLANK_PAGE,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the fake engine answers a navigation
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Response(u16, &'static str),
    NoResponse,
    Fail(&'static str),
    Hang,
}

/// Site definition shared by every session of a `FakeBrowser`
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSite {
    responses: HashMap<String, Scripted>,
    anchors: HashMap<String, Vec<Anchor>>,
    fail_screenshots: bool,
    fail_launch: bool,
    fail_reset: bool,
    fail_anchors: bool,
    hang_launch: bool,
    hang_close: bool,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, scripted: Scripted) -> Self {
        self.responses.insert(url.to_string(), scripted);
        self
    }

    /// Adds anchors as `(href, text)` pairs
    pub fn links(mut self, url: &str, anchors: &[(&str, &str)]) -> Self {
        self.anchors.insert(
            url.to_string(),
            anchors.iter().map(|(h, t)| Anchor::new(*h, *t)).collect(),
        );
        self
    }

    pub fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// Navigations to the blank page fail
    pub fn failing_reset(mut self) -> Self {
        self.fail_reset = true;
        self
    }

    pub fn failing_anchors(mut self) -> Self {
        self.fail_anchors = true;
        self
    }

    /// Launches after the first one never complete
    pub fn hanging_launch(mut self) -> Self {
        self.hang_launch = true;
        self
    }

    pub fn hanging_close(mut self) -> Self {
        self.hang_close = true;
        self
    }
}

/// Everything the fake engine was asked to do
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub launches: usize,
    pub closes: usize,
    /// Non-blank navigations in order
    pub visits: Vec<String>,
    pub resets: usize,
    pub highlights: Vec<Vec<String>>,
    pub clears: usize,
    pub screenshots: usize,
}

pub(crate) struct FakeBrowser {
    site: Arc<FakeSite>,
    log: Arc<Mutex<FakeLog>>,
    page: Option<FakePage>,
}

impl FakeBrowser {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(FakeLog::default())),
            page: None,
        }
    }

    /// Handle to the call log that stays valid after the browser is moved
    pub fn log(&self) -> Arc<Mutex<FakeLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Page = FakePage;

    async fn launch(&mut self) -> EngineResult<()> {
        if self.site.fail_launch {
            return Err(EngineError::Launch("scripted launch failure".to_string()));
        }
        let launches = {
            let mut log = self.log.lock().unwrap();
            log.launches += 1;
            log.launches
        };
        if self.site.hang_launch && launches > 1 {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.page = Some(FakePage {
            site: Arc::clone(&self.site),
            log: Arc::clone(&self.log),
            current: None,
        });
        Ok(())
    }

    async fn close(&mut self) -> EngineResult<()> {
        self.log.lock().unwrap().closes += 1;
        if self.site.hang_close {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.page = None;
        Ok(())
    }

    fn current_page(&mut self) -> EngineResult<&mut FakePage> {
        self.page.as_mut().ok_or(EngineError::NotLaunched)
    }
}

pub(crate) struct FakePage {
    site: Arc<FakeSite>,
    log: Arc<Mutex<FakeLog>>,
    current: Option<String>,
}

#[async_trait]
impl Page for FakePage {
    async fn goto(
        &mut self,
        url: &str,
        _options: &NavigationOptions,
    ) -> EngineResult<Option<NavigationResponse>> {
        if url == BLANK_PAGE {
            self.log.lock().unwrap().resets += 1;
            if self.site.fail_reset {
                return Err(EngineError::Transport("scripted reset failure".to_string()));
            }
            self.current = None;
            return Ok(None);
        }

        self.log.lock().unwrap().visits.push(url.to_string());
        self.current = Some(url.to_string());

        match self.site.responses.get(url).cloned() {
            None => Ok(Some(NavigationResponse::new(200, "OK"))),
            Some(Scripted::Response(status, text)) => {
                Ok(Some(NavigationResponse::new(status, text)))
            }
            Some(Scripted::NoResponse) => Ok(None),
            Some(Scripted::Fail(message)) => Err(EngineError::Transport(message.to_string())),
            Some(Scripted::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }

    async fn anchors(&mut self) -> EngineResult<Vec<Anchor>> {
        if self.site.fail_anchors {
            return Err(EngineError::Evaluation("scripted evaluation failure".to_string()));
        }
        Ok(self
            .current
            .as_ref()
            .and_then(|url| self.site.anchors.get(url))
            .cloned()
            .unwrap_or_default())
    }

    async fn highlight(&mut self, hrefs: &[String], _style: &str) -> EngineResult<()> {
        self.log.lock().unwrap().highlights.push(hrefs.to_vec());
        Ok(())
    }

    async fn clear_highlight(&mut self) -> EngineResult<()> {
        self.log.lock().unwrap().clears += 1;
        Ok(())
    }

    async fn screenshot(&mut self, _full_page: bool) -> EngineResult<Snapshot> {
        self.log.lock().unwrap().screenshots += 1;
        if self.site.fail_screenshots {
            return Err(EngineError::Unsupported("scripted screenshot failure".to_string()));
        }
        Ok(Snapshot {
            bytes: b"fake".to_vec(),
            extension: "png",
        })
    }
}
