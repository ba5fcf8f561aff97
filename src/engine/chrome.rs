//! Headless Chromium engine over the DevTools protocol
//!
//! Request interception runs in a background task that listens for
//! `Fetch.requestPaused` and answers each event through `RequestPolicy`.

use super::{
    Anchor, Browser, EngineError, EngineResult, NavigationOptions, NavigationResponse, Page,
    Snapshot,
};
use crate::config::{EngineConfig, WaitUntil};
use crate::crawler::{InterceptedRequest, RequestDecision, RequestPolicy, ResourceKind};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{BrowserConfig, Page as CdpPage};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Extra wait after the load event for `WaitUntil::NetworkIdle`
const NETWORK_IDLE_SETTLE: Duration = Duration::from_millis(500);

const ANCHORS_SCRIPT: &str = r#"
Array.from(document.querySelectorAll('a[href]')).map(a => ({
    href: a.href,
    text: a.innerText || a.textContent || ''
}))
"#;

const CLEAR_SCRIPT: &str = r#"
document.querySelectorAll('a[data-linkwalk-style]').forEach(a => {
    a.setAttribute('style', a.getAttribute('data-linkwalk-style'));
    a.removeAttribute('data-linkwalk-style');
});
"#;

struct Session {
    browser: chromiumoxide::Browser,
    page: ChromePage,
    handler: JoinHandle<()>,
}

/// Browser session backed by a local Chromium process
pub struct ChromeBrowser {
    config: EngineConfig,
    policy: RequestPolicy,
    session: Option<Session>,
}

impl ChromeBrowser {
    pub fn new(config: &EngineConfig, policy: RequestPolicy) -> Self {
        Self {
            config: config.clone(),
            policy,
            session: None,
        }
    }

    fn browser_config(&self) -> EngineResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder().arg(format!(
            "--user-agent={}",
            self.config.user_agent
        ));
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(EngineError::Launch)
    }
}

#[async_trait]
impl Browser for ChromeBrowser {
    type Page = ChromePage;

    async fn launch(&mut self) -> EngineResult<()> {
        let (browser, mut handler) = chromiumoxide::Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| EngineError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page(super::BLANK_PAGE)
            .await
            .map_err(|e| EngineError::Launch(e.to_string()))?;

        let interceptor = intercept_requests(&page, self.policy.clone()).await?;

        self.session = Some(Session {
            browser,
            page: ChromePage { page, interceptor },
            handler,
        });
        Ok(())
    }

    async fn close(&mut self) -> EngineResult<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        session.page.interceptor.abort();
        let result = session.browser.close().await;
        if let Err(e) = session.browser.wait().await {
            tracing::debug!("Browser process did not exit cleanly: {}", e);
        }
        session.handler.abort();

        result
            .map(|_| ())
            .map_err(|e| EngineError::Transport(e.to_string()))
    }

    fn current_page(&mut self) -> EngineResult<&mut ChromePage> {
        self.session
            .as_mut()
            .map(|s| &mut s.page)
            .ok_or(EngineError::NotLaunched)
    }
}

/// Enables Fetch interception and answers paused requests in the background
async fn intercept_requests(page: &CdpPage, policy: RequestPolicy) -> EngineResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| EngineError::Launch(e.to_string()))?;

    page.execute(EnableParams::default())
        .await
        .map_err(|e| EngineError::Launch(e.to_string()))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let request = InterceptedRequest {
                url: event.request.url.clone(),
                resource: resource_kind(&event.resource_type),
            };

            let result = match policy.decide(&request) {
                RequestDecision::Continue => page
                    .execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ()),
                RequestDecision::Abort => page
                    .execute(FailRequestParams::new(
                        event.request_id.clone(),
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = result {
                tracing::trace!("Failed to answer paused request {}: {}", request.url, e);
            }
        }
    }))
}

/// Wait applied after `goto` has resolved on the load event
///
/// `DomContentLoaded` fires before load, so it needs nothing extra.
fn settle_delay(wait_until: WaitUntil) -> Option<Duration> {
    match wait_until {
        WaitUntil::Load | WaitUntil::DomContentLoaded => None,
        WaitUntil::NetworkIdle => Some(NETWORK_IDLE_SETTLE),
    }
}

fn resource_kind(resource: &ResourceType) -> ResourceKind {
    match resource {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        _ => ResourceKind::Other,
    }
}

/// The single tab of a Chromium session
pub struct ChromePage {
    page: CdpPage,
    interceptor: JoinHandle<()>,
}

impl ChromePage {
    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> EngineResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| EngineError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| EngineError::Evaluation(e.to_string()))
    }
}

#[async_trait]
impl Page for ChromePage {
    async fn goto(
        &mut self,
        url: &str,
        options: &NavigationOptions,
    ) -> EngineResult<Option<NavigationResponse>> {
        self.page
            .goto(url)
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let request = self
            .page
            .wait_for_navigation_response()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        if let Some(delay) = settle_delay(options.wait_until) {
            tokio::time::sleep(delay).await;
        }

        Ok(request
            .and_then(|r| r.response.clone())
            .map(|response| NavigationResponse {
                status: u16::try_from(response.status).ok(),
                status_text: response.status_text.clone(),
            }))
    }

    async fn anchors(&mut self) -> EngineResult<Vec<Anchor>> {
        self.evaluate(ANCHORS_SCRIPT).await
    }

    async fn highlight(&mut self, hrefs: &[String], style: &str) -> EngineResult<()> {
        let hrefs = serde_json::to_string(hrefs)
            .map_err(|e| EngineError::Evaluation(e.to_string()))?;
        let style = serde_json::to_string(style)
            .map_err(|e| EngineError::Evaluation(e.to_string()))?;
        let script = format!(
            r#"(() => {{
                const targets = new Set({hrefs});
                document.querySelectorAll('a[href]').forEach(a => {{
                    if (!targets.has(a.href)) return;
                    a.setAttribute('data-linkwalk-style', a.getAttribute('style') || '');
                    a.setAttribute('style', (a.getAttribute('style') || '') + ';' + {style});
                }});
                return true;
            }})()"#
        );
        self.evaluate::<bool>(&script).await.map(|_| ())
    }

    async fn clear_highlight(&mut self) -> EngineResult<()> {
        self.page
            .evaluate(CLEAR_SCRIPT)
            .await
            .map(|_| ())
            .map_err(|e| EngineError::Evaluation(e.to_string()))
    }

    async fn screenshot(&mut self, full_page: bool) -> EngineResult<Snapshot> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Snapshot {
            bytes,
            extension: "png",
        })
    }
}
