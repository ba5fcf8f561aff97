//! HTTP engine
//!
//! Navigates with a plain reqwest client and evaluates the returned HTML with
//! scraper. There is no rendering: `highlight` is a no-op and snapshots are
//! the raw document bytes.
//!
//! The request policy is applied to the top-level request and to every
//! redirect hop. Subresources are never fetched, which matches the policy's
//! verdict on them.

use super::{
    Anchor, Browser, EngineError, EngineResult, NavigationOptions, NavigationResponse, Page,
    Snapshot, BLANK_PAGE,
};
use crate::config::EngineConfig;
use crate::crawler::RequestPolicy;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use scraper::{Html, Selector};
use std::error::Error as StdError;
use url::Url;

/// Maximum redirect hops followed for one navigation
const MAX_REDIRECTS: usize = 10;

/// Browser session backed by an HTTP client
pub struct HttpBrowser {
    user_agent: String,
    policy: RequestPolicy,
    page: Option<HttpPage>,
}

impl HttpBrowser {
    pub fn new(config: &EngineConfig, policy: RequestPolicy) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            policy,
            page: None,
        }
    }

    fn build_client(&self) -> Result<Client, reqwest::Error> {
        let policy = self.policy.clone();
        let redirects = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error(format!("too many redirects (max {})", MAX_REDIRECTS))
            } else if !policy.allows_document(attempt.url().as_str()) {
                let message = format!(
                    "redirect to {} was aborted by the request policy",
                    attempt.url()
                );
                attempt.error(message)
            } else {
                attempt.follow()
            }
        });

        Client::builder()
            .user_agent(self.user_agent.clone())
            .redirect(redirects)
            .gzip(true)
            .brotli(true)
            .build()
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    type Page = HttpPage;

    async fn launch(&mut self) -> EngineResult<()> {
        let client = self
            .build_client()
            .map_err(|e| EngineError::Launch(describe_error(&e)))?;
        self.page = Some(HttpPage {
            client,
            policy: self.policy.clone(),
            document: None,
        });
        tracing::debug!("HTTP engine session started");
        Ok(())
    }

    async fn close(&mut self) -> EngineResult<()> {
        self.page = None;
        Ok(())
    }

    fn current_page(&mut self) -> EngineResult<&mut HttpPage> {
        self.page.as_mut().ok_or(EngineError::NotLaunched)
    }
}

/// The last document loaded by an `HttpPage`
struct LoadedDocument {
    url: Url,
    body: String,
}

/// A single "tab" of the HTTP engine
pub struct HttpPage {
    client: Client,
    policy: RequestPolicy,
    document: Option<LoadedDocument>,
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(
        &mut self,
        url: &str,
        options: &NavigationOptions,
    ) -> EngineResult<Option<NavigationResponse>> {
        self.document = None;

        if url == BLANK_PAGE {
            return Ok(None);
        }

        if !self.policy.allows_document(url) {
            return Err(EngineError::Aborted {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(options.timeout_ms())
                } else {
                    EngineError::Transport(describe_error(&e))
                }
            })?;

        let status = response.status();
        let final_url = response.url().clone();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.contains("html"));

        let body = if is_html {
            match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!("Failed to read body of {}: {}", final_url, e);
                    String::new()
                }
            }
        } else {
            String::new()
        };

        self.document = Some(LoadedDocument {
            url: final_url,
            body,
        });

        Ok(Some(NavigationResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
        )))
    }

    async fn anchors(&mut self) -> EngineResult<Vec<Anchor>> {
        Ok(self
            .document
            .as_ref()
            .map(|doc| parse_anchors(&doc.body, &doc.url))
            .unwrap_or_default())
    }

    async fn highlight(&mut self, hrefs: &[String], _style: &str) -> EngineResult<()> {
        tracing::trace!("HTTP engine cannot style {} anchors", hrefs.len());
        Ok(())
    }

    async fn clear_highlight(&mut self) -> EngineResult<()> {
        Ok(())
    }

    async fn screenshot(&mut self, _full_page: bool) -> EngineResult<Snapshot> {
        match &self.document {
            Some(doc) if !doc.body.is_empty() => Ok(Snapshot {
                bytes: doc.body.clone().into_bytes(),
                extension: "html",
            }),
            _ => Err(EngineError::Unsupported(
                "no HTML document loaded to capture".to_string(),
            )),
        }
    }
}

/// Lists the anchors of an HTML document in document order
///
/// Hrefs are resolved against `base` the way a browser resolves `a.href`;
/// an href that cannot be resolved is returned as written. Anchor text is
/// the element's text content.
pub fn parse_anchors(html: &str, base: &Url) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let resolved = base
                .join(href.trim())
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string());
            Some(Anchor::new(resolved, element.text().collect::<String>()))
        })
        .collect()
}

/// Flattens a reqwest error and its sources into one line
fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
