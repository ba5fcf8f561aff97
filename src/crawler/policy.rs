//! Request interception policy
//!
//! Every request an engine intercepts during a navigation is run through
//! `RequestPolicy::decide`. Only document requests (top-level or frame
//! navigations) may continue; everything else is aborted. An optional host
//! allow-list further restricts document requests.

use crate::config::{DomainConfig, DomainMode};
use crate::url::DomainPattern;
use crate::UrlError;

/// Resource types as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    Other,
}

/// A request paused by the engine, waiting for a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub url: String,
    pub resource: ResourceKind,
}

impl InterceptedRequest {
    pub fn document(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            resource: ResourceKind::Document,
        }
    }
}

/// What the engine should do with an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDecision {
    Continue,
    Abort,
}

/// Decides which intercepted requests may reach the network
#[derive(Debug, Clone, Default)]
pub struct RequestPolicy {
    allow: Option<DomainPattern>,
    mode: DomainMode,
}

impl RequestPolicy {
    /// A policy that only filters by resource type
    pub fn documents_only() -> Self {
        Self::default()
    }

    /// A policy that also checks document hosts against `allow`
    pub fn with_allow_list(allow: DomainPattern, mode: DomainMode) -> Self {
        Self {
            allow: Some(allow),
            mode,
        }
    }

    /// Builds the policy from configuration
    ///
    /// The allow-list is only applied when `enforce` is set.
    pub fn from_config(config: &DomainConfig) -> Result<Self, UrlError> {
        match (&config.allow, config.enforce) {
            (Some(pattern), true) => Ok(Self::with_allow_list(
                DomainPattern::parse(pattern)?,
                config.mode,
            )),
            _ => Ok(Self::documents_only()),
        }
    }

    pub fn decide(&self, request: &InterceptedRequest) -> RequestDecision {
        if request.resource != ResourceKind::Document {
            tracing::trace!("Aborting {:?} request: {}", request.resource, request.url);
            return RequestDecision::Abort;
        }

        let Some(allow) = &self.allow else {
            return RequestDecision::Continue;
        };

        if request.url == crate::engine::BLANK_PAGE || allow.matches_url(&request.url) {
            return RequestDecision::Continue;
        }

        match self.mode {
            DomainMode::Reject => {
                tracing::debug!("Rejecting off-domain document {} (allow: {})", request.url, allow);
                RequestDecision::Abort
            }
            DomainMode::Observe => {
                tracing::debug!("Off-domain document {} continues (allow: {})", request.url, allow);
                RequestDecision::Continue
            }
        }
    }

    /// Shorthand for deciding a document request
    pub fn allows_document(&self, url: &str) -> bool {
        self.decide(&InterceptedRequest::document(url)) == RequestDecision::Continue
    }
}
