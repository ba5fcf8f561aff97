//! Link records and their classification state
//!
//! A `Link` is created once (as a seed or by the extractor) and then enriched
//! by value as navigation proceeds. Its URL never changes after creation.
use crate::output::ArtifactRef;
use std::fmt;

/// Classification of a link, derived from the fields populated on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Not yet navigated
    Pending,

    /// Navigation returned a response with status below 400
    Succeeded,

    /// Navigation returned a response with status 400 or above
    Broken,

    /// Navigation failed, timed out, or produced no response
    Errored,
}

impl LinkState {
    /// Returns true for the states that count against the verdict
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Broken | Self::Errored)
    }

    /// Converts the state to its storage representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Broken => "broken",
            Self::Errored => "errored",
        }
    }

    /// Parses a state from its storage representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "succeeded" => Some(Self::Succeeded),
            "broken" => Some(Self::Broken),
            "errored" => Some(Self::Errored),
            _ => None,
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Succeeded => "Succeeded",
            Self::Broken => "Broken",
            Self::Errored => "Errored",
        };
        f.write_str(label)
    }
}

/// One seeded or discovered URL under evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    url: String,
    parent_url: Option<String>,
    anchor_text: Option<String>,
    status_code: Option<u16>,
    status_text: Option<String>,
    failure_reason: Option<String>,
    screenshots: Vec<ArtifactRef>,
}

impl Link {
    /// Creates a seed link (no parent page)
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_url: None,
            anchor_text: None,
            status_code: None,
            status_text: None,
            failure_reason: None,
            screenshots: Vec::new(),
        }
    }

    /// Creates a link discovered on `parent_url`
    pub fn discovered(
        url: impl Into<String>,
        parent_url: impl Into<String>,
        anchor_text: Option<String>,
    ) -> Self {
        Self {
            parent_url: Some(parent_url.into()),
            anchor_text,
            ..Self::seed(url)
        }
    }

    /// Records the navigation response status
    pub fn with_response(mut self, status_code: u16, status_text: impl Into<String>) -> Self {
        self.status_code = Some(status_code);
        self.status_text = Some(status_text.into());
        self
    }

    /// Records why the link failed
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    /// Attaches a captured artifact
    pub fn with_screenshot(mut self, artifact: ArtifactRef) -> Self {
        self.screenshots.push(artifact);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn parent_url(&self) -> Option<&str> {
        self.parent_url.as_deref()
    }

    pub fn anchor_text(&self) -> Option<&str> {
        self.anchor_text.as_deref()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn screenshots(&self) -> &[ArtifactRef] {
        &self.screenshots
    }

    /// Returns true if the link carries a non-empty failure reason
    pub fn is_broken(&self) -> bool {
        self.failure_reason.as_deref().map_or(false, |r| !r.is_empty())
    }

    /// Derives the classification from the populated fields
    pub fn state(&self) -> LinkState {
        match (self.status_code, self.is_broken()) {
            (None, false) => LinkState::Pending,
            (Some(_), false) => LinkState::Succeeded,
            (Some(_), true) => LinkState::Broken,
            (None, true) => LinkState::Errored,
        }
    }
}
