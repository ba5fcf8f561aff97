use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for linkwalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub screenshots: ScreenshotConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Absolute URLs to start from, processed in order
    pub seeds: Vec<String>,

    /// Discovery cap: maximum number of distinct URLs ever enqueued
    #[serde(rename = "max-links")]
    pub max_links: usize,

    /// Full browser relaunch every this many processed links
    #[serde(rename = "relaunch-interval", default = "default_relaunch_interval")]
    pub relaunch_interval: usize,

    /// Per-navigation timeout (milliseconds)
    #[serde(rename = "navigation-timeout", default = "default_navigation_timeout")]
    pub navigation_timeout: u64,

    /// Condition the engine waits for before a navigation counts as loaded
    #[serde(rename = "wait-until", default)]
    pub wait_until: WaitUntil,
}

impl CrawlerConfig {
    /// Returns the navigation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout)
    }
}

/// Navigation wait conditions
///
/// How the engines honor them:
/// - `chrome`: navigation resolves on the load event, so `DomContentLoaded`
///   waits as long as `Load`. `NetworkIdle` adds a fixed 500 ms settle delay
///   after load.
/// - `http`: the body is fully read when navigation returns, so all three
///   are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitUntil {
    /// The load event fired
    Load,
    /// The DOMContentLoaded event fired
    DomContentLoaded,
    /// The network has been mostly idle after load
    #[default]
    NetworkIdle,
}

/// Same-origin enforcement configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainConfig {
    /// Whether document requests are checked against `allow`
    #[serde(default)]
    pub enforce: bool,

    /// Host pattern (e.g., "example.com" or "*.example.com")
    #[serde(default)]
    pub allow: Option<String>,

    /// What happens to an off-domain document request when enforcing
    #[serde(default)]
    pub mode: DomainMode,
}

/// Outcome for document requests that fail the domain check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainMode {
    /// Abort the request
    #[default]
    Reject,
    /// Let the request continue and log it
    Observe,
}

/// Screenshot capture configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotConfig {
    /// Highlight discovered anchors on the source page and capture it
    #[serde(rename = "source-annotation", default)]
    pub source_annotation: bool,

    /// Capture the destination page when the link succeeded
    #[serde(rename = "destination-success", default)]
    pub destination_success: bool,

    /// Capture the destination page when the link is broken
    #[serde(rename = "destination-failure", default)]
    pub destination_failure: bool,

    /// Capture the full scrollable page instead of the viewport
    #[serde(rename = "full-page", default)]
    pub full_page: bool,

    /// CSS applied to highlighted anchors
    #[serde(rename = "highlight-style", default = "default_highlight_style")]
    pub highlight_style: String,

    /// Directory where artifacts are written
    #[serde(default = "default_screenshot_directory")]
    pub directory: String,
}

impl ScreenshotConfig {
    /// Returns true if any capture toggle is enabled
    pub fn any_enabled(&self) -> bool {
        self.source_annotation || self.destination_success || self.destination_failure
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            source_annotation: false,
            destination_success: false,
            destination_failure: false,
            full_page: false,
            highlight_style: default_highlight_style(),
            directory: default_screenshot_directory(),
        }
    }
}

/// Browser engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Which engine drives navigation
    #[serde(default)]
    pub kind: EngineKind,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Run the browser without a window (chrome only)
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Path to the browser executable (chrome only)
    #[serde(default)]
    pub executable: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            user_agent: default_user_agent(),
            headless: default_headless(),
            executable: None,
        }
    }
}

/// Available engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Plain HTTP client with HTML parsing
    #[default]
    Http,
    /// Headless Chromium over CDP
    Chrome,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Chrome => "chrome",
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,

    /// Path to the SQLite database
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_relaunch_interval() -> usize {
    25
}

fn default_navigation_timeout() -> u64 {
    30_000
}

fn default_highlight_style() -> String {
    "outline: 3px solid #e11d48; outline-offset: 2px".to_string()
}

fn default_screenshot_directory() -> String {
    "./screenshots".to_string()
}

fn default_user_agent() -> String {
    format!("linkwalk/{}", env!("CARGO_PKG_VERSION"))
}

fn default_headless() -> bool {
    true
}
