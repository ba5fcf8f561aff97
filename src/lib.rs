//! linkwalk: a bounded breadth-first link integrity crawler
//!
//! This crate walks the links reachable from a set of seed URLs, navigates to
//! each one through a browser-like engine, classifies it as reachable or broken,
//! and produces an aggregate report with a pass/fail verdict.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for linkwalk operations
#[derive(Debug, Error)]
pub enum LinkwalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser engine error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{count} broken link(s) found. Last failure: {detail}")]
    BrokenLinks { count: usize, detail: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Engine '{0}' is not available in this build")]
    EngineUnavailable(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for linkwalk operations
pub type Result<T> = std::result::Result<T, LinkwalkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{CrawlVerdict, Report};
pub use state::{Link, LinkState};
pub use url::{normalize_url, DomainPattern};
