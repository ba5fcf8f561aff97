//! Configuration module for linkwalk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All values are fixed at crawl start.
//!
//! # Example
//!
//! ```no_run
//! use linkwalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkwalk.toml")).unwrap();
//! println!("Relaunching every {} links", config.crawler.relaunch_interval);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, DomainConfig, DomainMode, EngineConfig, EngineKind, OutputConfig,
    ScreenshotConfig, WaitUntil,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
