//! URL handling module for linkwalk
//!
//! This module provides link normalization (the identity used for
//! deduplication), host extraction, and the domain allow-list pattern.

mod domain;
mod matcher;
mod normalize;

pub use domain::extract_host;
pub use matcher::DomainPattern;
pub use normalize::normalize_url;
