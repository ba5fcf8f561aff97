//! Crawler module for link traversal and classification
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier with its discovery cap
//! - Browser session lifecycle (relaunch and reset)
//! - Bounded navigation, request policy, and classification
//! - Link extraction with optional source-page annotation
//! - Overall crawl coordination

mod capture;
mod coordinator;
mod extractor;
mod frontier;
mod navigator;
mod policy;
mod session;

pub use capture::Capturer;
pub use coordinator::{run_crawl, Coordinator, CrawlOutcome};
pub use extractor::{select_candidates, Annotation, LinkExtractor};
pub use frontier::Frontier;
pub use navigator::{classify, NavigationOutcome, Navigator, NO_RESPONSE_REASON};
pub use policy::{InterceptedRequest, RequestDecision, RequestPolicy, ResourceKind};
pub use session::{plan, SessionAction, SessionManager};
