//! Output sink traits and errors
//!
//! Two kinds of sinks receive crawl output:
//! - `ReportSink`: gets every finalized link as it is recorded, and the full
//!   report once the crawl is over
//! - `ArtifactSink`: persists captured page snapshots and hands back a
//!   reference that is attached to the link

use crate::engine::Snapshot;
use crate::output::{ArtifactRef, Report};
use crate::state::Link;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives report data as the crawl proceeds
///
/// Sink failures never stop the crawl: the aggregator logs and swallows them.
pub trait ReportSink {
    /// Called once per finalized link, in processing order
    fn record(&mut self, _link: &Link) -> OutputResult<()> {
        Ok(())
    }

    /// Called once with the finished report
    fn attach(&mut self, report: &Report) -> OutputResult<()>;
}

/// Persists page snapshots
pub trait ArtifactSink {
    /// Stores `snapshot` and returns a reference to it
    ///
    /// # Arguments
    ///
    /// * `name` - URL of the captured page
    /// * `suffix` - Capture purpose (e.g., "source", "success", "failure")
    /// * `snapshot` - The captured bytes
    fn store(&mut self, name: &str, suffix: &str, snapshot: &Snapshot)
        -> OutputResult<ArtifactRef>;
}
