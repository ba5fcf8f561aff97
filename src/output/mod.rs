//! Output module for crawl reports and artifacts
//!
//! This module handles:
//! - Aggregating finalized links into the report and the verdict
//! - Writing markdown summaries and SQLite run records
//! - Storing screenshot artifacts
//! - Reading statistics of stored runs

mod artifacts;
mod markdown;
mod report;
mod schema;
mod sqlite_output;
pub mod stats;
mod traits;

pub use artifacts::{ArtifactRef, DirectorySink};
pub use markdown::{format_markdown_report, generate_markdown_report, MarkdownReportSink};
pub use report::{CrawlVerdict, Report, ReportAggregator};
pub use sqlite_output::{RunStatus, SqliteReportSink};
pub use stats::{load_statistics, print_statistics, RunStatistics};
pub use traits::{ArtifactSink, OutputError, OutputResult, ReportSink};

use crate::config::OutputConfig;
use std::path::Path;

/// Builds the report sinks requested by the output configuration
///
/// # Arguments
///
/// * `config` - The output configuration
/// * `config_hash` - Hash of the configuration file, stored with each run
///
/// # Returns
///
/// * `Ok(sinks)` - One sink per configured output
/// * `Err(OutputError)` - The database could not be opened
pub fn build_report_sinks(
    config: &OutputConfig,
    config_hash: &str,
) -> OutputResult<Vec<Box<dyn ReportSink + Send>>> {
    let mut sinks: Vec<Box<dyn ReportSink + Send>> = Vec::new();

    if let Some(path) = &config.summary_path {
        sinks.push(Box::new(MarkdownReportSink::new(path)));
    }

    if let Some(path) = &config.database_path {
        sinks.push(Box::new(SqliteReportSink::open(Path::new(path), config_hash)?));
    }

    Ok(sinks)
}
