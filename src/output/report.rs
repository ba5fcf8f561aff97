//! Report aggregation and the final verdict
//!
//! The aggregator is the single writer of the report. Every finalized link
//! is appended in processing order and forwarded to the configured sinks;
//! totals are projections of the entries, never separate counters.

use crate::output::traits::ReportSink;
use crate::state::Link;
use crate::LinkwalkError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Ordered record of every processed link
#[derive(Debug, Clone)]
pub struct Report {
    entries: Vec<Link>,
    config_hash: String,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn new(config_hash: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            config_hash: config_hash.into(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn entries(&self) -> &[Link] {
        &self.entries
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Seconds between start and finish, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn total_checked(&self) -> usize {
        self.entries.len()
    }

    pub fn total_broken(&self) -> usize {
        self.broken_links().count()
    }

    /// Entries carrying a failure reason, in processing order
    pub fn broken_links(&self) -> impl Iterator<Item = &Link> {
        self.entries.iter().filter(|link| link.state().is_failure())
    }

    /// The last broken entry rendered as `<url>: <reason>`
    pub fn last_failure(&self) -> Option<String> {
        self.broken_links().last().map(|link| {
            format!(
                "{}: {}",
                link.url(),
                link.failure_reason().unwrap_or_default()
            )
        })
    }

    /// Count of entries per status code; entries without one are keyed `None`
    pub fn status_breakdown(&self) -> BTreeMap<Option<u16>, usize> {
        let mut breakdown = BTreeMap::new();
        for link in &self.entries {
            *breakdown.entry(link.status_code()).or_insert(0) += 1;
        }
        breakdown
    }
}

/// Final outcome of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlVerdict {
    pub total_checked: usize,
    pub total_broken: usize,
    /// `<url>: <reason>` of the last broken link
    pub last_failure: Option<String>,
}

impl CrawlVerdict {
    pub fn from_report(report: &Report) -> Self {
        Self {
            total_checked: report.total_checked(),
            total_broken: report.total_broken(),
            last_failure: report.last_failure(),
        }
    }

    pub fn passed(&self) -> bool {
        self.total_broken == 0
    }

    /// Converts a failing verdict into `LinkwalkError::BrokenLinks`
    pub fn into_result(self) -> Result<Self, LinkwalkError> {
        if self.passed() {
            return Ok(self);
        }
        Err(LinkwalkError::BrokenLinks {
            count: self.total_broken,
            detail: self.last_failure.unwrap_or_default(),
        })
    }
}

/// Collects finalized links and fans them out to report sinks
pub struct ReportAggregator {
    report: Report,
    sinks: Vec<Box<dyn ReportSink + Send>>,
}

impl ReportAggregator {
    pub fn new(config_hash: impl Into<String>, sinks: Vec<Box<dyn ReportSink + Send>>) -> Self {
        Self {
            report: Report::new(config_hash),
            sinks,
        }
    }

    /// Appends a finalized link and forwards it to every sink
    pub fn add_link(&mut self, link: Link) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.record(&link) {
                tracing::warn!("Report sink failed to record {}: {}", link.url(), e);
            }
        }
        self.report.entries.push(link);
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn total_checked(&self) -> usize {
        self.report.total_checked()
    }

    pub fn total_broken(&self) -> usize {
        self.report.total_broken()
    }

    /// Stamps the finish time, hands the report to every sink, and returns
    /// the verdict together with the final report
    pub fn finish(mut self) -> (CrawlVerdict, Report) {
        self.report.finished_at = Some(Utc::now());

        for sink in &mut self.sinks {
            if let Err(e) = sink.attach(&self.report) {
                tracing::warn!("Report sink failed to attach the report: {}", e);
            }
        }

        (CrawlVerdict::from_report(&self.report), self.report)
    }
}
