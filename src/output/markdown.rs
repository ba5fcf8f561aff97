//! Markdown report generation
//!
//! Renders a finished report as a human-readable markdown file: run
//! information, totals, a status-code breakdown, a table of broken links,
//! and the verdict.

use crate::output::report::Report;
use crate::output::traits::{OutputResult, ReportSink};
use crate::state::LinkState;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Report sink that writes a markdown summary when the crawl finishes
pub struct MarkdownReportSink {
    path: PathBuf,
}

impl MarkdownReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for MarkdownReportSink {
    fn attach(&mut self, report: &Report) -> OutputResult<()> {
        generate_markdown_report(report, &self.path)?;
        tracing::info!("Markdown report written to {}", self.path.display());
        Ok(())
    }
}

/// Writes the markdown rendering of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The finished report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the file
pub fn generate_markdown_report(report: &Report, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report as markdown
pub fn format_markdown_report(report: &Report) -> String {
    let mut md = String::new();

    md.push_str("# Linkwalk Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at().to_rfc3339()));
    if let Some(finished) = report.finished_at() {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration_seconds() {
        md.push_str(&format!("- **Duration**: {} seconds\n", duration));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", report.config_hash()));

    // Totals
    let checked = report.total_checked();
    let broken = report.total_broken();
    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Links Checked**: {}\n", checked));
    md.push_str(&format!("- **Broken Links**: {}\n", broken));
    let errored = report
        .entries()
        .iter()
        .filter(|l| l.state() == LinkState::Errored)
        .count();
    if errored > 0 {
        md.push_str(&format!("  - of which without a response: {}\n", errored));
    }
    if checked > 0 {
        md.push_str(&format!(
            "- **Success Rate**: {:.2}%\n",
            (checked - broken) as f64 / checked as f64 * 100.0
        ));
    }
    md.push('\n');

    // Status codes
    md.push_str("## Status Codes\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    for (status, count) in report.status_breakdown() {
        let label = status.map_or_else(|| "No response".to_string(), |s| s.to_string());
        md.push_str(&format!("| {} | {} |\n", label, count));
    }
    md.push('\n');

    // Broken links
    md.push_str("## Broken Links\n\n");
    if broken == 0 {
        md.push_str("No broken links found.\n\n");
    } else {
        md.push_str("| URL | Found on | Anchor | Reason |\n");
        md.push_str("|-----|----------|--------|--------|\n");
        for link in report.broken_links() {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(link.url()),
                escape_cell(link.parent_url().unwrap_or("(seed)")),
                escape_cell(link.anchor_text().unwrap_or("")),
                escape_cell(link.failure_reason().unwrap_or(""))
            ));
        }
        md.push('\n');
    }

    // Screenshots
    let artifacts: Vec<_> = report
        .entries()
        .iter()
        .flat_map(|link| link.screenshots().iter().map(move |a| (link.url(), a)))
        .collect();
    if !artifacts.is_empty() {
        md.push_str("## Screenshots\n\n");
        for (url, artifact) in artifacts {
            md.push_str(&format!("- {}: `{}`\n", url, artifact));
        }
        md.push('\n');
    }

    md.push_str("## Verdict\n\n");
    if broken == 0 {
        md.push_str("**PASS**\n");
    } else {
        md.push_str(&format!("**FAIL**: {} broken link(s)\n", broken));
    }

    md
}

/// Keeps table cells on one line and escapes column separators
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}
