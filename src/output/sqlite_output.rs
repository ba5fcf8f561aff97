//! SQLite report sink
//!
//! Each crawl creates one `runs` row. Links are inserted as they are
//! recorded, so an interrupted crawl still leaves its partial results behind.
//! The run row is completed with totals and a status when the report is
//! attached.

use crate::output::report::Report;
use crate::output::schema::initialize_schema;
use crate::output::traits::{OutputError, OutputResult, ReportSink};
use crate::state::Link;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// Status of a run row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Passed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Report sink that persists runs and links to SQLite
pub struct SqliteReportSink {
    conn: Connection,
    run_id: i64,
    position: i64,
}

impl SqliteReportSink {
    /// Opens (or creates) the database and starts a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration driving this run
    pub fn open(path: &Path, config_hash: &str) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::start(conn, config_hash)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::start(conn, config_hash)
    }

    fn start(conn: Connection, config_hash: &str) -> OutputResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![
                Utc::now().to_rfc3339(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        let run_id = conn.last_insert_rowid();
        tracing::debug!("Recording run {} to SQLite", run_id);

        Ok(Self {
            conn,
            run_id,
            position: 0,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }
}

impl ReportSink for SqliteReportSink {
    fn record(&mut self, link: &Link) -> OutputResult<()> {
        self.position += 1;

        // Stored as a JSON array of artifact paths
        let screenshots = if link.screenshots().is_empty() {
            None
        } else {
            let paths: Vec<&str> = link.screenshots().iter().map(|a| a.as_str()).collect();
            Some(
                serde_json::to_string(&paths)
                    .map_err(|e| OutputError::Format(e.to_string()))?,
            )
        };

        self.conn.execute(
            "INSERT INTO links (run_id, position, url, parent_url, anchor_text, status_code,
                                status_text, failure_reason, outcome, screenshots, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                self.run_id,
                self.position,
                link.url(),
                link.parent_url(),
                link.anchor_text(),
                link.status_code(),
                link.status_text(),
                link.failure_reason(),
                link.state().to_db_string(),
                screenshots,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn attach(&mut self, report: &Report) -> OutputResult<()> {
        let status = if report.total_broken() == 0 {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        };
        let finished_at = report.finished_at().unwrap_or_else(Utc::now);

        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, total_checked = ?3, total_broken = ?4
             WHERE id = ?5",
            params![
                finished_at.to_rfc3339(),
                status.to_db_string(),
                report.total_checked() as i64,
                report.total_broken() as i64,
                self.run_id
            ],
        )?;

        tracing::info!("Run {} saved to database", self.run_id);
        Ok(())
    }
}
