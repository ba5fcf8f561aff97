//! Statistics from the report database
//!
//! Backs the `--stats` command: loads the most recent run and summarizes it
//! without crawling.

use crate::output::sqlite_output::RunStatus;
use crate::output::traits::{OutputError, OutputResult};
use crate::state::LinkState;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// Maximum number of failures listed by `print_statistics`
const MAX_LISTED_FAILURES: usize = 20;

/// Summary of one stored run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: RunStatus,
    pub config_hash: String,

    /// Number of links recorded for the run
    pub total_checked: u64,

    /// Count of links by outcome
    pub links_by_state: HashMap<LinkState, u64>,

    /// Failures as `(url, reason)` in processing order
    pub failures: Vec<(String, String)>,
}

impl RunStatistics {
    pub fn total_broken(&self) -> u64 {
        self.failures.len() as u64
    }
}

/// Loads statistics for the latest run in the database at `path`
///
/// # Returns
///
/// * `Ok(RunStatistics)` - Statistics of the most recent run
/// * `Err(OutputError)` - The database could not be read or holds no runs
pub fn load_statistics(path: &Path) -> OutputResult<RunStatistics> {
    // Without SQLITE_OPEN_CREATE a missing database is an error, not a new file
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    load_latest_run(&conn)
}

fn load_latest_run(conn: &Connection) -> OutputResult<RunStatistics> {
    let run = conn
        .query_row(
            "SELECT id, started_at, finished_at, status, config_hash
             FROM runs ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((run_id, started_at, finished_at, status, config_hash)) = run else {
        return Err(OutputError::Storage(
            "No crawl runs found in database".to_string(),
        ));
    };

    let mut links_by_state = HashMap::new();
    let mut stmt =
        conn.prepare("SELECT outcome, COUNT(*) FROM links WHERE run_id = ?1 GROUP BY outcome")?;
    let rows = stmt.query_map(params![run_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (outcome, count) = row?;
        if let Some(state) = LinkState::from_db_string(&outcome) {
            links_by_state.insert(state, count as u64);
        }
    }

    let mut stmt = conn.prepare(
        "SELECT url, failure_reason FROM links
         WHERE run_id = ?1 AND failure_reason IS NOT NULL AND failure_reason != ''
         ORDER BY position",
    )?;
    let failures = stmt
        .query_map(params![run_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(String, String)>, _>>()?;

    Ok(RunStatistics {
        run_id,
        started_at,
        finished_at,
        status: RunStatus::from_db_string(&status).unwrap_or(RunStatus::Running),
        config_hash,
        total_checked: links_by_state.values().sum(),
        links_by_state,
        failures,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Linkwalk Run {} ===\n", stats.run_id);

    println!("Run:");
    println!("  Started: {}", stats.started_at);
    if let Some(finished) = &stats.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Status: {}", stats.status.to_db_string());
    println!("  Config hash: {}", stats.config_hash);
    println!();

    println!("Links:");
    println!("  Checked: {}", stats.total_checked);
    println!("  Broken: {}", stats.total_broken());

    let mut state_counts: Vec<_> = stats.links_by_state.iter().collect();
    state_counts.sort_by(|a, b| b.1.cmp(a.1));
    for (state, count) in state_counts {
        let percentage = if stats.total_checked > 0 {
            (*count as f64 / stats.total_checked as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.failures.is_empty() {
        println!("Failures:");
        for (url, reason) in stats.failures.iter().take(MAX_LISTED_FAILURES) {
            println!("  - {}: {}", url, reason);
        }
        if stats.failures.len() > MAX_LISTED_FAILURES {
            println!("  ... and {} more", stats.failures.len() - MAX_LISTED_FAILURES);
        }
    }
}
