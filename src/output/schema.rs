//! Database schema for persisted crawl reports

/// SQL schema for the report database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    total_checked INTEGER NOT NULL DEFAULT 0,
    total_broken INTEGER NOT NULL DEFAULT 0
);

-- Every processed link, in processing order
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    parent_url TEXT,
    anchor_text TEXT,
    status_code INTEGER,
    status_text TEXT,
    failure_reason TEXT,
    outcome TEXT NOT NULL,
    screenshots TEXT,
    recorded_at TEXT NOT NULL,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_links_run ON links(run_id);
CREATE INDEX IF NOT EXISTS idx_links_outcome ON links(outcome);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
