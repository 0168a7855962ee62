//! Queries for the runs table — one row per evaluation pass.

use rusqlite::{params, Connection};
use vigil_core::errors::StorageError;

/// A run record.
#[derive(Debug, Clone)]
pub struct RunRow {
    pub id: i64,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub hostname: String,
    pub status: String,
    pub entities_checked: Option<i64>,
    pub issues_opened: Option<i64>,
    pub issues_resolved: Option<i64>,
    pub probe_failures: Option<i64>,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
}

/// Insert a new run (status = 'running'). Returns the row id.
pub fn insert_run_start(
    conn: &Connection,
    started_at: i64,
    hostname: &str,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO runs (started_at, hostname, status) VALUES (?1, ?2, 'running')",
        params![started_at, hostname],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(conn.last_insert_rowid())
}

/// Mark all stale 'running' runs as abandoned. A run left 'running' at
/// startup never committed its pass, so its evaluation state is absent by
/// construction; the row is kept so operators can see the interruption.
/// Returns how many rows were updated.
pub fn mark_abandoned_runs(conn: &Connection) -> Result<u64, StorageError> {
    let updated = conn
        .execute("UPDATE runs SET status = 'abandoned' WHERE status = 'running'", [])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(updated as u64)
}

/// Complete a run with its summary counts.
#[allow(clippy::too_many_arguments)]
pub fn complete_run(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    status: &str,
    entities_checked: i64,
    issues_opened: i64,
    issues_resolved: i64,
    probe_failures: i64,
    duration_ms: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE runs SET
            completed_at = ?1, status = ?2, entities_checked = ?3,
            issues_opened = ?4, issues_resolved = ?5, probe_failures = ?6,
            duration_ms = ?7
         WHERE id = ?8",
        params![
            completed_at,
            status,
            entities_checked,
            issues_opened,
            issues_resolved,
            probe_failures,
            duration_ms,
            id
        ],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Mark a run as failed with an error message (best effort on abort paths).
pub fn mark_run_failed(
    conn: &Connection,
    id: i64,
    completed_at: i64,
    error: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE runs SET completed_at = ?1, status = 'failed', error = ?2 WHERE id = ?3",
        params![completed_at, error, id],
    )
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Query recent runs, newest first.
pub fn query_recent(conn: &Connection, limit: usize) -> Result<Vec<RunRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, hostname, status, entities_checked,
                    issues_opened, issues_resolved, probe_failures, duration_ms, error
             FROM runs ORDER BY started_at DESC, id DESC LIMIT ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(RunRow {
                id: row.get(0)?,
                started_at: row.get(1)?,
                completed_at: row.get(2)?,
                hostname: row.get(3)?,
                status: row.get(4)?,
                entities_checked: row.get(5)?,
                issues_opened: row.get(6)?,
                issues_resolved: row.get(7)?,
                probe_failures: row.get(8)?,
                duration_ms: row.get(9)?,
                error: row.get(10)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// The most recent run, if any.
pub fn latest(conn: &Connection) -> Result<Option<RunRow>, StorageError> {
    Ok(query_recent(conn, 1)?.into_iter().next())
}
