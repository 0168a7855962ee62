//! Queries for the probe_failures table — "we couldn't check" records.

use rusqlite::{params, Connection};
use vigil_core::errors::StorageError;

/// A probe failure record.
#[derive(Debug, Clone)]
pub struct ProbeFailureRow {
    pub id: i64,
    pub run_id: i64,
    pub entity_key: String,
    pub reason: String,
    pub occurred_at: i64,
}

/// Insert a probe failure for a run.
pub fn insert(
    conn: &Connection,
    run_id: i64,
    entity_key: &str,
    reason: &str,
    occurred_at: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO probe_failures (run_id, entity_key, reason, occurred_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![run_id, entity_key, reason, occurred_at])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// All probe failures for a run.
pub fn for_run(conn: &Connection, run_id: i64) -> Result<Vec<ProbeFailureRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, run_id, entity_key, reason, occurred_at
             FROM probe_failures WHERE run_id = ?1 ORDER BY id",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok(ProbeFailureRow {
                id: row.get(0)?,
                run_id: row.get(1)?,
                entity_key: row.get(2)?,
                reason: row.get(3)?,
                occurred_at: row.get(4)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
