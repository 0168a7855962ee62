//! Queries for the issues table — detected problem lifecycle.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StorageError;
use vigil_core::types::CandidateIssue;

/// An issue record.
#[derive(Debug, Clone)]
pub struct IssueRow {
    pub id: i64,
    pub fingerprint: String,
    pub entity_key: String,
    pub kind: String,
    pub severity: String,
    pub description: String,
    pub first_seen: i64,
    pub last_seen: i64,
    pub status: String,
    pub resolved_at: Option<i64>,
}

fn row_to_issue(row: &rusqlite::Row<'_>) -> rusqlite::Result<IssueRow> {
    Ok(IssueRow {
        id: row.get(0)?,
        fingerprint: row.get(1)?,
        entity_key: row.get(2)?,
        kind: row.get(3)?,
        severity: row.get(4)?,
        description: row.get(5)?,
        first_seen: row.get(6)?,
        last_seen: row.get(7)?,
        status: row.get(8)?,
        resolved_at: row.get(9)?,
    })
}

const ISSUE_COLUMNS: &str = "id, fingerprint, entity_key, kind, severity, description,
     first_seen, last_seen, status, resolved_at";

/// The open issue for a fingerprint, if any. At most one exists.
pub fn get_open_by_fingerprint(
    conn: &Connection,
    fingerprint: &str,
) -> Result<Option<IssueRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE fingerprint = ?1 AND status = 'open'"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.query_row(params![fingerprint], row_to_issue)
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// All open issues for an entity.
pub fn open_for_entity(
    conn: &Connection,
    entity_key: &str,
) -> Result<Vec<IssueRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE entity_key = ?1 AND status = 'open'"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![entity_key], row_to_issue)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// All open issues.
pub fn query_open(conn: &Connection) -> Result<Vec<IssueRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE status = 'open' ORDER BY first_seen"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map([], row_to_issue)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Open a new issue from a candidate. Returns the row id.
pub fn insert_open(
    conn: &Connection,
    candidate: &CandidateIssue,
    now: i64,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO issues
                (fingerprint, entity_key, kind, severity, description, first_seen, last_seen, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 'open')",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        candidate.fingerprint,
        candidate.entity_key,
        candidate.kind.as_str(),
        candidate.severity.as_str(),
        candidate.description,
        now
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(conn.last_insert_rowid())
}

/// Refresh an open issue from this run's candidate: last_seen always,
/// severity and description when the evaluator changed them.
pub fn touch_open(
    conn: &Connection,
    id: i64,
    candidate: &CandidateIssue,
    now: i64,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "UPDATE issues SET last_seen = ?1, severity = ?2, description = ?3 WHERE id = ?4",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        now,
        candidate.severity.as_str(),
        candidate.description,
        id
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Resolve an open issue.
pub fn resolve(conn: &Connection, id: i64, resolved_at: i64) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "UPDATE issues SET status = 'resolved', resolved_at = ?1 WHERE id = ?2",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![resolved_at, id])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Recent issues regardless of status, newest first.
pub fn query_recent(conn: &Connection, limit: usize) -> Result<Vec<IssueRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues ORDER BY last_seen DESC, id DESC LIMIT ?1"
        ))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![limit as i64], row_to_issue)
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
