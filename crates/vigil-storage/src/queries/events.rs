//! Queries for the events table — engine audit trail.

use rusqlite::{params, Connection};
use vigil_core::errors::StorageError;

/// Audit event types written by the engine.
pub const EVENT_ISSUE_OPENED: &str = "issue_opened";
pub const EVENT_ISSUE_RESOLVED: &str = "issue_resolved";
pub const EVENT_NOTIFICATION_SENT: &str = "notification_sent";
pub const EVENT_ACK_CREATED: &str = "ack_created";
pub const EVENT_ACK_REMOVED: &str = "ack_removed";

/// An audit event record.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub id: i64,
    pub occurred_at: i64,
    pub event_type: String,
    pub severity: Option<String>,
    pub entity_key: Option<String>,
    pub message: String,
    pub payload_json: Option<String>,
}

/// Insert an audit event.
pub fn insert(
    conn: &Connection,
    occurred_at: i64,
    event_type: &str,
    severity: Option<&str>,
    entity_key: Option<&str>,
    message: &str,
    payload_json: Option<&str>,
) -> Result<i64, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO events
                (occurred_at, event_type, severity, entity_key, message, payload_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        occurred_at,
        event_type,
        severity,
        entity_key,
        message,
        payload_json
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(conn.last_insert_rowid())
}

/// Recent audit events, newest first, optionally filtered by type.
pub fn query_recent(
    conn: &Connection,
    event_type: Option<&str>,
    limit: usize,
) -> Result<Vec<EventRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, occurred_at, event_type, severity, entity_key, message, payload_json
             FROM events
             WHERE (?1 IS NULL OR event_type = ?1)
             ORDER BY occurred_at DESC, id DESC LIMIT ?2",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![event_type, limit as i64], |row| {
            Ok(EventRow {
                id: row.get(0)?,
                occurred_at: row.get(1)?,
                event_type: row.get(2)?,
                severity: row.get(3)?,
                entity_key: row.get(4)?,
                message: row.get(5)?,
                payload_json: row.get(6)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
