//! Queries for the notification_ledger table — per-fingerprint send history.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StorageError;

/// A ledger record: when the last notification for a fingerprint was sent
/// and what the issue status was at that send.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub fingerprint: String,
    pub entity_key: String,
    pub kind: String,
    pub last_sent_at: i64,
    pub last_status: String,
}

/// Get the ledger entry for a fingerprint.
pub fn get(conn: &Connection, fingerprint: &str) -> Result<Option<LedgerRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT fingerprint, entity_key, kind, last_sent_at, last_status
             FROM notification_ledger WHERE fingerprint = ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.query_row(params![fingerprint], |row| {
        Ok(LedgerRow {
            fingerprint: row.get(0)?,
            entity_key: row.get(1)?,
            kind: row.get(2)?,
            last_sent_at: row.get(3)?,
            last_status: row.get(4)?,
        })
    })
    .optional()
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Record a send: insert or overwrite the entry for a fingerprint.
pub fn record_send(
    conn: &Connection,
    fingerprint: &str,
    entity_key: &str,
    kind: &str,
    sent_at: i64,
    status: &str,
) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO notification_ledger
                (fingerprint, entity_key, kind, last_sent_at, last_status)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(fingerprint) DO UPDATE SET
                last_sent_at = excluded.last_sent_at,
                last_status = excluded.last_status",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![fingerprint, entity_key, kind, sent_at, status])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Mark an entry resolved without touching last_sent_at. Used when a
/// recovery is suppressed (notices disabled or entity acknowledged) but
/// the fingerprint must not fire again until it reopens.
pub fn mark_resolved(conn: &Connection, fingerprint: &str) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "UPDATE notification_ledger SET last_status = 'resolved' WHERE fingerprint = ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![fingerprint])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Total number of ledger entries.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM notification_ledger", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
