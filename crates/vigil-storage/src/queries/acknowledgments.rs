//! Queries for the acknowledgments table — operator suppressions.

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StorageError;

/// An acknowledgment record.
#[derive(Debug, Clone)]
pub struct AckRow {
    pub entity_key: String,
    pub note: String,
    pub created_by: String,
    pub created_at: i64,
}

/// Get the acknowledgment for an entity.
pub fn get(conn: &Connection, entity_key: &str) -> Result<Option<AckRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_key, note, created_by, created_at
             FROM acknowledgments WHERE entity_key = ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.query_row(params![entity_key], |row| {
        Ok(AckRow {
            entity_key: row.get(0)?,
            note: row.get(1)?,
            created_by: row.get(2)?,
            created_at: row.get(3)?,
        })
    })
    .optional()
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Insert an acknowledgment. The caller checks for an existing row first;
/// the primary key backstops races from the dashboard side.
pub fn insert(conn: &Connection, ack: &AckRow) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO acknowledgments (entity_key, note, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![ack.entity_key, ack.note, ack.created_by, ack.created_at])
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Delete the acknowledgment for an entity. Returns whether a row existed.
pub fn delete(conn: &Connection, entity_key: &str) -> Result<bool, StorageError> {
    let deleted = conn
        .execute(
            "DELETE FROM acknowledgments WHERE entity_key = ?1",
            params![entity_key],
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(deleted > 0)
}

/// All acknowledgments, newest first.
pub fn all(conn: &Connection) -> Result<Vec<AckRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_key, note, created_by, created_at
             FROM acknowledgments ORDER BY created_at DESC",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map([], |row| {
            Ok(AckRow {
                entity_key: row.get(0)?,
                note: row.get(1)?,
                created_by: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
