//! Queries for the entity_state table — last committed reading per entity.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use vigil_core::errors::StorageError;
use vigil_core::types::{AttrValue, EntityState};

/// Get the state for an entity, if one has been committed.
pub fn get(conn: &Connection, entity_key: &str) -> Result<Option<EntityState>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT entity_key, run_id, recorded_at, attrs_json, sync_started_at
             FROM entity_state WHERE entity_key = ?1",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let row = stmt
        .query_row(params![entity_key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<i64>>(4)?,
            ))
        })
        .optional()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    match row {
        None => Ok(None),
        Some((entity_key, run_id, recorded_at, attrs_json, sync_started_at)) => {
            let attrs: BTreeMap<String, AttrValue> = serde_json::from_str(&attrs_json)
                .map_err(|e| StorageError::CorruptRow {
                    table: "entity_state".to_string(),
                    message: e.to_string(),
                })?;
            Ok(Some(EntityState {
                entity_key,
                run_id,
                recorded_at,
                attrs,
                sync_started_at,
            }))
        }
    }
}

/// Insert or overwrite the state for an entity.
pub fn upsert(conn: &Connection, state: &EntityState) -> Result<(), StorageError> {
    let attrs_json = serde_json::to_string(&state.attrs).map_err(|e| StorageError::CorruptRow {
        table: "entity_state".to_string(),
        message: e.to_string(),
    })?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO entity_state (entity_key, run_id, recorded_at, attrs_json, sync_started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(entity_key) DO UPDATE SET
                run_id = excluded.run_id,
                recorded_at = excluded.recorded_at,
                attrs_json = excluded.attrs_json,
                sync_started_at = excluded.sync_started_at",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        state.entity_key,
        state.run_id,
        state.recorded_at,
        attrs_json,
        state.sync_started_at
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(())
}

/// Total number of entity_state rows.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM entity_state", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
