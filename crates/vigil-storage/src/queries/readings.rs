//! Queries for the readings table — append-only observation log.

use std::collections::BTreeMap;

use rusqlite::{params, Connection};
use vigil_core::errors::StorageError;
use vigil_core::types::{AttrValue, Reading};

/// Insert a reading. Returns the row id.
pub fn insert(conn: &Connection, reading: &Reading) -> Result<i64, StorageError> {
    let attrs_json =
        serde_json::to_string(&reading.attrs).map_err(|e| StorageError::CorruptRow {
            table: "readings".to_string(),
            message: e.to_string(),
        })?;
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO readings (run_id, entity_key, recorded_at, attrs_json)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    stmt.execute(params![
        reading.run_id,
        reading.entity_key,
        reading.recorded_at,
        attrs_json
    ])
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
    Ok(conn.last_insert_rowid())
}

/// Recent readings for an entity, newest first.
pub fn query_for_entity(
    conn: &Connection,
    entity_key: &str,
    limit: usize,
) -> Result<Vec<Reading>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT run_id, entity_key, recorded_at, attrs_json FROM readings
             WHERE entity_key = ?1 ORDER BY recorded_at DESC, id DESC LIMIT ?2",
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map(params![entity_key, limit as i64], |row| {
            let attrs_json: String = row.get(3)?;
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?, attrs_json))
        })
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut readings = Vec::new();
    for row in rows {
        let (run_id, entity_key, recorded_at, attrs_json) =
            row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        let attrs: BTreeMap<String, AttrValue> = serde_json::from_str(&attrs_json)
            .map_err(|e| StorageError::CorruptRow {
                table: "readings".to_string(),
                message: e.to_string(),
            })?;
        readings.push(Reading {
            entity_key,
            run_id,
            recorded_at,
            attrs,
        });
    }
    Ok(readings)
}

/// Total number of readings.
pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}
