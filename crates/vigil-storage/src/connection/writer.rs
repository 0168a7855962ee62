//! Write transaction helper — BEGIN IMMEDIATE, auto-rollback on error.

use rusqlite::{Connection, TransactionBehavior};
use vigil_core::errors::StorageError;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
/// This acquires the write lock at transaction start, preventing
/// SQLITE_BUSY races with the dashboard's acknowledgment writes, and
/// guarantees the dashboard never observes a partially-updated run.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    // Open a BEGIN IMMEDIATE transaction: this issues the single BEGIN and
    // returns a transaction that rolls back on drop (unless committed).
    let tx = rusqlite::Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    #[test]
    fn failed_transaction_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result: Result<(), StorageError> = with_immediate_transaction(&conn, |tx| {
            tx.execute(
                "INSERT INTO events (occurred_at, event_type, message) VALUES (1, 'issue_opened', 'x')",
                [],
            )
            .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
            Err(StorageError::SqliteError {
                message: "synthetic failure".to_string(),
            })
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0, "rolled-back insert must not be visible");
    }
}
