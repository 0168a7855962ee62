//! Data retention for the monitor database.
//!
//! Two windows:
//! - **Metrics** (default 90 days): readings.
//! - **Events** (default 180 days): audit events, resolved issues,
//!   completed runs, resolved ledger entries.
//!
//! Hard guarantees regardless of age: an open issue is never deleted, and
//! the most recent reading per entity is never deleted, so EntityState
//! stays reconstructable even for entities idle longer than the window.

use rusqlite::{params, Connection};
use vigil_core::constants::SECS_PER_DAY;
use vigil_core::errors::StorageError;

/// Configurable retention windows.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Days to keep readings.
    pub metrics_days: u32,
    /// Days to keep events, resolved issues, and completed runs.
    pub events_days: u32,
    /// Reclaim file space after sweeping.
    pub vacuum: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            metrics_days: 90,
            events_days: 180,
            vacuum: true,
        }
    }
}

/// Report of what was cleaned.
#[derive(Debug, Clone, Default)]
pub struct RetentionReport {
    pub total_deleted: u64,
    pub per_table: Vec<TableCleanup>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TableCleanup {
    pub table: String,
    pub deleted: u64,
}

/// Apply the retention policy.
///
/// Runs inside a single transaction for atomicity; `now` is passed in so
/// cutoffs are deterministic under test. Returns a report of how many
/// rows were deleted per table.
pub fn apply_retention(
    conn: &Connection,
    policy: &RetentionPolicy,
    now: i64,
) -> Result<RetentionReport, StorageError> {
    let start = std::time::Instant::now();
    let mut report = RetentionReport::default();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("retention begin: {e}"),
        })?;

    apply_retention_inner(&tx, policy, now, &mut report)?;

    tx.commit()
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    if policy.vacuum {
        conn.execute_batch("PRAGMA incremental_vacuum;")
            .map_err(|e| StorageError::SqliteError {
                message: format!("incremental_vacuum: {e}"),
            })?;
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    report.total_deleted = report.per_table.iter().map(|t| t.deleted).sum();
    Ok(report)
}

fn apply_retention_inner(
    conn: &Connection,
    policy: &RetentionPolicy,
    now: i64,
    report: &mut RetentionReport,
) -> Result<(), StorageError> {
    let metrics_cutoff = now - (policy.metrics_days as i64 * SECS_PER_DAY);
    let events_cutoff = now - (policy.events_days as i64 * SECS_PER_DAY);

    // Readings: time-based, but the newest reading per entity survives.
    let deleted = conn
        .execute(
            "DELETE FROM readings WHERE recorded_at < ?1
             AND id NOT IN (SELECT MAX(id) FROM readings GROUP BY entity_key)",
            params![metrics_cutoff],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("readings: {e}"),
        })? as u64;
    record(report, "readings", deleted);

    // Issues: resolved only. Open issues are kept no matter how old.
    let deleted = conn
        .execute(
            "DELETE FROM issues WHERE status = 'resolved' AND last_seen < ?1",
            params![events_cutoff],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("issues: {e}"),
        })? as u64;
    record(report, "issues", deleted);

    // Audit events.
    let deleted = conn
        .execute(
            "DELETE FROM events WHERE occurred_at < ?1",
            params![events_cutoff],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("events: {e}"),
        })? as u64;
    record(report, "events", deleted);

    // Runs: completed passes only; a 'running' row belongs to the current
    // pass or to abandoned-run detection.
    let deleted = conn
        .execute(
            "DELETE FROM runs WHERE started_at < ?1 AND status != 'running'",
            params![events_cutoff],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("runs: {e}"),
        })? as u64;
    record(report, "runs", deleted);

    // Probe failures for runs that no longer exist (orphan cleanup).
    let deleted = conn
        .execute(
            "DELETE FROM probe_failures WHERE run_id NOT IN (SELECT id FROM runs)",
            [],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("probe_failures: {e}"),
        })? as u64;
    record(report, "probe_failures (orphan)", deleted);

    // Ledger entries whose issue resolved long ago; open entries drive
    // cooldown decisions and are never aged out.
    let deleted = conn
        .execute(
            "DELETE FROM notification_ledger
             WHERE last_status = 'resolved' AND last_sent_at < ?1",
            params![events_cutoff],
        )
        .map_err(|e| StorageError::SqliteError {
            message: format!("notification_ledger: {e}"),
        })? as u64;
    record(report, "notification_ledger", deleted);

    Ok(())
}

fn record(report: &mut RetentionReport, table: &str, deleted: u64) {
    if deleted > 0 {
        report.per_table.push(TableCleanup {
            table: table.to_string(),
            deleted,
        });
    }
}
