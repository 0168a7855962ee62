//! V001: Initial schema.
//! runs, readings, entity_state, issues, notification_ledger,
//! acknowledgments, probe_failures, events.

pub const MIGRATION_SQL: &str = r#"
-- Evaluation passes. Inserted with status 'running' at pass start;
-- completed in the pass's closing transaction. Rows still 'running' at
-- the next startup belong to an abandoned pass.
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    hostname TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'running',
    entities_checked INTEGER,
    issues_opened INTEGER,
    issues_resolved INTEGER,
    probe_failures INTEGER,
    duration_ms INTEGER,
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_runs_started ON runs(started_at DESC);

-- Normalized observations, append-only. attrs_json maps attribute name
-- to value; an absent attribute was not measured (never zero-filled).
CREATE TABLE IF NOT EXISTS readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL,
    entity_key TEXT NOT NULL,
    recorded_at INTEGER NOT NULL,
    attrs_json TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_readings_entity
    ON readings(entity_key, recorded_at DESC);
CREATE INDEX IF NOT EXISTS idx_readings_time ON readings(recorded_at);

-- Last committed reading per entity, plus resync bookkeeping.
-- Exactly one row per entity, overwritten each run.
CREATE TABLE IF NOT EXISTS entity_state (
    entity_key TEXT PRIMARY KEY,
    run_id INTEGER NOT NULL,
    recorded_at INTEGER NOT NULL,
    attrs_json TEXT NOT NULL,
    sync_started_at INTEGER
) STRICT;

-- Detected problems. At most one open issue per fingerprint, enforced
-- by the partial unique index; reopening after resolution creates a new
-- row with a fresh first_seen.
CREATE TABLE IF NOT EXISTS issues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fingerprint TEXT NOT NULL,
    entity_key TEXT NOT NULL,
    kind TEXT NOT NULL,
    severity TEXT NOT NULL,
    description TEXT NOT NULL,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'open',
    resolved_at INTEGER
) STRICT;

CREATE UNIQUE INDEX IF NOT EXISTS idx_issues_open_fingerprint
    ON issues(fingerprint) WHERE status = 'open';
CREATE INDEX IF NOT EXISTS idx_issues_entity ON issues(entity_key, status);
CREATE INDEX IF NOT EXISTS idx_issues_last_seen ON issues(last_seen);

-- Per-fingerprint notification history for cooldown and recovery.
CREATE TABLE IF NOT EXISTS notification_ledger (
    fingerprint TEXT PRIMARY KEY,
    entity_key TEXT NOT NULL,
    kind TEXT NOT NULL,
    last_sent_at INTEGER NOT NULL,
    last_status TEXT NOT NULL
) STRICT;

-- Operator suppressions, keyed by entity. Written by the dashboard,
-- consumed read-only by the engine at evaluation time.
CREATE TABLE IF NOT EXISTS acknowledgments (
    entity_key TEXT PRIMARY KEY,
    note TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

-- Per-run probe failures, surfaced distinctly from health issues so
-- operators can tell "disk is unhealthy" from "couldn't check the disk".
CREATE TABLE IF NOT EXISTS probe_failures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL,
    entity_key TEXT NOT NULL,
    reason TEXT NOT NULL,
    occurred_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_probe_failures_run ON probe_failures(run_id);

-- Audit trail: issue lifecycle transitions, notification deliveries,
-- acknowledgment changes.
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    occurred_at INTEGER NOT NULL,
    event_type TEXT NOT NULL,
    severity TEXT,
    entity_key TEXT,
    message TEXT NOT NULL,
    payload_json TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_events_time ON events(occurred_at DESC);
"#;
