//! Integration tests for the query modules against the real migrated schema.

use rusqlite::Connection;
use vigil_core::types::{AttrValue, CandidateIssue, EntityState, IssueKind, Reading, Severity};
use vigil_storage::migrations::{current_version, run_migrations};
use vigil_storage::queries::{acknowledgments, entity_state, issues, ledger, readings, runs};

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

#[test]
fn migrations_set_user_version() {
    let conn = setup_db();
    assert_eq!(current_version(&conn).unwrap(), 1);
    // Re-running is a no-op.
    run_migrations(&conn).unwrap();
    assert_eq!(current_version(&conn).unwrap(), 1);
}

#[test]
fn run_lifecycle_start_complete() {
    let conn = setup_db();
    let id = runs::insert_run_start(&conn, 1000, "host").unwrap();
    runs::complete_run(&conn, id, 1010, "ok", 3, 1, 0, 0, 10_000).unwrap();

    let row = runs::latest(&conn).unwrap().unwrap();
    assert_eq!(row.id, id);
    assert_eq!(row.status, "ok");
    assert_eq!(row.entities_checked, Some(3));
    assert_eq!(row.completed_at, Some(1010));
}

#[test]
fn stale_running_runs_marked_abandoned() {
    let conn = setup_db();
    let stale = runs::insert_run_start(&conn, 1000, "host").unwrap();
    let updated = runs::mark_abandoned_runs(&conn).unwrap();
    assert_eq!(updated, 1);

    let row = runs::latest(&conn).unwrap().unwrap();
    assert_eq!(row.id, stale);
    assert_eq!(row.status, "abandoned");
}

#[test]
fn reading_round_trips_attrs() {
    let conn = setup_db();
    let mut reading = Reading::new("/dev/sda", 1, 2000);
    reading.set("attr_5", AttrValue::Int(3));
    reading.set("used_pct", AttrValue::Float(91.5));
    reading.set("state", AttrValue::Text("healthy".into()));
    readings::insert(&conn, &reading).unwrap();

    let loaded = readings::query_for_entity(&conn, "/dev/sda", 10).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].attrs, reading.attrs);
    assert_eq!(loaded[0].recorded_at, 2000);
}

#[test]
fn entity_state_upsert_overwrites() {
    let conn = setup_db();

    let mut first = Reading::new("vg0/mirror0", 1, 1000);
    first.set("state", AttrValue::Text("syncing".into()));
    entity_state::upsert(&conn, &EntityState::from_reading(&first, Some(900))).unwrap();

    let mut second = Reading::new("vg0/mirror0", 2, 2000);
    second.set("state", AttrValue::Text("healthy".into()));
    entity_state::upsert(&conn, &EntityState::from_reading(&second, None)).unwrap();

    assert_eq!(entity_state::count(&conn).unwrap(), 1);
    let state = entity_state::get(&conn, "vg0/mirror0").unwrap().unwrap();
    assert_eq!(state.run_id, 2);
    assert_eq!(state.text("state"), Some("healthy"));
    assert_eq!(state.sync_started_at, None);
}

#[test]
fn issue_open_touch_resolve_reopen() {
    let conn = setup_db();
    let candidate = CandidateIssue::new(
        "/dev/sda",
        IssueKind::SmartAttributeRegression,
        Severity::Warning,
        "reallocated sectors above threshold",
        "5",
    );

    let id = issues::insert_open(&conn, &candidate, 1000).unwrap();
    let open = issues::get_open_by_fingerprint(&conn, &candidate.fingerprint)
        .unwrap()
        .unwrap();
    assert_eq!(open.id, id);
    assert_eq!(open.first_seen, 1000);

    // Same problem seen again, now critical.
    let escalated = CandidateIssue::new(
        "/dev/sda",
        IssueKind::SmartAttributeRegression,
        Severity::Critical,
        "reallocated sectors increased by 2",
        "5",
    );
    issues::touch_open(&conn, id, &escalated, 2000).unwrap();
    let open = issues::get_open_by_fingerprint(&conn, &candidate.fingerprint)
        .unwrap()
        .unwrap();
    assert_eq!(open.severity, "critical");
    assert_eq!(open.last_seen, 2000);
    assert_eq!(open.first_seen, 1000, "first_seen survives updates");

    issues::resolve(&conn, id, 3000).unwrap();
    assert!(issues::get_open_by_fingerprint(&conn, &candidate.fingerprint)
        .unwrap()
        .is_none());

    // Reopening creates a fresh row with a new first_seen.
    let reopened_id = issues::insert_open(&conn, &candidate, 4000).unwrap();
    assert_ne!(reopened_id, id);
    let reopened = issues::get_open_by_fingerprint(&conn, &candidate.fingerprint)
        .unwrap()
        .unwrap();
    assert_eq!(reopened.first_seen, 4000);
}

#[test]
fn second_open_issue_per_fingerprint_is_rejected() {
    let conn = setup_db();
    let candidate = CandidateIssue::new(
        "/srv",
        IssueKind::FilesystemThresholdExceeded,
        Severity::Warning,
        "90% used",
        "",
    );
    issues::insert_open(&conn, &candidate, 1000).unwrap();
    // The partial unique index guarantees at most one open issue per
    // fingerprint.
    assert!(issues::insert_open(&conn, &candidate, 2000).is_err());
}

#[test]
fn ledger_record_and_mark_resolved() {
    let conn = setup_db();
    ledger::record_send(&conn, "fp1", "/dev/sda", "smart-selftest-failure", 1000, "open")
        .unwrap();

    let row = ledger::get(&conn, "fp1").unwrap().unwrap();
    assert_eq!(row.last_sent_at, 1000);
    assert_eq!(row.last_status, "open");

    // Repeat send overwrites in place.
    ledger::record_send(&conn, "fp1", "/dev/sda", "smart-selftest-failure", 5000, "open")
        .unwrap();
    assert_eq!(ledger::count(&conn).unwrap(), 1);
    assert_eq!(ledger::get(&conn, "fp1").unwrap().unwrap().last_sent_at, 5000);

    ledger::mark_resolved(&conn, "fp1").unwrap();
    let row = ledger::get(&conn, "fp1").unwrap().unwrap();
    assert_eq!(row.last_status, "resolved");
    assert_eq!(row.last_sent_at, 5000, "mark_resolved keeps last_sent_at");
}

#[test]
fn acknowledgment_insert_get_delete() {
    let conn = setup_db();
    let ack = acknowledgments::AckRow {
        entity_key: "/dev/sdb".to_string(),
        note: "known CRC noise from old cable".to_string(),
        created_by: "operator".to_string(),
        created_at: 1000,
    };
    acknowledgments::insert(&conn, &ack).unwrap();

    let loaded = acknowledgments::get(&conn, "/dev/sdb").unwrap().unwrap();
    assert_eq!(loaded.note, ack.note);

    // Duplicate insert violates the primary key.
    assert!(acknowledgments::insert(&conn, &ack).is_err());

    assert!(acknowledgments::delete(&conn, "/dev/sdb").unwrap());
    assert!(!acknowledgments::delete(&conn, "/dev/sdb").unwrap());
    assert!(acknowledgments::get(&conn, "/dev/sdb").unwrap().is_none());
}

#[test]
fn file_backed_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");

    {
        let db = vigil_storage::DatabaseManager::open(&path).unwrap();
        db.with_writer(|conn| {
            runs::insert_run_start(conn, 1000, "host")?;
            Ok(())
        })
        .unwrap();
    }

    let db = vigil_storage::DatabaseManager::open(&path).unwrap();
    let row = db
        .with_writer(|conn| runs::latest(conn))
        .unwrap()
        .unwrap();
    assert_eq!(row.started_at, 1000);
}
