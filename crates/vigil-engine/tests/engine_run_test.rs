//! End-to-end tests for the run orchestrator: scripted probes in, state
//! and notifications out, everything through the real store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use vigil_core::config::VigilConfig;
use vigil_core::errors::{NotifyError, ProbeError};
use vigil_core::events::{
    NotificationDispatcher, NotificationEvent, NotificationStatus, Notifier,
};
use vigil_core::types::{Entity, EntityKind};
use vigil_engine::probes::{AtaAttribute, FilesystemSample, SmartAtaSample};
use vigil_engine::{Engine, Probe, ProbeRegistry, ProbeSample};
use vigil_storage::queries::{entity_state, issues, ledger, probe_failures, readings, runs};
use vigil_storage::DatabaseManager;

// ---- Test doubles ----

enum Step {
    Ok(ProbeSample),
    Fail,
}

/// Probe whose answers are scripted per entity key; each run pops one.
#[derive(Default)]
struct ScriptedProbe {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
}

impl ScriptedProbe {
    fn push(&self, entity_key: &str, step: Step) {
        self.scripts
            .lock()
            .unwrap()
            .entry(entity_key.to_string())
            .or_default()
            .push_back(step);
    }
}

impl Probe for ScriptedProbe {
    fn collect(&self, entity: &Entity, _since: Option<i64>) -> Result<ProbeSample, ProbeError> {
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&entity.key)
            .and_then(VecDeque::pop_front);
        match step {
            Some(Step::Ok(sample)) => Ok(sample),
            Some(Step::Fail) | None => Err(ProbeError::Unavailable {
                entity_key: entity.key.clone(),
                reason: "device did not respond".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<NotificationEvent>>,
}

impl Recorder {
    fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

fn build_engine(toml: &str) -> (Engine, Arc<ScriptedProbe>, Arc<Recorder>) {
    let config = VigilConfig::from_toml(toml).unwrap();
    let db = DatabaseManager::open_in_memory().unwrap();

    let probe = Arc::new(ScriptedProbe::default());
    let mut registry = ProbeRegistry::new();
    for kind in [
        EntityKind::Disk,
        EntityKind::Mirror,
        EntityKind::Mountpoint,
        EntityKind::LogSource,
    ] {
        registry.register(kind, probe.clone());
    }

    let recorder = Arc::new(Recorder::default());
    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.register(recorder.clone());

    (Engine::new(config, db, registry, dispatcher), probe, recorder)
}

fn fs_sample(used_pct: u64) -> ProbeSample {
    ProbeSample::Filesystem(FilesystemSample {
        total_bytes: 1000,
        used_bytes: used_pct * 10,
        free_bytes: 1000 - used_pct * 10,
    })
}

fn ata_sample(attrs: &[(u8, i64)]) -> ProbeSample {
    ProbeSample::SmartAta(SmartAtaSample {
        passed: true,
        attrs: attrs
            .iter()
            .map(|(id, raw)| AtaAttribute { id: *id, raw: *raw })
            .collect(),
        temperature_c: None,
        power_on_hours: None,
    })
}

const MOUNT_ONLY: &str = r#"
    [kernel_log]
    enabled = false

    [[filesystem.mountpoints]]
    path = "/srv"
    warn_pct = 85.0
    crit_pct = 95.0
"#;

const DISK_ONLY: &str = r#"
    [kernel_log]
    enabled = false

    [smart]
    disks = ["/dev/sda"]
"#;

// ---- Tests ----

#[test]
fn entity_state_always_reflects_the_latest_reading() {
    let (engine, probe, _) = build_engine(MOUNT_ONLY);

    probe.push("/srv", Step::Ok(fs_sample(50)));
    engine.run_once().unwrap();

    let state = engine
        .db()
        .with_writer(|conn| entity_state::get(conn, "/srv"))
        .unwrap()
        .unwrap();
    assert_eq!(state.attrs.get("used_pct").and_then(|v| v.as_float()), Some(50.0));

    probe.push("/srv", Step::Ok(fs_sample(60)));
    engine.run_once().unwrap();

    let state = engine
        .db()
        .with_writer(|conn| entity_state::get(conn, "/srv"))
        .unwrap()
        .unwrap();
    assert_eq!(state.attrs.get("used_pct").and_then(|v| v.as_float()), Some(60.0));

    let total = engine.db().with_writer(readings::count).unwrap();
    assert_eq!(total, 2, "readings are append-only");
}

#[test]
fn threshold_crossings_raise_one_issue_at_the_highest_severity() {
    let (engine, probe, recorder) = build_engine(MOUNT_ONLY);

    // 80% with warn=85/crit=95: no issue.
    probe.push("/srv", Step::Ok(fs_sample(80)));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_opened, 0);
    assert!(recorder.events().is_empty());

    // 90%: a single warning issue, notified once.
    probe.push("/srv", Step::Ok(fs_sample(90)));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_opened, 1);
    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, NotificationStatus::Opened);
    assert_eq!(events[0].severity, vigil_core::types::Severity::Warning);

    // 96%: the same issue escalates to critical (not a second issue), and
    // the cooldown suppresses a repeat notification.
    probe.push("/srv", Step::Ok(fs_sample(96)));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_opened, 0);
    assert_eq!(outcome.suppressed, 1);
    assert_eq!(recorder.events().len(), 1);

    let open = engine.db().with_writer(issues::query_open).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].severity, "critical");
}

#[test]
fn cooldown_suppresses_then_allows_one_reminder() {
    let (engine, probe, recorder) = build_engine(DISK_ONLY);

    // Pending sectors stay nonzero across runs: same open issue.
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();
    assert_eq!(recorder.events().len(), 1);

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.suppressed, 1, "within the cooldown window");
    assert_eq!(recorder.events().len(), 1);

    // Age the ledger entry past the cooldown boundary.
    engine
        .db()
        .with_writer(|conn| {
            conn.execute(
                "UPDATE notification_ledger SET last_sent_at = last_sent_at - 999999",
                [],
            )
            .map_err(|e| vigil_core::errors::StorageError::SqliteError {
                message: e.to_string(),
            })?;
            Ok(())
        })
        .unwrap();

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();
    let events = recorder.events();
    assert_eq!(events.len(), 2, "exactly one reminder after the boundary");
    assert_eq!(events[1].status, NotificationStatus::Ongoing);
}

#[test]
fn resolution_emits_exactly_one_recovery() {
    let (engine, probe, recorder) = build_engine(DISK_ONLY);

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();

    // Pending sectors back to zero: the issue resolves.
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 0)])));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_resolved, 1);
    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].status, NotificationStatus::Recovered);

    // A healthy disk stays quiet afterwards.
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 0)])));
    engine.run_once().unwrap();
    assert_eq!(recorder.events().len(), 2);

    assert!(engine.db().with_writer(issues::query_open).unwrap().is_empty());
}

#[test]
fn recovery_notices_disabled_resolve_silently() {
    let config = format!("{DISK_ONLY}\n[alerts]\nsend_recovery = false\n");
    let (engine, probe, recorder) = build_engine(&config);

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();
    assert_eq!(recorder.events().len(), 1);

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 0)])));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_resolved, 1);
    assert_eq!(recorder.events().len(), 1, "no recovery notice");

    // The ledger entry is closed either way, so nothing fires later.
    let entry = engine
        .db()
        .with_writer(|conn| {
            let rows = issues::query_recent(conn, 1)?;
            ledger::get(conn, &rows[0].fingerprint)
        })
        .unwrap()
        .unwrap();
    assert_eq!(entry.last_status, "resolved");
}

#[test]
fn acknowledged_entity_is_suppressed_but_still_recorded() {
    let (engine, probe, recorder) = build_engine(DISK_ONLY);

    engine
        .acknowledge("/dev/sda", "known bad cable, fix scheduled", "operator")
        .unwrap();

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_opened, 1, "issue rows are still persisted");
    assert_eq!(outcome.suppressed, 1);
    assert!(recorder.events().is_empty());

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();
    assert!(recorder.events().is_empty());

    // Removing the acknowledgment lets the next run notify.
    engine.unacknowledge("/dev/sda").unwrap();
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();
    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, NotificationStatus::Opened);
}

#[test]
fn one_failing_probe_does_not_block_the_others() {
    let config = r#"
        [kernel_log]
        enabled = false

        [[filesystem.mountpoints]]
        path = "/a"

        [[filesystem.mountpoints]]
        path = "/b"

        [[filesystem.mountpoints]]
        path = "/c"
    "#;
    let (engine, probe, recorder) = build_engine(config);

    probe.push("/a", Step::Ok(fs_sample(50)));
    probe.push("/b", Step::Fail);
    probe.push("/c", Step::Ok(fs_sample(96)));

    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.entities_checked, 3);
    assert_eq!(outcome.probe_failures.len(), 1);
    assert_eq!(outcome.probe_failures[0].entity_key, "/b");

    // The two reachable entities committed state and issues.
    let db = engine.db();
    assert!(db.with_writer(|c| entity_state::get(c, "/a")).unwrap().is_some());
    assert!(db.with_writer(|c| entity_state::get(c, "/b")).unwrap().is_none());
    assert!(db.with_writer(|c| entity_state::get(c, "/c")).unwrap().is_some());

    let open = db.with_writer(issues::query_open).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].entity_key, "/c");
    assert_eq!(recorder.events().len(), 1);

    // The failure is surfaced on the run, distinct from health issues.
    let run = db.with_writer(runs::latest).unwrap().unwrap();
    assert_eq!(run.probe_failures, Some(1));
    let failures = db
        .with_writer(|c| probe_failures::for_run(c, outcome.run_id))
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].reason.contains("did not respond"));
}

#[test]
fn missing_reading_never_resolves_an_issue() {
    let (engine, probe, recorder) = build_engine(DISK_ONLY);

    probe.push("/dev/sda", Step::Ok(ata_sample(&[(197, 1)])));
    engine.run_once().unwrap();
    assert_eq!(recorder.events().len(), 1);

    // Probe fails: we could not check the disk, which is not the same as
    // the disk being healthy.
    probe.push("/dev/sda", Step::Fail);
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_resolved, 0);
    assert_eq!(outcome.probe_failures.len(), 1);
    assert_eq!(recorder.events().len(), 1, "no recovery from a failed probe");

    let open = engine.db().with_writer(issues::query_open).unwrap();
    assert_eq!(open.len(), 1);
}

#[test]
fn interrupted_runs_are_marked_abandoned_at_next_startup() {
    let (engine, probe, _) = build_engine(MOUNT_ONLY);

    // Simulate a pass that died before committing.
    let stale_id = engine
        .db()
        .with_writer(|conn| runs::insert_run_start(conn, 1000, "host"))
        .unwrap();

    probe.push("/srv", Step::Ok(fs_sample(50)));
    let outcome = engine.run_once().unwrap();

    let rows = engine.db().with_writer(|c| runs::query_recent(c, 10)).unwrap();
    assert_eq!(rows.len(), 2);
    let stale = rows.iter().find(|r| r.id == stale_id).unwrap();
    assert_eq!(stale.status, "abandoned");
    let fresh = rows.iter().find(|r| r.id == outcome.run_id).unwrap();
    assert_eq!(fresh.status, "ok");
    assert!(fresh.completed_at.is_some());
}

#[test]
fn delta_regression_notifies_once_per_increment_cycle() {
    let (engine, probe, recorder) = build_engine(DISK_ONLY);

    // Static nonzero baseline: no issue, no notification.
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(5, 7)])));
    engine.run_once().unwrap();
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(5, 7)])));
    engine.run_once().unwrap();
    assert!(recorder.events().is_empty());

    // The counter rises: exactly one issue, one notification.
    probe.push("/dev/sda", Step::Ok(ata_sample(&[(5, 8)])));
    let outcome = engine.run_once().unwrap();
    assert_eq!(outcome.issues_opened, 1);
    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].description.contains("increased by 1"));
}
