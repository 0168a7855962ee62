//! Run orchestrator: one evaluation pass across all configured entities.
//!
//! Probe and evaluate per entity (failures stay per-entity), then commit
//! readings, entity state, issue lifecycle, and ledger writes in a single
//! transaction, and only then hand notifications to the transports. A
//! pass either commits wholesale or leaves the previous committed state
//! authoritative; runs abandoned by a dead process are detected at the
//! next startup.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use vigil_core::config::VigilConfig;
use vigil_core::errors::{AckError, EngineError, ProbeError, ProbeFailure, StorageError};
use vigil_core::events::{
    DeliveryResult, NotificationDispatcher, NotificationEvent,
};
use vigil_core::time::epoch_seconds;
use vigil_core::types::{
    Entity, EntityKind, EntityState, FxHashSet, IssueKind, Reading, Severity,
};
use vigil_storage::connection::writer::with_immediate_transaction;
use vigil_storage::queries::{
    acknowledgments, entity_state, events, issues, ledger, probe_failures, readings, runs,
};
use vigil_storage::retention::{apply_retention, RetentionPolicy, RetentionReport};
use vigil_storage::DatabaseManager;

use crate::ack::AckStore;
use crate::evaluate;
use crate::ledger::{decide_open, decide_resolved, OpenDecision, ResolvedDecision};
use crate::normalize::normalize;
use crate::probes::{collect_with_timeout, ProbeRegistry};

/// Summary of one completed pass, for callers and tests. The same counts
/// land on the run row.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: i64,
    pub entities_checked: usize,
    pub issues_opened: u64,
    pub issues_resolved: u64,
    pub suppressed: u64,
    pub notifications: Vec<NotificationEvent>,
    pub probe_failures: Vec<ProbeFailure>,
    pub deliveries: Vec<DeliveryResult>,
}

/// The evaluation engine. Owns the store, the probe registry, and the
/// notification dispatcher; configuration is an immutable snapshot.
pub struct Engine {
    config: VigilConfig,
    db: DatabaseManager,
    probes: ProbeRegistry,
    dispatcher: NotificationDispatcher,
}

/// Per-entity results gathered before the commit phase.
struct EntityEval {
    entity: Entity,
    reading: Reading,
    new_state: EntityState,
    candidates: Vec<vigil_core::types::CandidateIssue>,
}

/// What the pass transaction produced.
struct TxOutcome {
    notifications: Vec<NotificationEvent>,
    opened: u64,
    resolved: u64,
    suppressed: u64,
}

impl Engine {
    pub fn new(
        config: VigilConfig,
        db: DatabaseManager,
        probes: ProbeRegistry,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            config,
            db,
            probes,
            dispatcher,
        }
    }

    pub fn config(&self) -> &VigilConfig {
        &self.config
    }

    pub fn db(&self) -> &DatabaseManager {
        &self.db
    }

    pub fn ack_store(&self) -> AckStore<'_> {
        AckStore::new(&self.db)
    }

    /// Acknowledge an entity, emitting the one-time notice if configured.
    pub fn acknowledge(
        &self,
        entity_key: &str,
        note: &str,
        created_by: &str,
    ) -> Result<(), AckError> {
        let notice =
            self.ack_store()
                .create(entity_key, note, created_by, epoch_seconds())?;
        if self.config.alerts.send_ack_notice {
            self.dispatcher.dispatch_ack(&notice);
        }
        Ok(())
    }

    /// Remove an entity's acknowledgment.
    pub fn unacknowledge(&self, entity_key: &str) -> Result<(), AckError> {
        self.ack_store().remove(entity_key, epoch_seconds())
    }

    /// Sweep aged rows per the configured retention windows.
    /// Independent of evaluation; never touches open issues or the most
    /// recent reading per entity.
    pub fn run_retention(&self) -> Result<RetentionReport, EngineError> {
        let policy = RetentionPolicy {
            metrics_days: self.config.retention.metrics_days,
            events_days: self.config.retention.events_days,
            vacuum: self.config.retention.vacuum,
        };
        let report = self
            .db
            .with_writer(|conn| apply_retention(conn, &policy, epoch_seconds()))?;
        info!(
            deleted = report.total_deleted,
            duration_ms = report.duration_ms,
            "retention sweep complete"
        );
        Ok(report)
    }

    /// Execute one evaluation pass.
    pub fn run_once(&self) -> Result<RunOutcome, EngineError> {
        let pass_start = Instant::now();
        let now = epoch_seconds();

        // Cross-process exclusivity. An in-memory database is process-local,
        // so there is nothing to lock against.
        let mut run_lock = match self.db.path() {
            Some(db_path) => Some(RunLock::open(lock_path(db_path))?),
            None => None,
        };
        let _guard = match run_lock.as_mut() {
            Some(lock) => Some(lock.try_lock()?),
            None => None,
        };

        let hostname = self.config.monitor.hostname();
        let run_id = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let abandoned = runs::mark_abandoned_runs(tx)?;
                if abandoned > 0 {
                    warn!(abandoned, "marked interrupted runs as abandoned");
                }
                runs::insert_run_start(tx, now, &hostname)
            })
        })?;

        let entities = self.config.entities();
        let acked: FxHashSet<String> = self
            .db
            .with_writer(acknowledgments::all)?
            .into_iter()
            .map(|a| a.entity_key)
            .collect();

        // Probe and evaluate. Each entity's failure is recorded and never
        // aborts the rest of the pass.
        let timeout = Duration::from_secs(self.config.probes.timeout_secs);
        let mut evals: Vec<EntityEval> = Vec::new();
        let mut failures: Vec<ProbeFailure> = Vec::new();

        for entity in &entities {
            let prior = self
                .db
                .with_writer(|conn| entity_state::get(conn, &entity.key))?;
            let since = prior.as_ref().map(|p| p.recorded_at);
            match self.collect_one(entity, run_id, now, since, timeout) {
                Ok(reading) => {
                    let candidates =
                        evaluate::evaluate(entity, &reading, prior.as_ref(), &self.config, now);
                    let sync_started_at = match entity.kind {
                        EntityKind::Mirror => evaluate::mirror::next_sync_started_at(
                            &reading,
                            prior.as_ref(),
                            now,
                        ),
                        _ => None,
                    };
                    let new_state = EntityState::from_reading(&reading, sync_started_at);
                    evals.push(EntityEval {
                        entity: entity.clone(),
                        reading,
                        new_state,
                        candidates,
                    });
                }
                Err(err) => {
                    warn!(entity = %entity, error = %err, "probe failed, skipping entity this run");
                    let mut failure = ProbeFailure::from(&err);
                    if failure.entity_key.is_empty() {
                        failure.entity_key = entity.key.clone();
                    }
                    failures.push(failure);
                }
            }
        }

        // Commit the whole pass atomically. On failure nothing partial is
        // visible; the run row is marked failed best-effort.
        let commit = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                self.commit_pass(tx, run_id, now, &evals, &failures, &acked, pass_start)
            })
        });
        let tx_outcome = match commit {
            Ok(outcome) => outcome,
            Err(err) => {
                let _ = self.db.with_writer(|conn| {
                    runs::mark_run_failed(conn, run_id, epoch_seconds(), &err.to_string())
                });
                return Err(err.into());
            }
        };

        // Hand emitted decisions to the transports. Delivery failures are
        // logged and reported, never rolled back into the ledger.
        let mut deliveries = Vec::new();
        for event in &tx_outcome.notifications {
            let results = self.dispatcher.dispatch(event);
            self.audit_deliveries(event, &results);
            deliveries.extend(results);
        }

        if let Err(err) = self.db.checkpoint() {
            warn!(error = %err, "WAL checkpoint after pass failed");
        }

        info!(
            run_id,
            entities = entities.len(),
            opened = tx_outcome.opened,
            resolved = tx_outcome.resolved,
            suppressed = tx_outcome.suppressed,
            notifications = tx_outcome.notifications.len(),
            probe_failures = failures.len(),
            "run complete"
        );

        Ok(RunOutcome {
            run_id,
            entities_checked: entities.len(),
            issues_opened: tx_outcome.opened,
            issues_resolved: tx_outcome.resolved,
            suppressed: tx_outcome.suppressed,
            notifications: tx_outcome.notifications,
            probe_failures: failures,
            deliveries,
        })
    }

    /// Probe one entity and normalize the sample. `since` is the prior
    /// reading's timestamp, handed to the probe as its scan cursor.
    fn collect_one(
        &self,
        entity: &Entity,
        run_id: i64,
        now: i64,
        since: Option<i64>,
        timeout: Duration,
    ) -> Result<Reading, ProbeError> {
        let probe = self.probes.get(entity.kind)?;
        let sample = collect_with_timeout(probe, entity, since, timeout)?;
        normalize(entity, sample, run_id, now)
    }

    /// Write everything the pass produced inside one transaction and
    /// compute the notification decisions.
    #[allow(clippy::too_many_arguments)]
    fn commit_pass(
        &self,
        tx: &rusqlite::Connection,
        run_id: i64,
        now: i64,
        evals: &[EntityEval],
        failures: &[ProbeFailure],
        acked: &FxHashSet<String>,
        pass_start: Instant,
    ) -> Result<TxOutcome, StorageError> {
        let cooldown = self.config.alerts.cooldown_secs;
        let send_recovery = self.config.alerts.send_recovery;

        let mut notifications = Vec::new();
        let mut opened = 0u64;
        let mut resolved = 0u64;
        let mut suppressed = 0u64;
        let mut worst: Option<Severity> = None;

        for eval in evals {
            readings::insert(tx, &eval.reading)?;
            entity_state::upsert(tx, &eval.new_state)?;

            let is_acked = acked.contains(&eval.entity.key);
            let open_rows = issues::open_for_entity(tx, &eval.entity.key)?;
            let candidate_fps: FxHashSet<&str> = eval
                .candidates
                .iter()
                .map(|c| c.fingerprint.as_str())
                .collect();

            for candidate in &eval.candidates {
                worst = Some(match worst {
                    Some(w) => w.max(candidate.severity),
                    None => candidate.severity,
                });

                // Issue rows are persisted even for acknowledged entities.
                match issues::get_open_by_fingerprint(tx, &candidate.fingerprint)? {
                    Some(row) => issues::touch_open(tx, row.id, candidate, now)?,
                    None => {
                        issues::insert_open(tx, candidate, now)?;
                        opened += 1;
                        let payload = serde_json::json!({
                            "fingerprint": candidate.fingerprint,
                            "kind": candidate.kind.as_str(),
                        })
                        .to_string();
                        events::insert(
                            tx,
                            now,
                            events::EVENT_ISSUE_OPENED,
                            Some(candidate.severity.as_str()),
                            Some(&candidate.entity_key),
                            &format!("new issue: {}", candidate.description),
                            Some(&payload),
                        )?;
                    }
                }

                if is_acked {
                    suppressed += 1;
                    continue;
                }

                let entry = ledger::get(tx, &candidate.fingerprint)?;
                match decide_open(entry.as_ref(), now, cooldown) {
                    OpenDecision::Emit(status) => {
                        ledger::record_send(
                            tx,
                            &candidate.fingerprint,
                            &candidate.entity_key,
                            candidate.kind.as_str(),
                            now,
                            "open",
                        )?;
                        notifications.push(NotificationEvent {
                            entity_key: candidate.entity_key.clone(),
                            kind: candidate.kind,
                            severity: candidate.severity,
                            description: candidate.description.clone(),
                            status,
                            timestamp: now,
                        });
                    }
                    OpenDecision::Suppress => suppressed += 1,
                }
            }

            // Open issues this entity no longer exhibits are resolved.
            // Only reached when the entity was successfully probed, so a
            // missing reading never masquerades as a recovery.
            for row in open_rows
                .iter()
                .filter(|r| !candidate_fps.contains(r.fingerprint.as_str()))
            {
                issues::resolve(tx, row.id, now)?;
                resolved += 1;
                let payload = serde_json::json!({
                    "fingerprint": row.fingerprint,
                    "kind": row.kind,
                    "open_since": row.first_seen,
                })
                .to_string();
                events::insert(
                    tx,
                    now,
                    events::EVENT_ISSUE_RESOLVED,
                    Some(&row.severity),
                    Some(&row.entity_key),
                    &format!("resolved: {}", row.description),
                    Some(&payload),
                )?;

                let entry = ledger::get(tx, &row.fingerprint)?;
                match decide_resolved(entry.as_ref(), send_recovery, is_acked) {
                    ResolvedDecision::EmitRecovery => {
                        ledger::record_send(
                            tx,
                            &row.fingerprint,
                            &row.entity_key,
                            &row.kind,
                            now,
                            "resolved",
                        )?;
                        notifications.push(NotificationEvent {
                            entity_key: row.entity_key.clone(),
                            kind: parse_kind(&row.kind)?,
                            severity: parse_severity(&row.severity)?,
                            description: format!("recovered: {}", row.description),
                            status: vigil_core::events::NotificationStatus::Recovered,
                            timestamp: now,
                        });
                    }
                    ResolvedDecision::MarkResolved => {
                        ledger::mark_resolved(tx, &row.fingerprint)?;
                    }
                    ResolvedDecision::Nothing => {}
                }
            }
        }

        for failure in failures {
            probe_failures::insert(tx, run_id, &failure.entity_key, &failure.reason, now)?;
        }

        let status = worst.map(|s| s.as_str()).unwrap_or("ok");
        runs::complete_run(
            tx,
            run_id,
            epoch_seconds(),
            status,
            evals.len() as i64 + failures.len() as i64,
            opened as i64,
            resolved as i64,
            failures.len() as i64,
            pass_start.elapsed().as_millis() as i64,
        )?;

        Ok(TxOutcome {
            notifications,
            opened,
            resolved,
            suppressed,
        })
    }

    /// Record delivery outcomes in the audit trail (best effort; these
    /// only exist after the pass committed).
    fn audit_deliveries(&self, event: &NotificationEvent, results: &[DeliveryResult]) {
        let write = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                for result in results {
                    let verdict = if result.delivered { "delivered" } else { "failed" };
                    events::insert(
                        tx,
                        epoch_seconds(),
                        events::EVENT_NOTIFICATION_SENT,
                        Some(event.severity.as_str()),
                        Some(&event.entity_key),
                        &format!(
                            "{} notification via {} {}: {}",
                            event.status.as_str(),
                            result.channel,
                            verdict,
                            event.description
                        ),
                        None,
                    )?;
                }
                Ok(())
            })
        });
        if let Err(err) = write {
            warn!(error = %err, "failed to record notification audit events");
        }
    }
}

fn parse_kind(kind: &str) -> Result<IssueKind, StorageError> {
    IssueKind::parse(kind).ok_or_else(|| StorageError::CorruptRow {
        table: "issues".to_string(),
        message: format!("unknown issue kind {kind:?}"),
    })
}

fn parse_severity(severity: &str) -> Result<Severity, StorageError> {
    Severity::parse(severity).ok_or_else(|| StorageError::CorruptRow {
        table: "issues".to_string(),
        message: format!("unknown severity {severity:?}"),
    })
}

fn lock_path(db_path: &std::path::Path) -> PathBuf {
    let mut path = db_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

/// File-based run lock enforcing one pass at a time across processes.
struct RunLock {
    inner: fd_lock::RwLock<std::fs::File>,
}

impl RunLock {
    fn open(path: PathBuf) -> Result<Self, EngineError> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                EngineError::Storage(StorageError::SqliteError {
                    message: format!("open run lock {}: {e}", path.display()),
                })
            })?;
        Ok(Self {
            inner: fd_lock::RwLock::new(file),
        })
    }

    fn try_lock(&mut self) -> Result<fd_lock::RwLockWriteGuard<'_, std::fs::File>, EngineError> {
        self.inner.try_write().map_err(|_| EngineError::RunInProgress)
    }
}
