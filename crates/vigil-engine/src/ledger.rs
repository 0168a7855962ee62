//! Deduplication & cooldown decisions, keyed by issue fingerprint.
//!
//! The decision table for an open candidate:
//! 1. no ledger entry → emit `opened`, record the entry
//! 2. entry open, cooldown not elapsed → suppress
//! 3. entry open, cooldown elapsed → emit `ongoing`, update the entry
//! 4. previously-open fingerprint absent from this run's candidates →
//!    emit one `recovered` (when enabled), then mark the entry resolved
//!
//! An entry whose last send was at `resolved` status is equivalent to no
//! entry: the fingerprint reopened, branch 1 applies. These exact branch
//! conditions are what prevents both alert storms and silent suppression;
//! severity changes deliberately do not bypass the cooldown.

use vigil_core::events::NotificationStatus;
use vigil_storage::queries::ledger::LedgerRow;

const STATUS_OPEN: &str = "open";

/// Decision for a candidate issue that is open this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDecision {
    /// Notify now and record the send.
    Emit(NotificationStatus),
    /// Same ongoing problem, too soon to repeat.
    Suppress,
}

/// Decision for a fingerprint that was open in the ledger but produced no
/// candidate this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedDecision {
    /// Send the one-time recovery notice and record it.
    EmitRecovery,
    /// Mark the entry resolved silently (notices disabled or entity
    /// acknowledged); nothing further until the fingerprint reopens.
    MarkResolved,
    /// No open entry — the issue never produced a notification, so its
    /// resolution produces none either.
    Nothing,
}

/// Decide whether to notify for an open candidate.
pub fn decide_open(entry: Option<&LedgerRow>, now: i64, cooldown_secs: u64) -> OpenDecision {
    match entry {
        None => OpenDecision::Emit(NotificationStatus::Opened),
        Some(e) if e.last_status == STATUS_OPEN => {
            if now - e.last_sent_at < cooldown_secs as i64 {
                OpenDecision::Suppress
            } else {
                OpenDecision::Emit(NotificationStatus::Ongoing)
            }
        }
        // Last send was a recovery: the issue reopened.
        Some(_) => OpenDecision::Emit(NotificationStatus::Opened),
    }
}

/// Decide what to do when a previously tracked fingerprint resolved.
pub fn decide_resolved(
    entry: Option<&LedgerRow>,
    send_recovery: bool,
    acknowledged: bool,
) -> ResolvedDecision {
    match entry {
        Some(e) if e.last_status == STATUS_OPEN => {
            if send_recovery && !acknowledged {
                ResolvedDecision::EmitRecovery
            } else {
                ResolvedDecision::MarkResolved
            }
        }
        _ => ResolvedDecision::Nothing,
    }
}
