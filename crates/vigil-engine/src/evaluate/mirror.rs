//! Mirror/RAID evaluation: state machine plus resync stall detection.
//!
//! The mirror is healthy, syncing, degraded, or failed. Degraded and
//! failed states are issues for as long as they persist. A resync is only
//! an issue once its duration (tracked via EntityState.sync_started_at)
//! exceeds the configured stall threshold.

use vigil_core::types::reading::{ATTR_MIRROR_STATE, ATTR_SYNC_PCT};
use vigil_core::types::{
    CandidateIssue, EntityState, IssueKind, MirrorState, Reading, Severity,
};

pub fn evaluate(
    reading: &Reading,
    prior: Option<&EntityState>,
    resync_stall_secs: u64,
    now: i64,
) -> Vec<CandidateIssue> {
    let key = reading.entity_key.as_str();
    let Some(state) = reading.text(ATTR_MIRROR_STATE).and_then(MirrorState::parse) else {
        return Vec::new();
    };

    match state {
        MirrorState::Healthy => Vec::new(),
        MirrorState::Degraded | MirrorState::Failed => {
            vec![CandidateIssue::new(
                key,
                IssueKind::RaidDegraded,
                Severity::Critical,
                format!("{key}: mirror is {}", state.as_str()),
                "",
            )]
        }
        MirrorState::Syncing => {
            let Some(sync_started) = sync_start(prior) else {
                // Resync just began this run; nothing to flag yet.
                return Vec::new();
            };
            let elapsed = now - sync_started;
            if elapsed <= resync_stall_secs as i64 {
                return Vec::new();
            }
            let pct = reading
                .float(ATTR_SYNC_PCT)
                .map(|p| format!(" at {p:.1}%"))
                .unwrap_or_default();
            vec![CandidateIssue::new(
                key,
                IssueKind::RaidResyncStalled,
                Severity::Critical,
                format!("{key}: resync stalled{pct} ({elapsed}s and counting)"),
                "",
            )]
        }
    }
}

/// When the ongoing resync started, per the prior state. None when the
/// prior state is absent or was not syncing.
fn sync_start(prior: Option<&EntityState>) -> Option<i64> {
    let prior = prior?;
    let was_syncing = prior.text(ATTR_MIRROR_STATE) == Some(MirrorState::Syncing.as_str());
    if !was_syncing {
        return None;
    }
    // Rows written before stall tracking fall back to the reading time.
    Some(prior.sync_started_at.unwrap_or(prior.recorded_at))
}

/// Compute the sync_started_at to persist with this run's EntityState.
pub fn next_sync_started_at(
    reading: &Reading,
    prior: Option<&EntityState>,
    now: i64,
) -> Option<i64> {
    let syncing = reading.text(ATTR_MIRROR_STATE) == Some(MirrorState::Syncing.as_str());
    if !syncing {
        return None;
    }
    sync_start(prior).or(Some(now))
}

#[cfg(test)]
mod tests {
    use vigil_core::types::AttrValue;

    use super::*;

    fn reading(state: MirrorState, sync_pct: Option<f64>) -> Reading {
        let mut r = Reading::new("vg0/mirror0", 2, 10_000);
        r.set(ATTR_MIRROR_STATE, AttrValue::Text(state.as_str().to_string()));
        if let Some(pct) = sync_pct {
            r.set(ATTR_SYNC_PCT, AttrValue::Float(pct));
        }
        r
    }

    fn prior(state: MirrorState, recorded_at: i64, sync_started_at: Option<i64>) -> EntityState {
        let mut r = Reading::new("vg0/mirror0", 1, recorded_at);
        r.set(ATTR_MIRROR_STATE, AttrValue::Text(state.as_str().to_string()));
        EntityState::from_reading(&r, sync_started_at)
    }

    const STALL: u64 = 3600;

    #[test]
    fn healthy_mirror_raises_nothing() {
        assert!(evaluate(&reading(MirrorState::Healthy, None), None, STALL, 10_000).is_empty());
    }

    #[test]
    fn degraded_mirror_is_critical_while_it_lasts() {
        let candidates = evaluate(&reading(MirrorState::Degraded, None), None, STALL, 10_000);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, IssueKind::RaidDegraded);
        assert_eq!(candidates[0].severity, Severity::Critical);
    }

    #[test]
    fn fresh_resync_is_not_an_issue() {
        // Prior state was healthy: the resync starts this run.
        let p = prior(MirrorState::Healthy, 9000, None);
        let candidates =
            evaluate(&reading(MirrorState::Syncing, Some(12.0)), Some(&p), STALL, 10_000);
        assert!(candidates.is_empty());
    }

    #[test]
    fn resync_within_the_window_is_not_an_issue() {
        let p = prior(MirrorState::Syncing, 9500, Some(9000));
        let candidates =
            evaluate(&reading(MirrorState::Syncing, Some(40.0)), Some(&p), STALL, 10_000);
        assert!(candidates.is_empty());
    }

    #[test]
    fn resync_past_the_stall_threshold_is_critical() {
        let p = prior(MirrorState::Syncing, 9500, Some(5000));
        let candidates =
            evaluate(&reading(MirrorState::Syncing, Some(40.1)), Some(&p), STALL, 10_000);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, IssueKind::RaidResyncStalled);
        assert!(candidates[0].description.contains("40.1%"));
    }

    #[test]
    fn sync_started_at_carries_forward_and_clears() {
        // Entering syncing stamps now.
        let from_healthy = prior(MirrorState::Healthy, 9000, None);
        assert_eq!(
            next_sync_started_at(&reading(MirrorState::Syncing, None), Some(&from_healthy), 10_000),
            Some(10_000)
        );
        // Staying in syncing keeps the original start.
        let still_syncing = prior(MirrorState::Syncing, 9000, Some(8000));
        assert_eq!(
            next_sync_started_at(&reading(MirrorState::Syncing, None), Some(&still_syncing), 10_000),
            Some(8000)
        );
        // Leaving syncing clears it.
        assert_eq!(
            next_sync_started_at(&reading(MirrorState::Healthy, None), Some(&still_syncing), 10_000),
            None
        );
    }
}
