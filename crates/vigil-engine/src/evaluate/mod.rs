//! Issue evaluators — one pure rule set per entity kind behind a uniform
//! signature, selected by a tagged-variant dispatch.
//!
//! Evaluators never touch the database; they turn `(reading, prior state,
//! thresholds)` into candidate issues, and the run orchestrator commits.

pub mod filesystem;
pub mod kernel_log;
pub mod mirror;
pub mod smart;

use vigil_core::config::VigilConfig;
use vigil_core::types::{CandidateIssue, Entity, EntityKind, EntityState, Reading};

/// Evaluate one entity's reading against its prior state.
pub fn evaluate(
    entity: &Entity,
    reading: &Reading,
    prior: Option<&EntityState>,
    config: &VigilConfig,
    now: i64,
) -> Vec<CandidateIssue> {
    match entity.kind {
        EntityKind::Disk => smart::evaluate(reading, prior, &config.smart.thresholds),
        EntityKind::Mirror => {
            mirror::evaluate(reading, prior, config.mirror.resync_stall_secs, now)
        }
        EntityKind::Mountpoint => {
            let (warn_pct, crit_pct) = match config.mountpoint(&entity.key) {
                Some(mp) => (mp.warn_pct, mp.crit_pct),
                None => (
                    vigil_core::constants::DEFAULT_FS_WARN_PCT,
                    vigil_core::constants::DEFAULT_FS_CRIT_PCT,
                ),
            };
            filesystem::evaluate(reading, warn_pct, crit_pct)
        }
        EntityKind::LogSource => {
            kernel_log::evaluate(reading, config.kernel_log.per_run_threshold)
        }
    }
}
