//! Probe execution with a mandatory timeout.
//!
//! A probe that blocks past its deadline is treated as `ProbeUnavailable`
//! for this run, not as a crash. The worker thread is detached; the
//! channel is bounded so a late result is dropped, never blocks.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use tracing::debug;
use vigil_core::errors::ProbeError;
use vigil_core::types::Entity;

use super::{Probe, ProbeSample};

/// Run `probe.collect` for `entity` on a worker thread, waiting at most
/// `timeout` for the result.
pub fn collect_with_timeout(
    probe: Arc<dyn Probe>,
    entity: &Entity,
    since: Option<i64>,
    timeout: Duration,
) -> Result<ProbeSample, ProbeError> {
    let (tx, rx) = bounded(1);
    let thread_entity = entity.clone();
    std::thread::spawn(move || {
        let result = probe.collect(&thread_entity, since);
        // The receiver may be gone after a timeout; a failed send is fine.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            debug!(entity = %entity, ?timeout, "probe timed out");
            Err(ProbeError::Timeout {
                entity_key: entity.key.clone(),
                timeout,
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(ProbeError::Unavailable {
            entity_key: entity.key.clone(),
            reason: "probe worker terminated without a result".to_string(),
        }),
    }
}
