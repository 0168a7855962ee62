//! Engine errors and non-fatal per-entity error collection.

use super::{AckError, ConfigError, ProbeError, StorageError};

/// Errors that can abort a run. Aggregates subsystem errors via `From`.
///
/// Per-entity probe failures are NOT routed through this type — they are
/// collected on the run outcome so one unreachable disk never blocks
/// evaluation of the others.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("acknowledgment error: {0}")]
    Ack(#[from] AckError),

    #[error("another run holds the run lock")]
    RunInProgress,
}

/// A per-entity probe failure recorded in the run summary.
#[derive(Debug, Clone)]
pub struct ProbeFailure {
    pub entity_key: String,
    pub reason: String,
}

impl From<&ProbeError> for ProbeFailure {
    fn from(err: &ProbeError) -> Self {
        let entity_key = match err {
            ProbeError::Unavailable { entity_key, .. }
            | ProbeError::Timeout { entity_key, .. }
            | ProbeError::Mismatch { entity_key, .. } => entity_key.clone(),
            ProbeError::NotRegistered { .. } => String::new(),
        };
        Self {
            entity_key,
            reason: err.reason(),
        }
    }
}
