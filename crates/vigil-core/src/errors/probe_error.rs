//! Probe boundary errors.

use std::time::Duration;

/// Errors reported by probe collaborators.
///
/// All variants are recoverable and per-entity: they are recorded in the
/// run summary and never abort evaluation of other entities. A missing
/// reading is distinct from a healthy reading — none of these are ever
/// converted into a `Reading`.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe unavailable for {entity_key}: {reason}")]
    Unavailable { entity_key: String, reason: String },

    #[error("probe for {entity_key} timed out after {timeout:?}")]
    Timeout {
        entity_key: String,
        timeout: Duration,
    },

    #[error("probe for {entity_key} returned a {got} sample, expected {expected}")]
    Mismatch {
        entity_key: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("no probe registered for entity kind {kind}")]
    NotRegistered { kind: String },
}

impl ProbeError {
    /// One-line reason string for the run summary / probe_failures table.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
