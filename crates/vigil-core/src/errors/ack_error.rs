//! Acknowledgment API errors.

use super::StorageError;

/// Caller errors for the acknowledgment store. Not engine-fatal.
#[derive(Debug, thiserror::Error)]
pub enum AckError {
    /// Creating an acknowledgment for an entity that already has one.
    /// Create is not idempotent; update by remove + create so both steps
    /// leave an audit event.
    #[error("entity {entity_key} is already acknowledged")]
    AlreadyAcknowledged { entity_key: String },

    #[error("no acknowledgment exists for entity {entity_key}")]
    NotFound { entity_key: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
