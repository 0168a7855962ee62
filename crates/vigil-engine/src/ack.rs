//! Acknowledgment store: operator suppressions keyed by entity.
//!
//! An acknowledgment suppresses all notification emission for its entity
//! — current and future issue kinds alike — until it is removed. Issue
//! rows are still recorded for audit and display. Create is not
//! idempotent: acknowledging an already-acknowledged entity is
//! `AlreadyAcknowledged`, and updating a note means remove + create so
//! both steps land in the audit trail.

use vigil_core::errors::AckError;
use vigil_core::events::AckNotice;
use vigil_storage::connection::writer::with_immediate_transaction;
use vigil_storage::queries::acknowledgments::{self, AckRow};
use vigil_storage::queries::events::{self, EVENT_ACK_CREATED, EVENT_ACK_REMOVED};
use vigil_storage::DatabaseManager;

/// Acknowledgment operations over the shared store.
pub struct AckStore<'a> {
    db: &'a DatabaseManager,
}

impl<'a> AckStore<'a> {
    pub fn new(db: &'a DatabaseManager) -> Self {
        Self { db }
    }

    /// Create an acknowledgment for an entity.
    ///
    /// Returns the notice to hand to the dispatcher when ack notices are
    /// configured. Fails with `AlreadyAcknowledged` if one exists.
    pub fn create(
        &self,
        entity_key: &str,
        note: &str,
        created_by: &str,
        now: i64,
    ) -> Result<AckNotice, AckError> {
        if self.get(entity_key)?.is_some() {
            return Err(AckError::AlreadyAcknowledged {
                entity_key: entity_key.to_string(),
            });
        }

        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                acknowledgments::insert(
                    tx,
                    &AckRow {
                        entity_key: entity_key.to_string(),
                        note: note.to_string(),
                        created_by: created_by.to_string(),
                        created_at: now,
                    },
                )?;
                events::insert(
                    tx,
                    now,
                    EVENT_ACK_CREATED,
                    None,
                    Some(entity_key),
                    &format!("{entity_key} acknowledged by {created_by}: {note}"),
                    None,
                )?;
                Ok(())
            })
        })?;

        Ok(AckNotice {
            entity_key: entity_key.to_string(),
            note: note.to_string(),
            created_by: created_by.to_string(),
            created_at: now,
        })
    }

    /// Remove the acknowledgment for an entity.
    /// Fails with `NotFound` if none exists.
    pub fn remove(&self, entity_key: &str, now: i64) -> Result<(), AckError> {
        let removed = self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let removed = acknowledgments::delete(tx, entity_key)?;
                if removed {
                    events::insert(
                        tx,
                        now,
                        EVENT_ACK_REMOVED,
                        None,
                        Some(entity_key),
                        &format!("acknowledgment removed for {entity_key}"),
                        None,
                    )?;
                }
                Ok(removed)
            })
        })?;

        if !removed {
            return Err(AckError::NotFound {
                entity_key: entity_key.to_string(),
            });
        }
        Ok(())
    }

    /// The acknowledgment for an entity, if any.
    pub fn get(&self, entity_key: &str) -> Result<Option<AckRow>, AckError> {
        Ok(self
            .db
            .with_writer(|conn| acknowledgments::get(conn, entity_key))?)
    }

    /// All acknowledgments.
    pub fn list(&self) -> Result<Vec<AckRow>, AckError> {
        Ok(self.db.with_writer(acknowledgments::all)?)
    }
}
