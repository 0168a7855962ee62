//! Last-known state per entity, used for delta and duration detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::reading::{AttrValue, Reading};

/// The most recent committed reading for an entity, plus the bookkeeping
/// the evaluators need across runs. Exactly one row per entity,
/// overwritten each run; persisted so correctness survives restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_key: String,
    pub run_id: i64,
    pub recorded_at: i64,
    pub attrs: BTreeMap<String, AttrValue>,
    /// Epoch seconds at which the current resync began. Set when a mirror
    /// enters `syncing`, carried forward while it stays there, cleared on
    /// any other state.
    pub sync_started_at: Option<i64>,
}

impl EntityState {
    /// Build the successor state from this run's reading.
    /// `sync_started_at` must be computed by the caller (it depends on the
    /// prior state); see the run orchestrator.
    pub fn from_reading(reading: &Reading, sync_started_at: Option<i64>) -> Self {
        Self {
            entity_key: reading.entity_key.clone(),
            run_id: reading.run_id,
            recorded_at: reading.recorded_at,
            attrs: reading.attrs.clone(),
            sync_started_at,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(AttrValue::as_int)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_text)
    }
}
