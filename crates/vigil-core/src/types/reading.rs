//! Normalized readings: one timestamped observation of an entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single attribute value inside a reading.
///
/// Counters and flags are `Int`, percentages are `Float`, enum states
/// (e.g. mirror state) are `Text`. An attribute that a probe could not
/// measure is omitted from the map entirely — zero is a valid measured
/// value and must not stand in for "absent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Integer view of the value, if it is numeric and integral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Float view of any numeric value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Sync/health state of a RAID mirror, as reported by the mirror probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorState {
    Healthy,
    Syncing,
    Degraded,
    Failed,
}

impl MirrorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Syncing => "syncing",
            Self::Degraded => "degraded",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "healthy" => Some(Self::Healthy),
            "syncing" => Some(Self::Syncing),
            "degraded" => Some(Self::Degraded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One normalized observation of an entity at a point in time.
/// Append-only; never mutated after write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub entity_key: String,
    pub run_id: i64,
    pub recorded_at: i64,
    /// Attribute name → value, in the fixed per-kind vocabulary.
    /// BTreeMap so the serialized JSON is deterministic.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Reading {
    pub fn new(entity_key: impl Into<String>, run_id: i64, recorded_at: i64) -> Self {
        Self {
            entity_key: entity_key.into(),
            run_id,
            recorded_at,
            attrs: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) {
        self.attrs.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(AttrValue::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).and_then(AttrValue::as_float)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_text)
    }
}

// ---- Attribute vocabulary ----
// Shared between the normalizer (writer) and the evaluators (readers).

/// Overall health verdict: 1 = passed, 0 = failed self-assessment.
pub const ATTR_HEALTHY: &str = "healthy";
/// Mirror state, one of the `MirrorState` strings.
pub const ATTR_MIRROR_STATE: &str = "state";
/// Mirror sync progress percentage.
pub const ATTR_SYNC_PCT: &str = "sync_pct";
/// Filesystem used capacity percentage.
pub const ATTR_USED_PCT: &str = "used_pct";
pub const ATTR_TOTAL_BYTES: &str = "total_bytes";
pub const ATTR_FREE_BYTES: &str = "free_bytes";
pub const ATTR_USED_BYTES: &str = "used_bytes";
/// Lines the log probe scanned since the previous run position.
pub const ATTR_LINES_SCANNED: &str = "lines_scanned";
pub const ATTR_TEMPERATURE: &str = "temperature_c";
pub const ATTR_POWER_ON_HOURS: &str = "power_on_hours";
pub const ATTR_NVME_MEDIA_ERRORS: &str = "nvme_media_errors";
pub const ATTR_NVME_PCT_USED: &str = "nvme_percentage_used";
pub const ATTR_NVME_SPARE: &str = "nvme_available_spare";
pub const ATTR_NVME_SPARE_THRESHOLD: &str = "nvme_spare_threshold";
pub const ATTR_NVME_CRITICAL_WARNING: &str = "nvme_critical_warning";

/// Attribute name for a raw ATA SMART counter, e.g. `attr_5`.
pub fn ata_attr_name(id: u8) -> String {
    format!("attr_{id}")
}

/// Attribute name for a kernel log pattern class count, e.g. `count_io_error`.
pub fn log_count_name(class: &str) -> String {
    format!("count_{class}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_attribute_is_distinct_from_zero() {
        let mut reading = Reading::new("/dev/sda", 1, 1000);
        reading.set(ata_attr_name(5), AttrValue::Int(0));

        assert_eq!(reading.int("attr_5"), Some(0));
        assert_eq!(reading.int("attr_197"), None);
    }

    #[test]
    fn attr_json_round_trip_is_stable() {
        let mut reading = Reading::new("/srv", 3, 5000);
        reading.set(ATTR_USED_PCT, AttrValue::Float(90.5));
        reading.set(ATTR_TOTAL_BYTES, AttrValue::Int(1_000_000));
        reading.set(ATTR_MIRROR_STATE, AttrValue::Text("healthy".into()));

        let json = serde_json::to_string(&reading.attrs).unwrap();
        let back: std::collections::BTreeMap<String, AttrValue> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading.attrs);
    }

    #[test]
    fn mirror_state_parses_round_trip() {
        for state in [
            MirrorState::Healthy,
            MirrorState::Syncing,
            MirrorState::Degraded,
            MirrorState::Failed,
        ] {
            assert_eq!(MirrorState::parse(state.as_str()), Some(state));
        }
        assert_eq!(MirrorState::parse("rebuilding"), None);
    }
}
