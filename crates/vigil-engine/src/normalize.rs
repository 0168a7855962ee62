//! Reading normalizer: probe samples → readings with a fixed per-kind
//! attribute vocabulary.
//!
//! An attribute the probe could not measure is omitted, never defaulted
//! to zero. Probe failures never become readings — a missing reading for
//! a run is distinct from a reading showing healthy values.

use vigil_core::errors::ProbeError;
use vigil_core::smart_attrs::WATCHED_ATA_ATTRS;
use vigil_core::types::reading::{
    ata_attr_name, log_count_name, ATTR_FREE_BYTES, ATTR_HEALTHY, ATTR_LINES_SCANNED,
    ATTR_MIRROR_STATE, ATTR_NVME_CRITICAL_WARNING, ATTR_NVME_MEDIA_ERRORS, ATTR_NVME_PCT_USED,
    ATTR_NVME_SPARE, ATTR_NVME_SPARE_THRESHOLD, ATTR_POWER_ON_HOURS, ATTR_SYNC_PCT,
    ATTR_TEMPERATURE, ATTR_TOTAL_BYTES, ATTR_USED_BYTES, ATTR_USED_PCT,
};
use vigil_core::types::{AttrValue, Entity, EntityKind, Reading};

use crate::probes::ProbeSample;

/// Convert a probe sample for `entity` into a normalized reading.
/// A sample whose variant does not match the entity kind is rejected.
pub fn normalize(
    entity: &Entity,
    sample: ProbeSample,
    run_id: i64,
    now: i64,
) -> Result<Reading, ProbeError> {
    let mut reading = Reading::new(entity.key.clone(), run_id, now);

    match (entity.kind, sample) {
        (EntityKind::Mirror, ProbeSample::Mirror(s)) => {
            reading.set(ATTR_MIRROR_STATE, AttrValue::Text(s.state.as_str().to_string()));
            if let Some(pct) = s.sync_pct {
                reading.set(ATTR_SYNC_PCT, AttrValue::Float(pct));
            }
        }
        (EntityKind::Disk, ProbeSample::SmartAta(s)) => {
            reading.set(ATTR_HEALTHY, AttrValue::Int(s.passed as i64));
            for attr in &s.attrs {
                if WATCHED_ATA_ATTRS.contains(&attr.id) {
                    reading.set(ata_attr_name(attr.id), AttrValue::Int(attr.raw));
                }
            }
            if let Some(temp) = s.temperature_c {
                reading.set(ATTR_TEMPERATURE, AttrValue::Int(temp));
            }
            if let Some(hours) = s.power_on_hours {
                reading.set(ATTR_POWER_ON_HOURS, AttrValue::Int(hours));
            }
        }
        (EntityKind::Disk, ProbeSample::SmartNvme(s)) => {
            reading.set(ATTR_HEALTHY, AttrValue::Int(s.passed as i64));
            if let Some(v) = s.media_errors {
                reading.set(ATTR_NVME_MEDIA_ERRORS, AttrValue::Int(v));
            }
            if let Some(v) = s.percentage_used {
                reading.set(ATTR_NVME_PCT_USED, AttrValue::Int(v));
            }
            if let Some(v) = s.available_spare {
                reading.set(ATTR_NVME_SPARE, AttrValue::Int(v));
            }
            if let Some(v) = s.spare_threshold {
                reading.set(ATTR_NVME_SPARE_THRESHOLD, AttrValue::Int(v));
            }
            if let Some(v) = s.critical_warning {
                reading.set(ATTR_NVME_CRITICAL_WARNING, AttrValue::Int(v));
            }
        }
        (EntityKind::Mountpoint, ProbeSample::Filesystem(s)) => {
            let used_pct = if s.total_bytes == 0 {
                0.0
            } else {
                (s.used_bytes as f64 / s.total_bytes as f64) * 100.0
            };
            reading.set(ATTR_USED_PCT, AttrValue::Float(used_pct));
            reading.set(ATTR_TOTAL_BYTES, AttrValue::Int(s.total_bytes as i64));
            reading.set(ATTR_FREE_BYTES, AttrValue::Int(s.free_bytes as i64));
            reading.set(ATTR_USED_BYTES, AttrValue::Int(s.used_bytes as i64));
        }
        (EntityKind::LogSource, ProbeSample::KernelLog(s)) => {
            reading.set(ATTR_LINES_SCANNED, AttrValue::Int(s.lines_scanned as i64));
            for (class, count) in &s.counts {
                if *count > 0 {
                    reading.set(log_count_name(class.as_str()), AttrValue::Int(*count as i64));
                }
            }
        }
        (kind, sample) => {
            return Err(ProbeError::Mismatch {
                entity_key: entity.key.clone(),
                expected: kind.as_str(),
                got: sample.kind_name(),
            });
        }
    }

    Ok(reading)
}
