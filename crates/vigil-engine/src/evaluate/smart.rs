//! SMART disk evaluation: absolute thresholds and delta detection.
//!
//! Delta rules fire only when a counter increases between consecutive
//! readings. Many counters are cumulative since manufacture, so a static
//! nonzero baseline is not actionable; the delta is computed against the
//! prior EntityState, never an arbitrary historical point.

use vigil_core::config::SmartThresholds;
use vigil_core::smart_attrs::display_name;
use vigil_core::types::reading::{
    ata_attr_name, ATTR_HEALTHY, ATTR_NVME_CRITICAL_WARNING, ATTR_NVME_MEDIA_ERRORS,
    ATTR_NVME_PCT_USED, ATTR_NVME_SPARE, ATTR_NVME_SPARE_THRESHOLD,
};
use vigil_core::types::{CandidateIssue, EntityState, IssueKind, Reading, Severity};

/// Evaluate one disk reading. At most one candidate per attribute, the
/// highest severity applicable.
pub fn evaluate(
    reading: &Reading,
    prior: Option<&EntityState>,
    thresholds: &SmartThresholds,
) -> Vec<CandidateIssue> {
    let mut candidates = Vec::new();
    let key = reading.entity_key.as_str();

    if reading.int(ATTR_HEALTHY) == Some(0) {
        candidates.push(CandidateIssue::new(
            key,
            IssueKind::SmartSelftestFailure,
            Severity::Critical,
            format!("{key}: SMART overall health self-assessment failed"),
            "",
        ));
    }

    // ATA attribute rules. Each entry: (attr id, absolute threshold rule,
    // delta rule); the worst applicable severity wins per attribute.
    push_attr(
        &mut candidates,
        reading,
        prior,
        5,
        Some((thresholds.realloc_warn, Severity::Warning)),
        Some((1, Severity::Critical)),
    );
    push_attr(
        &mut candidates,
        reading,
        prior,
        187,
        Some((thresholds.reported_uncorr_crit, Severity::Critical)),
        None,
    );
    push_attr(
        &mut candidates,
        reading,
        prior,
        197,
        Some((thresholds.pending_crit, Severity::Critical)),
        None,
    );
    push_attr(
        &mut candidates,
        reading,
        prior,
        198,
        Some((thresholds.offline_uncorr_crit, Severity::Critical)),
        None,
    );
    push_attr(
        &mut candidates,
        reading,
        prior,
        199,
        None,
        Some((thresholds.crc_warn_delta, Severity::Warning)),
    );

    // NVMe rules.
    if let Some(warning) = reading.int(ATTR_NVME_CRITICAL_WARNING) {
        if warning != 0 {
            candidates.push(CandidateIssue::new(
                key,
                IssueKind::SmartAttributeRegression,
                Severity::Critical,
                format!("{key}: NVMe critical warning flags 0x{warning:02x}"),
                ATTR_NVME_CRITICAL_WARNING,
            ));
        }
    }
    if let Some(current) = reading.int(ATTR_NVME_MEDIA_ERRORS) {
        if let Some(previous) = prior.and_then(|p| p.int(ATTR_NVME_MEDIA_ERRORS)) {
            let delta = current - previous;
            if delta > 0 {
                candidates.push(CandidateIssue::new(
                    key,
                    IssueKind::SmartAttributeRegression,
                    Severity::Critical,
                    format!("{key}: NVMe media errors increased by {delta} (now {current})"),
                    ATTR_NVME_MEDIA_ERRORS,
                ));
            }
        }
    }
    if let (Some(spare), Some(threshold)) = (
        reading.int(ATTR_NVME_SPARE),
        reading.int(ATTR_NVME_SPARE_THRESHOLD),
    ) {
        if spare < threshold {
            candidates.push(CandidateIssue::new(
                key,
                IssueKind::SmartAttributeRegression,
                Severity::Critical,
                format!("{key}: NVMe available spare {spare}% below threshold {threshold}%"),
                ATTR_NVME_SPARE,
            ));
        }
    }
    if let Some(pct) = reading.int(ATTR_NVME_PCT_USED) {
        if pct >= thresholds.nvme_wear_warn_pct {
            candidates.push(CandidateIssue::new(
                key,
                IssueKind::SmartAttributeRegression,
                Severity::Warning,
                format!("{key}: NVMe wear at {pct}% of rated life"),
                ATTR_NVME_PCT_USED,
            ));
        }
    }

    candidates
}

/// Apply the absolute and delta rules for one ATA attribute and push the
/// highest-severity applicable candidate.
fn push_attr(
    candidates: &mut Vec<CandidateIssue>,
    reading: &Reading,
    prior: Option<&EntityState>,
    attr_id: u8,
    absolute: Option<(i64, Severity)>,
    delta_rule: Option<(i64, Severity)>,
) {
    let name = ata_attr_name(attr_id);
    let Some(current) = reading.int(&name) else {
        return;
    };
    let key = reading.entity_key.as_str();
    let attr_name = display_name(attr_id);

    let mut best: Option<(Severity, String)> = None;

    if let Some((threshold, severity)) = absolute {
        if current > threshold {
            best = Some((
                severity,
                format!("{key}: {attr_name} at {current} (threshold {threshold})"),
            ));
        }
    }

    if let Some((min_delta, severity)) = delta_rule {
        if let Some(previous) = prior.and_then(|p| p.int(&name)) {
            let delta = current - previous;
            if delta >= min_delta && delta > 0 {
                let worse = match &best {
                    Some((existing, _)) => severity > *existing,
                    None => true,
                };
                if worse {
                    best = Some((
                        severity,
                        format!("{key}: {attr_name} increased by {delta} (now {current})"),
                    ));
                }
            }
        }
    }

    if let Some((severity, description)) = best {
        candidates.push(CandidateIssue::new(
            key,
            IssueKind::SmartAttributeRegression,
            severity,
            description,
            &attr_id.to_string(),
        ));
    }
}
