//! Filesystem capacity evaluation: warn/crit thresholds on used percent.
//! Crossing critical supersedes warning — a single candidate at the
//! highest applicable severity.

use vigil_core::types::reading::{ATTR_FREE_BYTES, ATTR_TOTAL_BYTES, ATTR_USED_PCT};
use vigil_core::types::{CandidateIssue, IssueKind, Reading, Severity};

pub fn evaluate(reading: &Reading, warn_pct: f64, crit_pct: f64) -> Vec<CandidateIssue> {
    let key = reading.entity_key.as_str();
    let Some(used_pct) = reading.float(ATTR_USED_PCT) else {
        return Vec::new();
    };

    let severity = if used_pct >= crit_pct {
        Severity::Critical
    } else if used_pct >= warn_pct {
        Severity::Warning
    } else {
        return Vec::new();
    };

    let free = reading
        .int(ATTR_FREE_BYTES)
        .zip(reading.int(ATTR_TOTAL_BYTES))
        .map(|(free, total)| {
            format!(" ({} free of {})", format_bytes(free), format_bytes(total))
        })
        .unwrap_or_default();

    vec![CandidateIssue::new(
        key,
        IssueKind::FilesystemThresholdExceeded,
        severity,
        format!("{key}: {used_pct:.1}% used{free} (warn {warn_pct:.0}, crit {crit_pct:.0})"),
        "",
    )]
}

fn format_bytes(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use vigil_core::types::AttrValue;

    use super::*;

    fn reading(used_pct: f64) -> Reading {
        let mut r = Reading::new("/srv", 1, 1000);
        r.set(ATTR_USED_PCT, AttrValue::Float(used_pct));
        r
    }

    #[test]
    fn below_warn_raises_nothing() {
        assert!(evaluate(&reading(80.0), 85.0, 95.0).is_empty());
    }

    #[test]
    fn between_warn_and_crit_raises_single_warning() {
        let candidates = evaluate(&reading(90.0), 85.0, 95.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].severity, Severity::Warning);
    }

    #[test]
    fn above_crit_raises_single_critical_not_both() {
        let candidates = evaluate(&reading(96.0), 85.0, 95.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].severity, Severity::Critical);
        assert_eq!(candidates[0].kind, IssueKind::FilesystemThresholdExceeded);
    }

    #[test]
    fn missing_used_pct_raises_nothing() {
        let r = Reading::new("/srv", 1, 1000);
        assert!(evaluate(&r, 85.0, 95.0).is_empty());
    }

    #[test]
    fn description_includes_free_space_when_known() {
        let mut r = reading(96.0);
        r.set(ATTR_FREE_BYTES, AttrValue::Int(40 * 1024 * 1024 * 1024));
        r.set(ATTR_TOTAL_BYTES, AttrValue::Int(1024 * 1024 * 1024 * 1024));
        let candidates = evaluate(&r, 85.0, 95.0);
        assert!(candidates[0].description.contains("40.0GiB free of 1.0TiB"));
    }
}
