//! Kernel log evaluation: per-class match counts against a per-run
//! threshold, so one-off transient messages never trigger alerts.

use vigil_core::types::{CandidateIssue, IssueKind, Reading};

use crate::probes::LogPatternClass;

const COUNT_PREFIX: &str = "count_";

pub fn evaluate(reading: &Reading, per_run_threshold: u64) -> Vec<CandidateIssue> {
    let key = reading.entity_key.as_str();
    let mut candidates = Vec::new();

    for (name, value) in &reading.attrs {
        let Some(class_name) = name.strip_prefix(COUNT_PREFIX) else {
            continue;
        };
        let Some(class) = LogPatternClass::parse(class_name) else {
            continue;
        };
        let Some(count) = value.as_int() else {
            continue;
        };
        if count >= 0 && count as u64 >= per_run_threshold {
            candidates.push(CandidateIssue::new(
                key,
                IssueKind::KernelIoError,
                class.severity(),
                format!("{key}: {count}x {} since last run", class.description()),
                class.as_str(),
            ));
        }
    }

    candidates
}
