//! Issues: detected problems and their identity across runs.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// How bad a detected problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an issue row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// The kind of problem detected. One evaluation rule per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    RaidDegraded,
    RaidResyncStalled,
    SmartAttributeRegression,
    SmartSelftestFailure,
    FilesystemThresholdExceeded,
    KernelIoError,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RaidDegraded => "raid-degraded",
            Self::RaidResyncStalled => "raid-resync-stalled",
            Self::SmartAttributeRegression => "smart-attribute-regression",
            Self::SmartSelftestFailure => "smart-selftest-failure",
            Self::FilesystemThresholdExceeded => "filesystem-threshold-exceeded",
            Self::KernelIoError => "kernel-io-error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "raid-degraded" => Some(Self::RaidDegraded),
            "raid-resync-stalled" => Some(Self::RaidResyncStalled),
            "smart-attribute-regression" => Some(Self::SmartAttributeRegression),
            "smart-selftest-failure" => Some(Self::SmartSelftestFailure),
            "filesystem-threshold-exceeded" => Some(Self::FilesystemThresholdExceeded),
            "kernel-io-error" => Some(Self::KernelIoError),
            _ => None,
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic identity of "the same problem" across runs.
///
/// xxh3 of `entity_key | kind | discriminator`, rendered as 16 hex chars.
/// The discriminator separates instances within a kind on one entity:
/// the SMART attribute id, the log pattern class — empty for kinds that
/// can only occur once per entity.
pub fn fingerprint(entity_key: &str, kind: IssueKind, discriminator: &str) -> String {
    let material = format!("{entity_key}|{}|{discriminator}", kind.as_str());
    format!("{:016x}", xxh3_64(material.as_bytes()))
}

/// A problem detected by an evaluator in the current run.
///
/// Candidates are pure values: they never touch the database themselves.
/// The run orchestrator turns them into issue rows and ledger decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateIssue {
    pub entity_key: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub fingerprint: String,
}

impl CandidateIssue {
    pub fn new(
        entity_key: impl Into<String>,
        kind: IssueKind,
        severity: Severity,
        description: impl Into<String>,
        discriminator: &str,
    ) -> Self {
        let entity_key = entity_key.into();
        let fingerprint = fingerprint(&entity_key, kind, discriminator);
        Self {
            entity_key,
            kind,
            severity,
            description: description.into(),
            fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint("/dev/sda", IssueKind::SmartAttributeRegression, "5");
        let b = fingerprint("/dev/sda", IssueKind::SmartAttributeRegression, "5");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn fingerprint_separates_discriminators_and_entities() {
        let attr5 = fingerprint("/dev/sda", IssueKind::SmartAttributeRegression, "5");
        let attr199 = fingerprint("/dev/sda", IssueKind::SmartAttributeRegression, "199");
        let other_disk = fingerprint("/dev/sdb", IssueKind::SmartAttributeRegression, "5");
        assert_ne!(attr5, attr199);
        assert_ne!(attr5, other_disk);
    }

    #[test]
    fn severity_orders_critical_above_warning() {
        assert!(Severity::Critical > Severity::Warning);
    }

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            IssueKind::RaidDegraded,
            IssueKind::RaidResyncStalled,
            IssueKind::SmartAttributeRegression,
            IssueKind::SmartSelftestFailure,
            IssueKind::FilesystemThresholdExceeded,
            IssueKind::KernelIoError,
        ] {
            assert_eq!(IssueKind::parse(kind.as_str()), Some(kind));
        }
    }
}
