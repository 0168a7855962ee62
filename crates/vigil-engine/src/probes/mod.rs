//! The probe boundary.
//!
//! Probes are external collaborators that talk to vendor tools and
//! devices; only structured samples cross into the engine — no raw tool
//! output. Each entity kind has one registered probe.

pub mod timeout;

use std::sync::Arc;

use vigil_core::errors::ProbeError;
use vigil_core::types::{Entity, EntityKind, FxHashMap, MirrorState, Severity};

pub use timeout::collect_with_timeout;

/// A kernel log pattern class the log probe counts matches for.
/// The probe does the matching; the engine only sees per-class counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogPatternClass {
    FsError,
    JournalError,
    IoError,
    BlockError,
    BufferIoError,
    AtaReset,
    LinkSlow,
    SataDown,
    MediumError,
    SenseError,
}

impl LogPatternClass {
    pub const ALL: &'static [LogPatternClass] = &[
        Self::FsError,
        Self::JournalError,
        Self::IoError,
        Self::BlockError,
        Self::BufferIoError,
        Self::AtaReset,
        Self::LinkSlow,
        Self::SataDown,
        Self::MediumError,
        Self::SenseError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FsError => "fs_error",
            Self::JournalError => "journal_error",
            Self::IoError => "io_error",
            Self::BlockError => "block_error",
            Self::BufferIoError => "buffer_io_error",
            Self::AtaReset => "ata_reset",
            Self::LinkSlow => "link_slow",
            Self::SataDown => "sata_down",
            Self::MediumError => "medium_error",
            Self::SenseError => "sense_error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Corruption-risk classes are critical; bus/link flakiness warns.
    pub fn severity(&self) -> Severity {
        match self {
            Self::FsError
            | Self::JournalError
            | Self::IoError
            | Self::BlockError
            | Self::BufferIoError => Severity::Critical,
            Self::AtaReset
            | Self::LinkSlow
            | Self::SataDown
            | Self::MediumError
            | Self::SenseError => Severity::Warning,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FsError => "filesystem error",
            Self::JournalError => "journal error",
            Self::IoError => "I/O error",
            Self::BlockError => "block device error",
            Self::BufferIoError => "buffer I/O error",
            Self::AtaReset => "ATA bus reset",
            Self::LinkSlow => "slow SATA link",
            Self::SataDown => "SATA link down",
            Self::MediumError => "medium error",
            Self::SenseError => "SCSI sense error",
        }
    }
}

/// One raw ATA SMART attribute as reported by the disk probe.
#[derive(Debug, Clone, Copy)]
pub struct AtaAttribute {
    pub id: u8,
    pub raw: i64,
}

/// SMART sample for a legacy (ATA) disk.
#[derive(Debug, Clone)]
pub struct SmartAtaSample {
    /// Overall SMART self-assessment.
    pub passed: bool,
    pub attrs: Vec<AtaAttribute>,
    pub temperature_c: Option<i64>,
    pub power_on_hours: Option<i64>,
}

/// SMART sample for an NVMe disk (health information log).
#[derive(Debug, Clone)]
pub struct SmartNvmeSample {
    pub passed: bool,
    pub media_errors: Option<i64>,
    pub percentage_used: Option<i64>,
    pub available_spare: Option<i64>,
    pub spare_threshold: Option<i64>,
    pub critical_warning: Option<i64>,
}

/// Mirror/array sample.
#[derive(Debug, Clone)]
pub struct MirrorSample {
    pub state: MirrorState,
    pub sync_pct: Option<f64>,
}

/// Filesystem capacity sample.
#[derive(Debug, Clone)]
pub struct FilesystemSample {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
}

/// Kernel log scan sample: matches per pattern class since the previous
/// run's log position.
#[derive(Debug, Clone)]
pub struct KernelLogSample {
    pub lines_scanned: u64,
    pub counts: Vec<(LogPatternClass, u64)>,
}

/// A structured probe result for one entity.
#[derive(Debug, Clone)]
pub enum ProbeSample {
    Mirror(MirrorSample),
    SmartAta(SmartAtaSample),
    SmartNvme(SmartNvmeSample),
    Filesystem(FilesystemSample),
    KernelLog(KernelLogSample),
}

impl ProbeSample {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Mirror(_) => "mirror",
            Self::SmartAta(_) => "smart_ata",
            Self::SmartNvme(_) => "smart_nvme",
            Self::Filesystem(_) => "filesystem",
            Self::KernelLog(_) => "kernel_log",
        }
    }
}

/// A probe collaborator for one entity kind.
///
/// `collect` may block on external tool execution or device I/O; the
/// engine always calls it through `collect_with_timeout`. `since` is the
/// timestamp of the entity's last committed reading — the log probe scans
/// from there so a missed run never loses matches, and other probes are
/// free to ignore it.
pub trait Probe: Send + Sync {
    fn collect(&self, entity: &Entity, since: Option<i64>) -> Result<ProbeSample, ProbeError>;
}

/// Probes by entity kind, fixed for the lifetime of the engine.
#[derive(Default)]
pub struct ProbeRegistry {
    by_kind: FxHashMap<EntityKind, Arc<dyn Probe>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self {
            by_kind: FxHashMap::default(),
        }
    }

    pub fn register(&mut self, kind: EntityKind, probe: Arc<dyn Probe>) {
        self.by_kind.insert(kind, probe);
    }

    pub fn get(&self, kind: EntityKind) -> Result<Arc<dyn Probe>, ProbeError> {
        self.by_kind
            .get(&kind)
            .cloned()
            .ok_or_else(|| ProbeError::NotRegistered {
                kind: kind.as_str().to_string(),
            })
    }
}
