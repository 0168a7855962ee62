//! Monitored entities.

use serde::{Deserialize, Serialize};

/// The kind of object an entity represents. Selects the evaluation rules
/// and the attribute vocabulary of its readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A physical disk monitored via SMART (ATA or NVMe).
    Disk,
    /// A software RAID mirror (e.g. an LVM raid1 logical volume).
    Mirror,
    /// A mounted filesystem monitored for capacity.
    Mountpoint,
    /// A kernel log source scanned for storage error patterns.
    LogSource,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Mirror => "mirror",
            Self::Mountpoint => "mountpoint",
            Self::LogSource => "log_source",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitored object with a stable identity.
///
/// The key is the device path for disks, `vg/lv` for mirrors, the mount
/// path for mountpoints, and the source name for log sources. Identity is
/// immutable; configuration may add or remove entities between runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub key: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(key: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}
