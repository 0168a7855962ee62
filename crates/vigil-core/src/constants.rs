//! Shared constants for the Vigil monitoring engine.

/// Vigil version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default notification cooldown for an ongoing issue (6 hours).
pub const DEFAULT_COOLDOWN_SECS: u64 = 21_600;

/// Default mirror resync stall threshold (4 hours of continuous syncing).
pub const DEFAULT_RESYNC_STALL_SECS: u64 = 14_400;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

/// Default filesystem warning threshold (percent used).
pub const DEFAULT_FS_WARN_PCT: f64 = 85.0;

/// Default filesystem critical threshold (percent used).
pub const DEFAULT_FS_CRIT_PCT: f64 = 95.0;

/// Default reallocated-sector absolute warning threshold (attribute 5).
pub const DEFAULT_REALLOC_WARN: i64 = 10;

/// Default CRC error delta that warrants a warning (attribute 199).
pub const DEFAULT_CRC_WARN_DELTA: i64 = 1;

/// Default pending-sector critical threshold (attribute 197).
pub const DEFAULT_PENDING_CRIT: i64 = 0;

/// Default offline-uncorrectable critical threshold (attribute 198).
pub const DEFAULT_OFFLINE_UNCORR_CRIT: i64 = 0;

/// Default reported-uncorrectable critical threshold (attribute 187).
pub const DEFAULT_REPORTED_UNCORR_CRIT: i64 = 0;

/// Default NVMe wear warning threshold (percentage_used).
pub const DEFAULT_NVME_WEAR_WARN_PCT: i64 = 90;

/// Default per-run kernel log match threshold.
pub const DEFAULT_LOG_PER_RUN_THRESHOLD: u64 = 1;

/// Default retention window for readings (days).
pub const DEFAULT_RETENTION_METRICS_DAYS: u32 = 90;

/// Default retention window for events, resolved issues, and runs (days).
pub const DEFAULT_RETENTION_EVENTS_DAYS: u32 = 180;

/// Seconds per day, for retention cutoff arithmetic.
pub const SECS_PER_DAY: i64 = 86_400;
