//! Top-level Vigil configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;
use crate::types::{Entity, EntityKind};

/// Host identification.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Label reported in run rows and notifications. Falls back to the
    /// `HOSTNAME` environment variable, then "localhost".
    pub hostname_label: String,
}

impl MonitorConfig {
    pub fn hostname(&self) -> String {
        if !self.hostname_label.is_empty() {
            return self.hostname_label.clone();
        }
        std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
    }
}

/// RAID mirror monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub enabled: bool,
    pub vg: String,
    pub lv: String,
    /// Continuous syncing longer than this is a stalled resync.
    pub resync_stall_secs: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            vg: "RAID".to_string(),
            lv: "RAID".to_string(),
            resync_stall_secs: constants::DEFAULT_RESYNC_STALL_SECS,
        }
    }
}

impl MirrorConfig {
    /// Stable entity key for the mirror: `vg/lv`.
    pub fn entity_key(&self) -> String {
        format!("{}/{}", self.vg, self.lv)
    }
}

/// SMART attribute thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartThresholds {
    /// Attribute 5 absolute value above which a warning is raised.
    pub realloc_warn: i64,
    /// Attribute 199 increase per run that warrants a warning.
    pub crc_warn_delta: i64,
    /// Attribute 197 absolute value above which a critical is raised.
    pub pending_crit: i64,
    /// Attribute 198 absolute value above which a critical is raised.
    pub offline_uncorr_crit: i64,
    /// Attribute 187 absolute value above which a critical is raised.
    pub reported_uncorr_crit: i64,
    /// NVMe percentage_used at or above which a wear warning is raised.
    pub nvme_wear_warn_pct: i64,
}

impl Default for SmartThresholds {
    fn default() -> Self {
        Self {
            realloc_warn: constants::DEFAULT_REALLOC_WARN,
            crc_warn_delta: constants::DEFAULT_CRC_WARN_DELTA,
            pending_crit: constants::DEFAULT_PENDING_CRIT,
            offline_uncorr_crit: constants::DEFAULT_OFFLINE_UNCORR_CRIT,
            reported_uncorr_crit: constants::DEFAULT_REPORTED_UNCORR_CRIT,
            nvme_wear_warn_pct: constants::DEFAULT_NVME_WEAR_WARN_PCT,
        }
    }
}

/// SMART disk monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartConfig {
    pub enabled: bool,
    /// Device paths, e.g. `/dev/sda`.
    pub disks: Vec<String>,
    pub thresholds: SmartThresholds,
}

impl Default for SmartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disks: Vec::new(),
            thresholds: SmartThresholds::default(),
        }
    }
}

/// A single monitored mountpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountpointConfig {
    pub path: String,
    #[serde(default = "default_warn_pct")]
    pub warn_pct: f64,
    #[serde(default = "default_crit_pct")]
    pub crit_pct: f64,
}

fn default_warn_pct() -> f64 {
    constants::DEFAULT_FS_WARN_PCT
}

fn default_crit_pct() -> f64 {
    constants::DEFAULT_FS_CRIT_PCT
}

/// Filesystem capacity monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    pub enabled: bool,
    pub mountpoints: Vec<MountpointConfig>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mountpoints: Vec::new(),
        }
    }
}

/// Kernel log scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelLogConfig {
    pub enabled: bool,
    /// Log source name; the entity key for the log-scan entity.
    pub source: String,
    /// Matches per pattern class per run at or above which an issue is
    /// raised. One-off transient messages stay below this.
    pub per_run_threshold: u64,
}

impl Default for KernelLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: "kernel".to_string(),
            per_run_threshold: constants::DEFAULT_LOG_PER_RUN_THRESHOLD,
        }
    }
}

/// Notification policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Minimum seconds between repeated notifications for the same open
    /// fingerprint.
    pub cooldown_secs: u64,
    /// Whether resolving an issue emits a one-time recovery notice.
    pub send_recovery: bool,
    /// Whether creating an acknowledgment emits a one-time notice.
    pub send_ack_notice: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: constants::DEFAULT_COOLDOWN_SECS,
            send_recovery: true,
            send_ack_notice: false,
        }
    }
}

/// Retention windows for the sweeper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Days to keep readings.
    pub metrics_days: u32,
    /// Days to keep events, resolved issues, and completed runs.
    pub events_days: u32,
    /// Reclaim file space after sweeping.
    pub vacuum: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            metrics_days: constants::DEFAULT_RETENTION_METRICS_DAYS,
            events_days: constants::DEFAULT_RETENTION_EVENTS_DAYS,
            vacuum: true,
        }
    }
}

/// Database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("/var/lib/vigil/vigil.db"),
        }
    }
}

/// Probe execution limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
    /// Per-probe timeout; a timed-out probe counts as unavailable.
    pub timeout_secs: u64,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: constants::DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`VIGIL_*`)
/// 2. Config file (`vigil.toml`)
/// 3. Compiled defaults
///
/// Treated as an immutable snapshot for the duration of one run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    pub monitor: MonitorConfig,
    pub mirror: MirrorConfig,
    pub smart: SmartConfig,
    pub filesystem: FilesystemConfig,
    pub kernel_log: KernelLogConfig,
    pub alerts: AlertsConfig,
    pub retention: RetentionConfig,
    pub storage: StorageConfig,
    pub probes: ProbesConfig,
}

impl VigilConfig {
    /// Load configuration from an optional file path, then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let content =
                    std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                        path: p.display().to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    path: p.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };

        Self::apply_env_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    /// Pattern: `VIGIL_DB_PATH`, `VIGIL_COOLDOWN_SECS`, etc.
    fn apply_env_overrides(config: &mut VigilConfig) {
        if let Ok(val) = std::env::var("VIGIL_DB_PATH") {
            config.storage.db_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("VIGIL_HOSTNAME") {
            config.monitor.hostname_label = val;
        }
        if let Ok(val) = std::env::var("VIGIL_COOLDOWN_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.alerts.cooldown_secs = v;
            }
        }
        if let Ok(val) = std::env::var("VIGIL_SEND_RECOVERY") {
            if let Ok(v) = val.parse::<bool>() {
                config.alerts.send_recovery = v;
            }
        }
        if let Ok(val) = std::env::var("VIGIL_PROBE_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.probes.timeout_secs = v;
            }
        }
        if let Ok(val) = std::env::var("VIGIL_RETENTION_METRICS_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.metrics_days = v;
            }
        }
        if let Ok(val) = std::env::var("VIGIL_RETENTION_EVENTS_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.retention.events_days = v;
            }
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for mp in &self.filesystem.mountpoints {
            if !(0.0..=100.0).contains(&mp.warn_pct) || !(0.0..=100.0).contains(&mp.crit_pct) {
                return Err(ConfigError::ValidationFailed {
                    field: format!("filesystem.mountpoints[{}]", mp.path),
                    message: "warn_pct and crit_pct must be between 0 and 100".to_string(),
                });
            }
            if mp.warn_pct >= mp.crit_pct {
                return Err(ConfigError::ValidationFailed {
                    field: format!("filesystem.mountpoints[{}]", mp.path),
                    message: "warn_pct must be below crit_pct".to_string(),
                });
            }
        }
        if self.alerts.cooldown_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "alerts.cooldown_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.mirror.enabled && self.mirror.resync_stall_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "mirror.resync_stall_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.kernel_log.enabled && self.kernel_log.per_run_threshold == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "kernel_log.per_run_threshold".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.retention.metrics_days == 0 || self.retention.events_days == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "retention".to_string(),
                message: "retention windows must be at least one day".to_string(),
            });
        }
        if self.probes.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "probes.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// The entity list this configuration monitors, as an immutable
    /// snapshot for one run.
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities = Vec::new();
        if self.mirror.enabled {
            entities.push(Entity::new(self.mirror.entity_key(), EntityKind::Mirror));
        }
        if self.smart.enabled {
            for disk in &self.smart.disks {
                entities.push(Entity::new(disk.clone(), EntityKind::Disk));
            }
        }
        if self.filesystem.enabled {
            for mp in &self.filesystem.mountpoints {
                entities.push(Entity::new(mp.path.clone(), EntityKind::Mountpoint));
            }
        }
        if self.kernel_log.enabled {
            entities.push(Entity::new(
                self.kernel_log.source.clone(),
                EntityKind::LogSource,
            ));
        }
        entities
    }

    /// Thresholds for a configured mountpoint path, if present.
    pub fn mountpoint(&self, path: &str) -> Option<&MountpointConfig> {
        self.filesystem.mountpoints.iter().find(|mp| mp.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = VigilConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alerts.cooldown_secs, 21_600);
        assert!(config.alerts.send_recovery);
    }

    #[test]
    fn from_toml_overrides_defaults() {
        let config = VigilConfig::from_toml(
            r#"
            [mirror]
            enabled = true
            vg = "vg0"
            lv = "mirror0"

            [smart]
            disks = ["/dev/sda", "/dev/nvme0n1"]

            [[filesystem.mountpoints]]
            path = "/srv"
            warn_pct = 80.0
            crit_pct = 90.0

            [alerts]
            cooldown_secs = 3600
            send_recovery = false
            "#,
        )
        .unwrap();

        assert_eq!(config.mirror.entity_key(), "vg0/mirror0");
        assert_eq!(config.smart.disks.len(), 2);
        assert_eq!(config.alerts.cooldown_secs, 3600);
        assert!(!config.alerts.send_recovery);
        // Unspecified sections keep their defaults.
        assert_eq!(config.retention.metrics_days, 90);
    }

    #[test]
    fn warn_at_or_above_crit_is_rejected() {
        let err = VigilConfig::from_toml(
            r#"
            [[filesystem.mountpoints]]
            path = "/srv"
            warn_pct = 95.0
            crit_pct = 85.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn entity_snapshot_covers_all_configured_kinds() {
        let config = VigilConfig::from_toml(
            r#"
            [mirror]
            enabled = true

            [smart]
            disks = ["/dev/sda"]

            [[filesystem.mountpoints]]
            path = "/data"
            "#,
        )
        .unwrap();

        let entities = config.entities();
        let kinds: Vec<EntityKind> = entities.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EntityKind::Mirror));
        assert!(kinds.contains(&EntityKind::Disk));
        assert!(kinds.contains(&EntityKind::Mountpoint));
        assert!(kinds.contains(&EntityKind::LogSource));
    }

    #[test]
    fn disabled_sections_produce_no_entities() {
        let config = VigilConfig::from_toml(
            r#"
            [smart]
            enabled = false
            disks = ["/dev/sda"]

            [kernel_log]
            enabled = false
            "#,
        )
        .unwrap();
        assert!(config.entities().is_empty());
    }
}
