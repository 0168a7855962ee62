//! Configuration for the Vigil engine.
//! Compiled defaults → TOML file → `VIGIL_*` environment overrides → validate.

pub mod monitor_config;

pub use monitor_config::{
    AlertsConfig, FilesystemConfig, KernelLogConfig, MirrorConfig, MonitorConfig,
    MountpointConfig, ProbesConfig, RetentionConfig, SmartConfig, SmartThresholds,
    StorageConfig, VigilConfig,
};
