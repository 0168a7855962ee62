//! Error handling for Vigil.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod ack_error;
pub mod config_error;
pub mod engine_error;
pub mod notify_error;
pub mod probe_error;
pub mod storage_error;

pub use ack_error::AckError;
pub use config_error::ConfigError;
pub use engine_error::{EngineError, ProbeFailure};
pub use notify_error::NotifyError;
pub use probe_error::ProbeError;
pub use storage_error::StorageError;
