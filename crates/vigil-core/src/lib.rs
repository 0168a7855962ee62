//! Core types, errors, configuration, and events for the Vigil storage
//! health monitor.
//!
//! Everything in this crate is persistence- and I/O-free: the storage layer
//! lives in `vigil-storage`, the evaluation engine in `vigil-engine`.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod smart_attrs;
pub mod time;
pub mod tracing;
pub mod types;
