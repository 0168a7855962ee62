//! Hash collections used across the workspace.
//! FxHash is faster than SipHash for the short string keys we use everywhere.

pub use rustc_hash::{FxHashMap, FxHashSet};
