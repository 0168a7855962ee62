//! Wall-clock helpers. All persisted timestamps are epoch seconds.

/// Current time as epoch seconds.
pub fn epoch_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
