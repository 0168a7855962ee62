//! Notification delivery errors.

/// A notifier failed to deliver an event. Recoverable: retried by the
/// transport's own policy, logged, never blocks the ledger commit.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("delivery via {channel} failed: {reason}")]
    DeliveryFailed { channel: String, reason: String },
}
