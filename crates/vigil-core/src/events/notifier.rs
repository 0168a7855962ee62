//! The notifier trait implemented by transport collaborators.

use crate::errors::NotifyError;

use super::types::{AckNotice, NotificationEvent};

/// A notification transport (chat webhook, email, ...).
///
/// Implementations live outside this workspace; the engine only knows this
/// boundary. `notify_ack` has a no-op default since not every transport
/// carries the acknowledgment channel.
pub trait Notifier: Send + Sync {
    /// Short channel name for logs and the delivery report ("slack", "email").
    fn name(&self) -> &str;

    /// Deliver a health notification.
    fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError>;

    /// Deliver an acknowledgment notice.
    fn notify_ack(&self, _notice: &AckNotice) -> Result<(), NotifyError> {
        Ok(())
    }
}
