//! Notification event system.
//! Trait with no-op defaults, synchronous dispatch, zero overhead when empty.

pub mod dispatcher;
pub mod notifier;
pub mod types;

pub use dispatcher::{DeliveryResult, NotificationDispatcher};
pub use notifier::Notifier;
pub use types::{AckNotice, NotificationEvent, NotificationStatus};
