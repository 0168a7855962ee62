//! NotificationDispatcher — synchronous fan-out to registered notifiers.

use std::sync::Arc;

// `::tracing` rather than `tracing`: this crate has its own `tracing`
// module at the root, which would make the bare path ambiguous.
use ::tracing::{error, warn};

use super::notifier::Notifier;
use super::types::{AckNotice, NotificationEvent};

/// Delivery outcome per notifier, reported back in the run outcome.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub channel: String,
    pub delivered: bool,
}

/// Synchronous dispatcher wrapping a list of notifiers.
///
/// A notifier that fails or panics never prevents the remaining notifiers
/// from receiving the event, and never unwinds into the engine.
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    pub fn register(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// Deliver a health notification to every notifier.
    pub fn dispatch(&self, event: &NotificationEvent) -> Vec<DeliveryResult> {
        self.each(|n| n.notify(event))
    }

    /// Deliver an acknowledgment notice to every notifier.
    pub fn dispatch_ack(&self, notice: &AckNotice) -> Vec<DeliveryResult> {
        self.each(|n| n.notify_ack(notice))
    }

    fn each<F>(&self, f: F) -> Vec<DeliveryResult>
    where
        F: Fn(&dyn Notifier) -> Result<(), crate::errors::NotifyError>,
    {
        let mut results = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            let channel = notifier.name().to_string();
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(notifier.as_ref())
            }));
            let delivered = match outcome {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!(channel = %channel, error = %e, "notification delivery failed");
                    false
                }
                Err(_) => {
                    error!(channel = %channel, "notifier panicked");
                    false
                }
            };
            results.push(DeliveryResult { channel, delivered });
        }
        results
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
