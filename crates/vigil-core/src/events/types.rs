//! Notification payload types.

use serde::{Deserialize, Serialize};

use crate::types::{IssueKind, Severity};

/// Why a notification is being sent for a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// First notification for a newly opened issue.
    Opened,
    /// Repeat reminder for an issue still open past the cooldown window.
    Ongoing,
    /// One-time notice that a previously open issue is no longer detected.
    Recovered,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Ongoing => "ongoing",
            Self::Recovered => "recovered",
        }
    }
}

/// The event handed to notification collaborators.
///
/// Delivery is at-least-once: a transport failure is logged and retried by
/// the transport's own policy, never rolled back into the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub entity_key: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub status: NotificationStatus,
    pub timestamp: i64,
}

/// One-time notice that an operator acknowledged an entity.
/// Sent on a channel distinct from health-issue notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckNotice {
    pub entity_key: String,
    pub note: String,
    pub created_by: String,
    pub created_at: i64,
}
