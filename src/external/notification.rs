//! Notification events and sinks.
//!
//! Notifications are fire-and-forget from the engine's point of view: the
//! lifecycle sends them after a transition has been committed and only logs
//! a failed delivery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{EngineError, EngineResult};

/// What happened to a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A request was filed; sent to the employee's manager.
    LeaveSubmitted,
    /// A request was approved; sent to the employee.
    LeaveApproved,
    /// A request was rejected; sent to the employee.
    LeaveRejected,
    /// A request was deleted; sent to the employee.
    LeaveDeleted,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NotificationKind::LeaveSubmitted => "leave_submitted",
            NotificationKind::LeaveApproved => "leave_approved",
            NotificationKind::LeaveRejected => "leave_rejected",
            NotificationKind::LeaveDeleted => "leave_deleted",
        };
        write!(f, "{}", name)
    }
}

/// A notification about a leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// The event kind.
    pub kind: NotificationKind,
    /// The request the event concerns.
    pub request_id: String,
    /// Event-specific details.
    pub payload: serde_json::Value,
}

/// Delivers notifications to people.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers `event` to `recipient`.
    async fn notify(&self, recipient: &str, event: NotificationEvent) -> EngineResult<()>;
}

/// Writes every notification to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, recipient: &str, event: NotificationEvent) -> EngineResult<()> {
        info!(
            recipient = %recipient,
            kind = %event.kind,
            request_id = %event.request_id,
            payload = %event.payload,
            "Leave notification"
        );
        Ok(())
    }
}

/// Keeps delivered notifications in memory and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, NotificationEvent)>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent deliveries fail with [`EngineError::NotificationFailed`].
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    /// Everything delivered so far as `(recipient, event)` pairs.
    pub async fn sent(&self) -> Vec<(String, NotificationEvent)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, recipient: &str, event: NotificationEvent) -> EngineResult<()> {
        if *self.failing.lock().await {
            return Err(EngineError::NotificationFailed {
                message: format!("delivery to {} refused", recipient),
            });
        }
        self.sent.lock().await.push((recipient.to_string(), event));
        Ok(())
    }
}
