//! Recording notifier for assertions.

use crate::error::{BookingError, Result};
use crate::notify::{NotificationContent, Notifier};
use crate::types::UserId;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One captured emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    /// Target user.
    pub user_id: UserId,
    /// Rendered content.
    pub content: NotificationContent,
    /// Related entity id, when supplied.
    pub related_id: Option<Uuid>,
}

/// Notifier that records every emission instead of delivering it.
///
/// Can be switched into a failing mode to verify that notification
/// failures never roll back the parent operation.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    emitted: Arc<Mutex<Vec<RecordedNotification>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    /// Create a recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent emissions fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        if let Ok(mut guard) = self.fail.lock() {
            *guard = fail;
        }
    }

    /// Everything emitted so far.
    #[must_use]
    pub fn emitted(&self) -> Vec<RecordedNotification> {
        self.emitted
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    async fn emit(
        &self,
        user_id: UserId,
        content: NotificationContent,
        related_id: Option<Uuid>,
    ) -> Result<()> {
        let failing = self.fail.lock().map(|guard| *guard).unwrap_or(false);
        if failing {
            return Err(BookingError::DatabaseError(
                "notification sink unavailable".to_string(),
            ));
        }
        self.emitted
            .lock()
            .map_err(|_| BookingError::Internal)?
            .push(RecordedNotification {
                user_id,
                content,
                related_id,
            });
        Ok(())
    }
}
