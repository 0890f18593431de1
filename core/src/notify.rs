//! Notification emission.
//!
//! The lifecycle manager treats notifications as fire-and-forget: an
//! emission failure is logged and swallowed, never propagated to the
//! booking or slot mutation that triggered it.

use crate::error::Result;
use crate::realtime::RealtimeHub;
use crate::stores::{NewNotification, NotificationStore};
use crate::types::{NotificationType, UserId};
use std::future::Future;
use uuid::Uuid;

/// Sink for notifications, consumed by the lifecycle manager.
pub trait Notifier: Send + Sync {
    /// Emit a notification to `user_id`.
    fn emit(
        &self,
        user_id: UserId,
        content: NotificationContent,
        related_id: Option<Uuid>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Rendered title and message for one notification kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Notification kind.
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
}

impl NotificationContent {
    /// A customer requested a booking; addressed to the provider.
    #[must_use]
    pub fn booking_request(customer_name: &str, service_title: &str) -> Self {
        Self {
            kind: NotificationType::BookingRequest,
            title: "New Booking Request".to_string(),
            message: format!(
                "{customer_name} has requested to book your service: {service_title}"
            ),
        }
    }

    /// The provider confirmed; addressed to the customer.
    #[must_use]
    pub fn booking_confirmed(service_title: &str) -> Self {
        Self {
            kind: NotificationType::BookingConfirmed,
            title: "Booking Confirmed".to_string(),
            message: format!("Your booking for {service_title} has been confirmed!"),
        }
    }

    /// A booking was cancelled; addressed to the counterparty of the actor.
    #[must_use]
    pub fn booking_cancelled(service_title: &str) -> Self {
        Self {
            kind: NotificationType::BookingCancelled,
            title: "Booking Cancelled".to_string(),
            message: format!("Your booking for {service_title} has been cancelled."),
        }
    }

    /// The provider marked the booking completed; addressed to the customer.
    #[must_use]
    pub fn booking_completed(service_title: &str) -> Self {
        Self {
            kind: NotificationType::BookingCompleted,
            title: "Booking Completed".to_string(),
            message: format!(
                "Your booking for {service_title} has been completed. Don't forget to leave a review!"
            ),
        }
    }

    /// A review was left on a provider's service.
    #[must_use]
    pub fn review_received(customer_name: &str, service_title: &str) -> Self {
        Self {
            kind: NotificationType::ReviewReceived,
            title: "New Review".to_string(),
            message: format!(
                "{customer_name} left a review for your service: {service_title}"
            ),
        }
    }

    /// A payment was recorded for a provider's service.
    #[must_use]
    pub fn payment_received(amount: f64, service_title: &str) -> Self {
        Self {
            kind: NotificationType::PaymentReceived,
            title: "Payment Received".to_string(),
            message: format!("You received payment of ${amount} for {service_title}"),
        }
    }
}

/// Notifier that persists notifications and pushes them to the
/// realtime hub for connected clients.
#[derive(Debug, Clone)]
pub struct StoreNotifier<S> {
    store: S,
    hub: RealtimeHub,
}

impl<S> StoreNotifier<S> {
    /// Create a notifier over a notification store and a realtime hub.
    pub const fn new(store: S, hub: RealtimeHub) -> Self {
        Self { store, hub }
    }
}

impl<S: NotificationStore> Notifier for StoreNotifier<S> {
    async fn emit(
        &self,
        user_id: UserId,
        content: NotificationContent,
        related_id: Option<Uuid>,
    ) -> Result<()> {
        let notification = self
            .store
            .insert(NewNotification {
                user_id,
                kind: content.kind,
                title: content.title,
                message: content.message,
                related_id,
            })
            .await?;

        // Best effort: nobody listening is not an error.
        self.hub.publish_notification(&notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_request_template() {
        let content = NotificationContent::booking_request("Ada Lovelace", "Piano Lesson");
        assert_eq!(content.kind, NotificationType::BookingRequest);
        assert_eq!(content.title, "New Booking Request");
        assert_eq!(
            content.message,
            "Ada Lovelace has requested to book your service: Piano Lesson"
        );
    }

    #[test]
    fn lifecycle_templates_address_the_booking() {
        assert_eq!(
            NotificationContent::booking_confirmed("Piano Lesson").message,
            "Your booking for Piano Lesson has been confirmed!"
        );
        assert_eq!(
            NotificationContent::booking_cancelled("Piano Lesson").message,
            "Your booking for Piano Lesson has been cancelled."
        );
        assert!(
            NotificationContent::booking_completed("Piano Lesson")
                .message
                .contains("leave a review")
        );
    }
}
