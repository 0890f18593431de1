//! Realtime change feed.
//!
//! Replaces the reference system's process-wide registry of live
//! change-feed subscriptions with an explicit hub owned by application
//! state. Subscribing returns a [`Subscription`] handle; unsubscribing
//! is explicit (or happens on drop), and empty topics are pruned.

use crate::types::{Booking, Notification, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Buffered events per topic before slow subscribers start lagging.
const TOPIC_CAPACITY: usize = 64;

/// A change event pushed to subscribers.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// A notification was created for the subscribed user.
    Notification(Notification),
    /// A booking involving the subscribed user was created or updated.
    Booking(Booking),
}

/// Hub of per-topic broadcast channels.
///
/// Cheap to clone; all clones share the same topic table. Pass it
/// through application state rather than holding a global.
#[derive(Debug, Clone, Default)]
pub struct RealtimeHub {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>>,
}

impl RealtimeHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn topic_notifications(user_id: UserId) -> String {
        format!("notifications:{user_id}")
    }

    fn topic_provider_bookings(provider_id: UserId) -> String {
        format!("bookings:{provider_id}")
    }

    fn topic_customer_bookings(customer_id: UserId) -> String {
        format!("user-bookings:{customer_id}")
    }

    fn subscribe(&self, topic: String) -> Subscription {
        let receiver = {
            let mut topics = match self.topics.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            topics
                .entry(topic.clone())
                .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
                .subscribe()
        };
        Subscription {
            topic,
            receiver,
            hub: self.clone(),
        }
    }

    fn publish(&self, topic: &str, event: ChangeEvent) {
        let topics = match self.topics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(sender) = topics.get(topic) {
            // Send fails only when nobody is subscribed.
            let _ = sender.send(event);
        }
    }

    fn prune(&self, topic: &str) {
        let mut topics = match self.topics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(sender) = topics.get(topic) {
            if sender.receiver_count() == 0 {
                topics.remove(topic);
            }
        }
    }

    /// Subscribe to notifications delivered to `user_id`.
    #[must_use]
    pub fn subscribe_to_notifications(&self, user_id: UserId) -> Subscription {
        self.subscribe(Self::topic_notifications(user_id))
    }

    /// Subscribe to booking changes on a provider's services.
    #[must_use]
    pub fn subscribe_to_provider_bookings(&self, provider_id: UserId) -> Subscription {
        self.subscribe(Self::topic_provider_bookings(provider_id))
    }

    /// Subscribe to changes of a customer's own bookings.
    #[must_use]
    pub fn subscribe_to_customer_bookings(&self, customer_id: UserId) -> Subscription {
        self.subscribe(Self::topic_customer_bookings(customer_id))
    }

    /// Push a freshly created notification to its target user's feed.
    pub fn publish_notification(&self, notification: &Notification) {
        self.publish(
            &Self::topic_notifications(notification.user_id),
            ChangeEvent::Notification(notification.clone()),
        );
    }

    /// Push a created or updated booking to both parties' feeds.
    pub fn publish_booking(&self, booking: &Booking) {
        self.publish(
            &Self::topic_provider_bookings(booking.provider_id),
            ChangeEvent::Booking(booking.clone()),
        );
        self.publish(
            &Self::topic_customer_bookings(booking.customer_id),
            ChangeEvent::Booking(booking.clone()),
        );
    }

    /// Number of live topics, for diagnostics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        match self.topics.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Live subscription to one topic.
///
/// Dropping the handle detaches the receiver; calling
/// [`Subscription::unsubscribe`] additionally prunes the topic when it
/// was the last subscriber.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    receiver: broadcast::Receiver<ChangeEvent>,
    hub: RealtimeHub,
}

impl Subscription {
    /// Receive the next event.
    ///
    /// Returns `None` once the hub side is gone. A slow subscriber that
    /// lagged behind skips the lost events and keeps receiving.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "realtime subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Topic this subscription is attached to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Explicitly detach and prune the topic if empty.
    pub fn unsubscribe(self) {
        let hub = self.hub.clone();
        let topic = self.topic.clone();
        drop(self);
        hub.prune(&topic);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::types::{NotificationId, NotificationType};
    use chrono::Utc;

    fn notification_for(user_id: UserId) -> Notification {
        Notification {
            id: NotificationId::new(),
            user_id,
            kind: NotificationType::BookingRequest,
            title: "New Booking Request".to_string(),
            message: "someone booked".to_string(),
            related_id: None,
            read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_notification() {
        let hub = RealtimeHub::new();
        let user = UserId::new();
        let mut sub = hub.subscribe_to_notifications(user);

        hub.publish_notification(&notification_for(user));

        match sub.recv().await {
            Some(ChangeEvent::Notification(n)) => assert_eq!(n.user_id, user),
            other => panic!("expected notification event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn events_are_scoped_per_user() {
        let hub = RealtimeHub::new();
        let subscribed = UserId::new();
        let other = UserId::new();
        let mut sub = hub.subscribe_to_notifications(subscribed);

        hub.publish_notification(&notification_for(other));
        hub.publish_notification(&notification_for(subscribed));

        match sub.recv().await {
            Some(ChangeEvent::Notification(n)) => assert_eq!(n.user_id, subscribed),
            other => panic!("expected notification event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsubscribe_prunes_empty_topics() {
        let hub = RealtimeHub::new();
        let user = UserId::new();
        let sub = hub.subscribe_to_notifications(user);
        assert_eq!(hub.topic_count(), 1);

        sub.unsubscribe();
        assert_eq!(hub.topic_count(), 0);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_a_noop() {
        let hub = RealtimeHub::new();
        hub.publish_notification(&notification_for(UserId::new()));
        assert_eq!(hub.topic_count(), 0);
    }
}
