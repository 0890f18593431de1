//! Storage provider traits.
//!
//! Each concern gets one trait; implementations live in
//! `nuelreserve-postgres` (production) and [`crate::mocks`] (in-memory).
//! The traits use `impl Future` return types so implementations stay
//! zero-cost and generic bounds compose cleanly through the web layer.
//!
//! # Concurrency contract
//!
//! Slot consumption is a conditional atomic mutation: "set `is_booked`
//! where the slot is still free". [`BookingStore::create`] must perform
//! the open-booking uniqueness check, the slot compare-and-set and the
//! booking insert as a single unit of work, so a partial failure can
//! never leave a booked slot without a booking row or vice versa, and of
//! two racing creations exactly one succeeds.

use crate::error::{BookingError, Result};
use crate::status::BookingStatus;
use crate::types::{
    AvailabilitySlot, Booking, BookingId, Favorite, Notification, NotificationId,
    NotificationType, Service, ServiceId, SlotId, UserId,
};
use chrono::{NaiveDate, NaiveTime};
use std::future::Future;
use uuid::Uuid;

/// Input for creating a service listing.
#[derive(Debug, Clone)]
pub struct NewService {
    /// Owning provider.
    pub provider_id: UserId,
    /// Display title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Discovery category.
    pub category: String,
    /// Session length in minutes.
    pub duration_minutes: i32,
    /// Price per booking.
    pub price: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional location hint.
    pub location: Option<String>,
}

impl NewService {
    /// Validate required fields and value ranges.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty titles or categories,
    /// non-positive durations or negative prices.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(BookingError::MissingField { field: "title" });
        }
        if self.category.trim().is_empty() {
            return Err(BookingError::MissingField { field: "category" });
        }
        if self.duration_minutes <= 0 {
            return Err(BookingError::InvalidField {
                field: "duration_minutes",
                reason: "must be positive".to_string(),
            });
        }
        if self.price < 0.0 {
            return Err(BookingError::InvalidField {
                field: "price",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Input for creating an availability slot.
///
/// No overlap validation is performed: a provider may create two
/// overlapping free slots. This mirrors the reference behavior and is a
/// documented limitation, not a contract.
#[derive(Debug, Clone)]
pub struct NewSlot {
    /// Service the slot belongs to.
    pub service_id: ServiceId,
    /// Owning provider.
    pub provider_id: UserId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Window start.
    pub start_time: NaiveTime,
    /// Window end.
    pub end_time: NaiveTime,
}

impl NewSlot {
    /// Validate that the window is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidField`] when the end does not come
    /// after the start.
    pub fn validate(&self) -> Result<()> {
        if self.end_time <= self.start_time {
            return Err(BookingError::InvalidField {
                field: "end_time",
                reason: "must be after start_time".to_string(),
            });
        }
        Ok(())
    }
}

/// Denormalized input for creating a booking row.
///
/// Built by the lifecycle manager after resolving the service and slot;
/// the store persists it verbatim with status `pending`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// Reserving customer.
    pub customer_id: UserId,
    /// Booked service.
    pub service_id: ServiceId,
    /// Provider owning the service.
    pub provider_id: UserId,
    /// Slot being consumed.
    pub availability_id: SlotId,
    /// Copied from the slot.
    pub booking_date: NaiveDate,
    /// Copied from the slot.
    pub start_time: NaiveTime,
    /// Copied from the slot.
    pub end_time: NaiveTime,
    /// Copied from the service at this instant.
    pub total_price: f64,
    /// Optional customer notes.
    pub notes: Option<String>,
}

/// Input for persisting a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Target user.
    pub user_id: UserId,
    /// Notification kind.
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Optional related entity.
    pub related_id: Option<Uuid>,
}

/// Inclusive date range filter for slot listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    /// Earliest date to include, unbounded when `None`.
    pub from: Option<NaiveDate>,
    /// Latest date to include, unbounded when `None`.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Storage for service listings.
pub trait ServiceStore: Send + Sync {
    /// Persist a new service.
    fn create(&self, service: NewService) -> impl Future<Output = Result<Service>> + Send;

    /// Fetch a service by id.
    fn get(&self, id: ServiceId) -> impl Future<Output = Result<Service>> + Send;

    /// Persist edits to a service (title, price, active flag, ...).
    fn update(&self, service: &Service) -> impl Future<Output = Result<Service>> + Send;

    /// List active services for discovery, optionally filtered by category.
    fn list_active(
        &self,
        category: Option<String>,
    ) -> impl Future<Output = Result<Vec<Service>>> + Send;

    /// List all services owned by a provider, active or not.
    fn list_for_provider(
        &self,
        provider_id: UserId,
    ) -> impl Future<Output = Result<Vec<Service>>> + Send;
}

/// Storage for availability slots.
pub trait SlotStore: Send + Sync {
    /// Persist a new free slot.
    fn create(&self, slot: NewSlot) -> impl Future<Output = Result<AvailabilitySlot>> + Send;

    /// Fetch a slot by id.
    fn get(&self, id: SlotId) -> impl Future<Output = Result<AvailabilitySlot>> + Send;

    /// List slots for a service ordered by (date, start_time) ascending.
    ///
    /// With `free_only`, consumed slots are filtered out (the customer
    /// view); owners list everything.
    fn list_for_service(
        &self,
        service_id: ServiceId,
        range: DateRange,
        free_only: bool,
    ) -> impl Future<Output = Result<Vec<AvailabilitySlot>>> + Send;

    /// Delete a free slot.
    ///
    /// Fails with [`BookingError::SlotInUse`] when the slot is booked.
    fn delete(&self, id: SlotId) -> impl Future<Output = Result<()>> + Send;

    /// Conditionally consume a slot: flip `is_booked` only if still free.
    ///
    /// This is the compare-and-set primitive behind booking creation;
    /// it is invoked through [`BookingStore::create`]'s unit of work and
    /// is not exposed outside the lifecycle core. The loser of a race
    /// observes [`BookingError::SlotAlreadyBooked`].
    fn mark_booked(&self, id: SlotId) -> impl Future<Output = Result<()>> + Send;

    /// Release a consumed slot back to free.
    ///
    /// No production code path calls this: cancelling a booking
    /// deliberately leaves its slot consumed (carried-over product
    /// behavior, flagged as a probable gap rather than an invariant).
    fn mark_free(&self, id: SlotId) -> impl Future<Output = Result<()>> + Send;
}

/// Storage for bookings.
pub trait BookingStore: Send + Sync {
    /// Create a booking with status `pending`, consuming its slot.
    ///
    /// Atomic unit of work: verifies the customer holds no open
    /// (non-cancelled) booking for the service, compare-and-sets the
    /// slot to booked, and inserts the row. Exactly one of two racing
    /// calls succeeds; the loser gets [`BookingError::SlotAlreadyBooked`]
    /// or [`BookingError::DuplicateOpenBooking`] and no row is created.
    fn create(&self, booking: NewBooking) -> impl Future<Output = Result<Booking>> + Send;

    /// Fetch a booking by id.
    fn get(&self, id: BookingId) -> impl Future<Output = Result<Booking>> + Send;

    /// Update the status, guarded by the expected current status.
    ///
    /// The update applies only `WHERE status = expected`; a concurrent
    /// transition that got there first surfaces as
    /// [`BookingError::ConcurrentUpdate`].
    fn update_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        to: BookingStatus,
    ) -> impl Future<Output = Result<Booking>> + Send;

    /// Whether the customer holds an open (non-cancelled) booking for
    /// the service.
    fn has_open_booking(
        &self,
        customer_id: UserId,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// List a customer's bookings, newest first.
    fn list_for_customer(
        &self,
        customer_id: UserId,
    ) -> impl Future<Output = Result<Vec<Booking>>> + Send;

    /// List a provider's incoming bookings, newest first.
    fn list_for_provider(
        &self,
        provider_id: UserId,
    ) -> impl Future<Output = Result<Vec<Booking>>> + Send;
}

/// Storage for notifications.
pub trait NotificationStore: Send + Sync {
    /// Persist a notification (unread).
    fn insert(
        &self,
        notification: NewNotification,
    ) -> impl Future<Output = Result<Notification>> + Send;

    /// List a user's notifications, newest first.
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Notification>>> + Send;

    /// Count a user's unread notifications.
    fn unread_count(&self, user_id: UserId) -> impl Future<Output = Result<u64>> + Send;

    /// Flip one notification to read. The target must own it.
    fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Flip all of a user's notifications to read, returning the count.
    fn mark_all_read(&self, user_id: UserId) -> impl Future<Output = Result<u64>> + Send;
}

/// Storage for the favorites membership relation.
pub trait FavoriteStore: Send + Sync {
    /// Add a favorite. Adding twice is a no-op upsert.
    fn add(
        &self,
        user_id: UserId,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a favorite. Removing a non-favorite is a no-op.
    fn remove(
        &self,
        user_id: UserId,
        service_id: ServiceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List a user's favorites, newest first.
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Favorite>>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn slot_input(start: (u32, u32), end: (u32, u32)) -> NewSlot {
        NewSlot {
            service_id: ServiceId::new(),
            provider_id: UserId::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn slot_window_must_be_non_empty() {
        assert!(slot_input((9, 0), (10, 0)).validate().is_ok());
        assert!(slot_input((10, 0), (10, 0)).validate().is_err());
        assert!(slot_input((10, 0), (9, 0)).validate().is_err());
    }

    #[test]
    fn service_input_validation() {
        let input = NewService {
            provider_id: UserId::new(),
            title: "Deep tissue massage".to_string(),
            description: None,
            category: "wellness".to_string(),
            duration_minutes: 60,
            price: 50.0,
            currency: "USD".to_string(),
            location: None,
        };
        assert!(input.validate().is_ok());

        let mut missing_title = input.clone();
        missing_title.title = "  ".to_string();
        assert_eq!(
            missing_title.validate().unwrap_err(),
            BookingError::MissingField { field: "title" }
        );

        let mut negative_price = input;
        negative_price.price = -1.0;
        assert!(negative_price.validate().unwrap_err().is_validation());
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        let range = DateRange {
            from: Some(day(10)),
            to: Some(day(20)),
        };
        assert!(range.contains(day(10)));
        assert!(range.contains(day(20)));
        assert!(!range.contains(day(9)));
        assert!(!range.contains(day(21)));
        assert!(DateRange::default().contains(day(1)));
    }
}
