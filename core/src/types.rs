//! Domain entities and identifiers.
//!
//! Rows coming back from storage are materialized into these statically
//! typed entities; inputs are validated at construction time instead of
//! trusting row shapes implicitly.

use crate::error::{BookingError, Result};
use crate::status::BookingStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Identifier of a user account (customer or provider).
    UserId
);
id_type!(
    /// Identifier of a provider-listed service.
    ServiceId
);
id_type!(
    /// Identifier of an availability slot.
    SlotId
);
id_type!(
    /// Identifier of a booking.
    BookingId
);
id_type!(
    /// Identifier of a notification.
    NotificationId
);

/// A provider-listed service that customers can book.
///
/// Deactivating a service (`is_active = false`) hides it from discovery
/// but does not affect existing bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier.
    pub id: ServiceId,
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
    /// Price per booking. Stored, never settled.
    pub price: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional location hint.
    pub location: Option<String>,
    /// Whether the service is visible in discovery.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A single bookable (date, start, end) window tied to one service.
///
/// A slot is either free (`is_booked = false`) or consumed by exactly one
/// booking. Consumption is one-way: cancelling the booking does not
/// release the slot (a deliberate carry-over of product behavior).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    /// Unique identifier.
    pub id: SlotId,
    /// Service this slot belongs to.
    pub service_id: ServiceId,
    /// Owning provider.
    pub provider_id: UserId,
    /// Calendar date of the window.
    pub date: NaiveDate,
    /// Window start.
    pub start_time: NaiveTime,
    /// Window end.
    pub end_time: NaiveTime,
    /// Whether a booking has consumed this slot.
    pub is_booked: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A customer's reservation against one slot.
///
/// `booking_date`, `start_time`, `end_time` and `total_price` are copied
/// from the slot and service at creation time and frozen thereafter;
/// later edits to the service do not drift into the booking. Status is
/// the only mutable field after creation (besides `updated_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier.
    pub id: BookingId,
    /// Customer who made the reservation.
    pub customer_id: UserId,
    /// Booked service.
    pub service_id: ServiceId,
    /// Provider owning the service.
    pub provider_id: UserId,
    /// Consumed availability slot.
    pub availability_id: SlotId,
    /// Denormalized slot date.
    pub booking_date: NaiveDate,
    /// Denormalized slot start.
    pub start_time: NaiveTime,
    /// Denormalized slot end.
    pub end_time: NaiveTime,
    /// Denormalized service price at booking time.
    pub total_price: f64,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Optional customer notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Kind of a notification, driving its rendering client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A customer requested a booking (sent to the provider).
    BookingRequest,
    /// The provider confirmed a booking (sent to the customer).
    BookingConfirmed,
    /// A booking was cancelled (sent to the counterparty of the actor).
    BookingCancelled,
    /// The provider marked a booking completed (sent to the customer).
    BookingCompleted,
    /// A review was left on a service.
    ReviewReceived,
    /// A payment was recorded.
    PaymentReceived,
    /// A generic reminder.
    Reminder,
}

impl NotificationType {
    /// Wire representation, matching the persisted column values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BookingRequest => "booking_request",
            Self::BookingConfirmed => "booking_confirmed",
            Self::BookingCancelled => "booking_cancelled",
            Self::BookingCompleted => "booking_completed",
            Self::ReviewReceived => "review_received",
            Self::PaymentReceived => "payment_received",
            Self::Reminder => "reminder",
        }
    }

    /// Parse a persisted or wire value.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidField`] for unknown values.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "booking_request" => Ok(Self::BookingRequest),
            "booking_confirmed" => Ok(Self::BookingConfirmed),
            "booking_cancelled" => Ok(Self::BookingCancelled),
            "booking_completed" => Ok(Self::BookingCompleted),
            "review_received" => Ok(Self::ReviewReceived),
            "payment_received" => Ok(Self::PaymentReceived),
            "reminder" => Ok(Self::Reminder),
            other => Err(BookingError::InvalidField {
                field: "type",
                reason: format!("unknown notification type {other:?}"),
            }),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification delivered to a user.
///
/// Created only by the lifecycle flows; mutated only to flip the read
/// flag, never deleted in normal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier.
    pub id: NotificationId,
    /// Target user.
    pub user_id: UserId,
    /// Notification kind.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Optional related entity (usually the booking).
    pub related_id: Option<Uuid>,
    /// Whether the user has seen it.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Membership relation: a user bookmarked a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// Bookmarking user.
    pub user_id: UserId,
    /// Bookmarked service.
    pub service_id: ServiceId,
    /// When the bookmark was created.
    pub created_at: DateTime<Utc>,
}

/// Parse a wire date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`BookingError::InvalidField`] for malformed input.
pub fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| BookingError::InvalidField {
        field,
        reason: format!("expected YYYY-MM-DD, got {s:?}"),
    })
}

/// Parse a wire time in `HH:MM` or `HH:MM:SS` form.
///
/// # Errors
///
/// Returns [`BookingError::InvalidField`] for malformed input.
pub fn parse_time(field: &'static str, s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| BookingError::InvalidField {
            field,
            reason: format!("expected HH:MM[:SS], got {s:?}"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_times() {
        assert_eq!(
            parse_time("start_time", "09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("start_time", "09:30:15").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 15).unwrap()
        );
        assert!(parse_time("start_time", "9.30").is_err());
    }

    #[test]
    fn parses_wire_dates() {
        assert_eq!(
            parse_date("date", "2025-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert!(parse_date("date", "06/01/2025").is_err());
    }

    #[test]
    fn notification_type_round_trips() {
        for kind in [
            NotificationType::BookingRequest,
            NotificationType::BookingConfirmed,
            NotificationType::BookingCancelled,
            NotificationType::BookingCompleted,
            NotificationType::ReviewReceived,
            NotificationType::PaymentReceived,
            NotificationType::Reminder,
        ] {
            assert_eq!(NotificationType::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ServiceId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
