//! # NuelReserve Core
//!
//! Domain model and booking lifecycle for the NuelReserve service
//! marketplace: customers reserve provider time slots, bookings advance
//! through a fixed status state machine, and notifications are emitted
//! to the counterparty as side effects.
//!
//! ## Invariants
//!
//! - A slot is consumed by at most one booking; consumption is a
//!   conditional atomic mutation, so of two racing creations exactly one
//!   succeeds.
//! - A customer holds at most one non-cancelled booking per service.
//! - Booking denormalized fields (date, times, price) are frozen at
//!   creation time.
//! - `cancelled` and `completed` are terminal statuses.
//! - Cancelling a booking does not release its slot.
//!
//! Storage is abstracted behind traits in [`stores`]; production
//! implementations live in `nuelreserve-postgres`, in-memory ones in
//! [`mocks`].

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod realtime;
pub mod status;
pub mod stores;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export key types for convenience
pub use error::{BookingError, Result};
pub use lifecycle::{BookingEnvironment, BookingLifecycle};
pub use notify::{NotificationContent, Notifier, StoreNotifier};
pub use realtime::{ChangeEvent, RealtimeHub, Subscription};
pub use status::{BookingStatus, PartyRole};
pub use types::{
    AvailabilitySlot, Booking, BookingId, Favorite, Notification, NotificationId,
    NotificationType, Service, ServiceId, SlotId, UserId,
};
