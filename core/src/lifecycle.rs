//! Booking lifecycle manager.
//!
//! Mediates slot consumption and enforces the booking status state
//! machine. Creation denormalizes date, time and price from the slot and
//! service at that instant; the insert and the slot compare-and-set are
//! one unit of work inside [`BookingStore::create`], so racing customers
//! cannot double-book a slot and no orphan rows are left behind.
//!
//! Notifications to the counterparty are best-effort: failures are
//! logged and never roll back the booking or slot mutation.

use crate::error::{BookingError, Result};
use crate::notify::{NotificationContent, Notifier};
use crate::realtime::RealtimeHub;
use crate::status::{self, BookingStatus, PartyRole};
use crate::stores::{BookingStore, NewBooking, ServiceStore, SlotStore};
use crate::types::{Booking, BookingId, ServiceId, SlotId, UserId};

/// Collaborators of the lifecycle manager.
///
/// Generic over provider implementations so production (Postgres) and
/// tests (in-memory mocks) wire the same logic.
#[derive(Debug, Clone)]
pub struct BookingEnvironment<SS, AS, BS, N> {
    /// Service listings.
    pub services: SS,
    /// Availability slots.
    pub slots: AS,
    /// Bookings.
    pub bookings: BS,
    /// Notification sink.
    pub notifier: N,
    /// Change feed for connected clients.
    pub realtime: RealtimeHub,
}

/// The booking lifecycle manager.
#[derive(Debug, Clone)]
pub struct BookingLifecycle<SS, AS, BS, N> {
    env: BookingEnvironment<SS, AS, BS, N>,
}

impl<SS, AS, BS, N> BookingLifecycle<SS, AS, BS, N>
where
    SS: ServiceStore,
    AS: SlotStore,
    BS: BookingStore,
    N: Notifier,
{
    /// Create a lifecycle manager over its environment.
    pub const fn new(env: BookingEnvironment<SS, AS, BS, N>) -> Self {
        Self { env }
    }

    /// Access the underlying environment.
    pub const fn env(&self) -> &BookingEnvironment<SS, AS, BS, N> {
        &self.env
    }

    /// Create a booking for `customer` against a free slot of an active
    /// service.
    ///
    /// On success the booking is `pending`, the slot is consumed, and a
    /// `booking_request` notification goes to the provider carrying the
    /// customer's display name and the service title.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] when the service or slot is missing
    ///   (an inactive service is treated as missing: it is hidden from
    ///   discovery).
    /// - [`BookingError::InvalidField`] when the slot belongs to a
    ///   different service.
    /// - [`BookingError::SlotAlreadyBooked`] when the slot was consumed,
    ///   including losing a creation race.
    /// - [`BookingError::DuplicateOpenBooking`] when the customer already
    ///   holds a non-cancelled booking for this service.
    pub async fn create_booking(
        &self,
        customer_id: UserId,
        customer_name: &str,
        service_id: ServiceId,
        slot_id: SlotId,
        notes: Option<String>,
    ) -> Result<Booking> {
        let service = self.env.services.get(service_id).await?;
        if !service.is_active {
            return Err(BookingError::NotFound {
                resource: "Service",
            });
        }

        let slot = self.env.slots.get(slot_id).await?;
        if slot.service_id != service_id {
            return Err(BookingError::InvalidField {
                field: "availability_id",
                reason: "slot does not belong to the requested service".to_string(),
            });
        }
        if slot.is_booked {
            return Err(BookingError::SlotAlreadyBooked);
        }

        // Friendly pre-check; the store re-checks atomically.
        if self
            .env
            .bookings
            .has_open_booking(customer_id, service_id)
            .await?
        {
            return Err(BookingError::DuplicateOpenBooking);
        }

        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let booking = self
            .env
            .bookings
            .create(NewBooking {
                customer_id,
                service_id,
                provider_id: service.provider_id,
                availability_id: slot_id,
                booking_date: slot.date,
                start_time: slot.start_time,
                end_time: slot.end_time,
                total_price: service.price,
                notes,
            })
            .await?;

        self.emit_best_effort(
            service.provider_id,
            NotificationContent::booking_request(customer_name, &service.title),
            &booking,
        )
        .await;
        self.env.realtime.publish_booking(&booking);

        Ok(booking)
    }

    /// Advance a booking's status on behalf of `actor_id`.
    ///
    /// The transition table is enforced in [`status::validate_transition`];
    /// the update is guarded by the expected current status so a
    /// concurrent transition loses cleanly. The counterparty of the actor
    /// receives the matching notification. Cancelling does not release
    /// the consumed slot.
    ///
    /// # Errors
    ///
    /// - [`BookingError::NotFound`] when the booking is missing.
    /// - [`BookingError::NotAParticipant`] / [`BookingError::RoleNotAllowed`]
    ///   when the actor is not a party, or their role may not perform
    ///   this transition.
    /// - [`BookingError::InvalidTransition`] when the status graph forbids
    ///   the change (including any transition out of a terminal status).
    /// - [`BookingError::ConcurrentUpdate`] when another transition won
    ///   the race.
    pub async fn transition_status(
        &self,
        booking_id: BookingId,
        actor_id: UserId,
        new_status: BookingStatus,
    ) -> Result<Booking> {
        let booking = self.env.bookings.get(booking_id).await?;

        let role = if actor_id == booking.customer_id {
            PartyRole::Customer
        } else if actor_id == booking.provider_id {
            PartyRole::Provider
        } else {
            return Err(BookingError::NotAParticipant);
        };

        status::validate_transition(booking.status, new_status, role)?;

        let updated = self
            .env
            .bookings
            .update_status(booking_id, booking.status, new_status)
            .await?;

        let service_title = match self.env.services.get(booking.service_id).await {
            Ok(service) => service.title,
            Err(_) => "your service".to_string(),
        };

        let (target, content) = match new_status {
            BookingStatus::Confirmed => (
                booking.customer_id,
                NotificationContent::booking_confirmed(&service_title),
            ),
            BookingStatus::Completed => (
                booking.customer_id,
                NotificationContent::booking_completed(&service_title),
            ),
            BookingStatus::Cancelled => {
                let counterparty = match role {
                    PartyRole::Customer => booking.provider_id,
                    PartyRole::Provider => booking.customer_id,
                };
                (
                    counterparty,
                    NotificationContent::booking_cancelled(&service_title),
                )
            }
            // Unreachable through the transition table; nothing to emit.
            BookingStatus::Pending => {
                self.env.realtime.publish_booking(&updated);
                return Ok(updated);
            }
        };

        self.emit_best_effort(target, content, &updated).await;
        self.env.realtime.publish_booking(&updated);

        Ok(updated)
    }

    async fn emit_best_effort(
        &self,
        target: UserId,
        content: NotificationContent,
        booking: &Booking,
    ) {
        if let Err(error) = self
            .env
            .notifier
            .emit(target, content, Some(booking.id.0))
            .await
        {
            tracing::warn!(
                booking_id = %booking.id,
                target = %target,
                %error,
                "failed to emit booking notification"
            );
        }
    }
}
