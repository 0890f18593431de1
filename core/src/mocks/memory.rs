//! Shared in-memory storage.

use crate::error::{BookingError, Result};
use crate::status::BookingStatus;
use crate::stores::{
    BookingStore, DateRange, FavoriteStore, NewBooking, NewNotification, NewService, NewSlot,
    NotificationStore, ServiceStore, SlotStore,
};
use crate::types::{
    AvailabilitySlot, Booking, BookingId, Favorite, Notification, NotificationId, Service,
    ServiceId, SlotId, UserId,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    services: HashMap<ServiceId, Service>,
    slots: HashMap<SlotId, AvailabilitySlot>,
    bookings: HashMap<BookingId, Booking>,
    notifications: HashMap<NotificationId, Notification>,
    favorites: Vec<Favorite>,
}

/// In-memory implementation of all storage traits.
///
/// Clones share the same state. Every operation takes the single state
/// lock for its whole duration, so the booking creation unit of work
/// (duplicate check, slot compare-and-set, insert) is atomic exactly
/// like the Postgres transaction it stands in for.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| BookingError::Internal)
    }
}

impl ServiceStore for MemoryStore {
    async fn create(&self, service: NewService) -> Result<Service> {
        service.validate()?;
        let now = Utc::now();
        let service = Service {
            id: ServiceId::new(),
            provider_id: service.provider_id,
            title: service.title,
            description: service.description,
            category: service.category,
            duration_minutes: service.duration_minutes,
            price: service.price,
            currency: service.currency,
            location: service.location,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn get(&self, id: ServiceId) -> Result<Service> {
        self.lock()?
            .services
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound {
                resource: "Service",
            })
    }

    async fn update(&self, service: &Service) -> Result<Service> {
        let mut state = self.lock()?;
        if !state.services.contains_key(&service.id) {
            return Err(BookingError::NotFound {
                resource: "Service",
            });
        }
        let mut updated = service.clone();
        updated.updated_at = Utc::now();
        state.services.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn list_active(&self, category: Option<String>) -> Result<Vec<Service>> {
        let state = self.lock()?;
        let mut services: Vec<Service> = state
            .services
            .values()
            .filter(|s| s.is_active)
            .filter(|s| category.as_ref().is_none_or(|c| &s.category == c))
            .cloned()
            .collect();
        services.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(services)
    }

    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Service>> {
        let state = self.lock()?;
        let mut services: Vec<Service> = state
            .services
            .values()
            .filter(|s| s.provider_id == provider_id)
            .cloned()
            .collect();
        services.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(services)
    }
}

impl SlotStore for MemoryStore {
    async fn create(&self, slot: NewSlot) -> Result<AvailabilitySlot> {
        slot.validate()?;
        let now = Utc::now();
        let slot = AvailabilitySlot {
            id: SlotId::new(),
            service_id: slot.service_id,
            provider_id: slot.provider_id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            is_booked: false,
            created_at: now,
            updated_at: now,
        };
        self.lock()?.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn get(&self, id: SlotId) -> Result<AvailabilitySlot> {
        self.lock()?
            .slots
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound {
                resource: "Availability slot",
            })
    }

    async fn list_for_service(
        &self,
        service_id: ServiceId,
        range: DateRange,
        free_only: bool,
    ) -> Result<Vec<AvailabilitySlot>> {
        let state = self.lock()?;
        let mut slots: Vec<AvailabilitySlot> = state
            .slots
            .values()
            .filter(|s| s.service_id == service_id)
            .filter(|s| range.contains(s.date))
            .filter(|s| !free_only || !s.is_booked)
            .cloned()
            .collect();
        slots.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
        Ok(slots)
    }

    async fn delete(&self, id: SlotId) -> Result<()> {
        let mut state = self.lock()?;
        let slot = state.slots.get(&id).ok_or(BookingError::NotFound {
            resource: "Availability slot",
        })?;
        if slot.is_booked {
            return Err(BookingError::SlotInUse);
        }
        state.slots.remove(&id);
        Ok(())
    }

    async fn mark_booked(&self, id: SlotId) -> Result<()> {
        let mut state = self.lock()?;
        let slot = state.slots.get_mut(&id).ok_or(BookingError::NotFound {
            resource: "Availability slot",
        })?;
        if slot.is_booked {
            return Err(BookingError::SlotAlreadyBooked);
        }
        slot.is_booked = true;
        slot.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_free(&self, id: SlotId) -> Result<()> {
        let mut state = self.lock()?;
        let slot = state.slots.get_mut(&id).ok_or(BookingError::NotFound {
            resource: "Availability slot",
        })?;
        slot.is_booked = false;
        slot.updated_at = Utc::now();
        Ok(())
    }
}

impl BookingStore for MemoryStore {
    async fn create(&self, booking: NewBooking) -> Result<Booking> {
        // One lock across the duplicate check, the slot CAS and the
        // insert: this is the whole unit of work.
        let mut state = self.lock()?;

        let duplicate = state.bookings.values().any(|b| {
            b.customer_id == booking.customer_id
                && b.service_id == booking.service_id
                && b.status.is_open()
        });
        if duplicate {
            return Err(BookingError::DuplicateOpenBooking);
        }

        let slot = state
            .slots
            .get_mut(&booking.availability_id)
            .ok_or(BookingError::NotFound {
                resource: "Availability slot",
            })?;
        if slot.is_booked {
            return Err(BookingError::SlotAlreadyBooked);
        }
        slot.is_booked = true;
        slot.updated_at = Utc::now();

        let now = Utc::now();
        let booking = Booking {
            id: BookingId::new(),
            customer_id: booking.customer_id,
            service_id: booking.service_id,
            provider_id: booking.provider_id,
            availability_id: booking.availability_id,
            booking_date: booking.booking_date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            total_price: booking.total_price,
            status: BookingStatus::Pending,
            notes: booking.notes,
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        self.lock()?
            .bookings
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound {
                resource: "Booking",
            })
    }

    async fn update_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking> {
        let mut state = self.lock()?;
        let booking = state.bookings.get_mut(&id).ok_or(BookingError::NotFound {
            resource: "Booking",
        })?;
        if booking.status != expected {
            return Err(BookingError::ConcurrentUpdate);
        }
        booking.status = to;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn has_open_booking(
        &self,
        customer_id: UserId,
        service_id: ServiceId,
    ) -> Result<bool> {
        let state = self.lock()?;
        Ok(state.bookings.values().any(|b| {
            b.customer_id == customer_id && b.service_id == service_id && b.status.is_open()
        }))
    }

    async fn list_for_customer(&self, customer_id: UserId) -> Result<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.provider_id == provider_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }
}

impl NotificationStore for MemoryStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: NotificationId::new(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            related_id: notification.related_id,
            read: false,
            created_at: Utc::now(),
        };
        self.lock()?
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let state = self.lock()?;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn unread_count(&self, user_id: UserId) -> Result<u64> {
        let state = self.lock()?;
        Ok(state
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as u64)
    }

    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> Result<()> {
        let mut state = self.lock()?;
        match state.notifications.get_mut(&id) {
            Some(notification) if notification.user_id == user_id => {
                notification.read = true;
                Ok(())
            }
            _ => Err(BookingError::NotFound {
                resource: "Notification",
            }),
        }
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64> {
        let mut state = self.lock()?;
        let mut flipped = 0;
        for notification in state.notifications.values_mut() {
            if notification.user_id == user_id && !notification.read {
                notification.read = true;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

impl FavoriteStore for MemoryStore {
    async fn add(&self, user_id: UserId, service_id: ServiceId) -> Result<()> {
        let mut state = self.lock()?;
        let exists = state
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.service_id == service_id);
        if !exists {
            state.favorites.push(Favorite {
                user_id,
                service_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn remove(&self, user_id: UserId, service_id: ServiceId) -> Result<()> {
        let mut state = self.lock()?;
        state
            .favorites
            .retain(|f| !(f.user_id == user_id && f.service_id == service_id));
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>> {
        let state = self.lock()?;
        let mut favorites: Vec<Favorite> = state
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites)
    }
}
