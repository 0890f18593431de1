//! Application state shared across HTTP handlers.

use nuelreserve_core::stores::{
    BookingStore, FavoriteStore, NotificationStore, ServiceStore, SlotStore,
};
use nuelreserve_core::{BookingEnvironment, BookingLifecycle, Notifier, RealtimeHub};

/// Application state shared across all HTTP handlers.
///
/// Generic over the store providers so production runs on Postgres and
/// tests run on the in-memory mocks without touching handler code.
/// Cloning is cheap: every provider is a handle over shared state.
#[derive(Clone)]
pub struct AppState<SS, AS, BS, NS, FS, N> {
    /// Service listings.
    pub services: SS,
    /// Availability slots.
    pub slots: AS,
    /// Bookings.
    pub bookings: BS,
    /// Persisted notifications.
    pub notifications: NS,
    /// Favorites membership.
    pub favorites: FS,
    /// Outgoing notification emitter.
    pub notifier: N,
    /// In-process change feed.
    pub realtime: RealtimeHub,
}

impl<SS, AS, BS, NS, FS, N> AppState<SS, AS, BS, NS, FS, N>
where
    SS: ServiceStore + Clone,
    AS: SlotStore + Clone,
    BS: BookingStore + Clone,
    NS: NotificationStore,
    FS: FavoriteStore,
    N: Notifier + Clone,
{
    /// Build a lifecycle manager over this state's providers.
    pub fn lifecycle(&self) -> BookingLifecycle<SS, AS, BS, N> {
        BookingLifecycle::new(BookingEnvironment {
            services: self.services.clone(),
            slots: self.slots.clone(),
            bookings: self.bookings.clone(),
            notifier: self.notifier.clone(),
            realtime: self.realtime.clone(),
        })
    }
}
