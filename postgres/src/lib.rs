//! # NuelReserve PostgreSQL storage
//!
//! Implements the storage traits from `nuelreserve-core` over a
//! [`sqlx::PgPool`]. Slot consumption is a conditional `UPDATE … WHERE
//! NOT is_booked` executed inside the booking-creation transaction,
//! and the one-open-booking-per-(customer, service) rule is backed by a
//! partial unique index, so both invariants hold under concurrency
//! without explicit locks.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bookings;
mod favorites;
mod notifications;
mod services;
mod slots;

pub use bookings::PostgresBookingStore;
pub use favorites::PostgresFavoriteStore;
pub use notifications::PostgresNotificationStore;
pub use services::PostgresServiceStore;
pub use slots::PostgresSlotStore;

use nuelreserve_core::{BookingError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Connect a pool with production-oriented settings.
///
/// # Errors
///
/// Returns [`BookingError::DatabaseError`] when the connection fails.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(300))
        .connect(database_url)
        .await
        .map_err(|e| BookingError::DatabaseError(format!("Failed to connect: {e}")))
}

/// Run embedded migrations.
///
/// # Errors
///
/// Returns [`BookingError::DatabaseError`] when a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| BookingError::DatabaseError(format!("Migration failed: {e}")))?;
    Ok(())
}

pub(crate) fn db_error(context: &str, e: &sqlx::Error) -> BookingError {
    tracing::error!(error = %e, "{context}");
    BookingError::DatabaseError(format!("{context}: {e}"))
}
