//! PostgreSQL booking persistence.
//!
//! `create` is the heart of the crate: slot consumption and booking
//! insertion run in one transaction, so a lost race leaves no row and
//! no consumed slot behind.

use crate::db_error;
use nuelreserve_core::stores::{BookingStore, NewBooking};
use nuelreserve_core::{
    Booking, BookingError, BookingId, BookingStatus, Result, ServiceId, SlotId, UserId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: Uuid,
    service_id: Uuid,
    provider_id: Uuid,
    availability_id: Uuid,
    booking_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    total_price: f64,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = BookingError;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Self {
            id: BookingId(row.id),
            customer_id: UserId(row.customer_id),
            service_id: ServiceId(row.service_id),
            provider_id: UserId(row.provider_id),
            availability_id: SlotId(row.availability_id),
            booking_date: row.booking_date,
            start_time: row.start_time,
            end_time: row.end_time,
            total_price: row.total_price,
            status: BookingStatus::parse(&row.status)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COLUMNS: &str = "id, customer_id, service_id, provider_id, availability_id, \
     booking_date, start_time, end_time, total_price, status, notes, \
     created_at, updated_at";

/// Constraint backing the one-open-booking-per-customer-and-service rule.
const OPEN_BOOKING_CONSTRAINT: &str = "bookings_one_open_per_customer_service";

/// PostgreSQL implementation of [`BookingStore`].
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, column: &str, user_id: UserId) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM bookings WHERE {column} = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list bookings", &e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

impl BookingStore for PostgresBookingStore {
    async fn create(&self, booking: NewBooking) -> Result<Booking> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", &e))?;

        // Compare-and-set: of two racing reservations only one flips
        // the slot, the other sees zero rows affected.
        let consumed = sqlx::query(
            "UPDATE availability \
             SET is_booked = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_booked",
        )
        .bind(booking.availability_id.0)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to consume slot", &e))?;

        if consumed.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM availability WHERE id = $1)")
                    .bind(booking.availability_id.0)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| db_error("Failed to inspect slot", &e))?;
            return if exists {
                Err(BookingError::SlotAlreadyBooked)
            } else {
                Err(BookingError::NotFound {
                    resource: "Availability slot",
                })
            };
        }

        let row: BookingRow = sqlx::query_as(&format!(
            "INSERT INTO bookings \
                 (id, customer_id, service_id, provider_id, availability_id, \
                  booking_date, start_time, end_time, total_price, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(booking.customer_id.0)
        .bind(booking.service_id.0)
        .bind(booking.provider_id.0)
        .bind(booking.availability_id.0)
        .bind(booking.booking_date)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.total_price)
        .bind(booking.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_constraint_violation(&e, OPEN_BOOKING_CONSTRAINT) {
                BookingError::DuplicateOpenBooking
            } else {
                db_error("Failed to create booking", &e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit booking", &e))?;

        row.try_into()
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM bookings WHERE id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to get booking", &e))?;

        row.map_or(
            Err(BookingError::NotFound {
                resource: "Booking",
            }),
            TryInto::try_into,
        )
    }

    async fn update_status(
        &self,
        id: BookingId,
        expected: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE bookings \
             SET status = $1, updated_at = NOW() \
             WHERE id = $2 AND status = $3 \
             RETURNING {COLUMNS}"
        ))
        .bind(to.as_str())
        .bind(id.0)
        .bind(expected.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update booking status", &e))?;

        if let Some(row) = row {
            return row.try_into();
        }

        // Guarded update missed: either a concurrent transition got
        // there first, or the booking never existed.
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bookings WHERE id = $1)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to inspect booking", &e))?;
        if exists {
            Err(BookingError::ConcurrentUpdate)
        } else {
            Err(BookingError::NotFound {
                resource: "Booking",
            })
        }
    }

    async fn has_open_booking(&self, customer_id: UserId, service_id: ServiceId) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM bookings \
                 WHERE customer_id = $1 AND service_id = $2 AND status <> 'cancelled' \
             )",
        )
        .bind(customer_id.0)
        .bind(service_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check open bookings", &e))
    }

    async fn list_for_customer(&self, customer_id: UserId) -> Result<Vec<Booking>> {
        self.list_where("customer_id", customer_id).await
    }

    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Booking>> {
        self.list_where("provider_id", provider_id).await
    }
}

fn is_constraint_violation(e: &sqlx::Error, constraint: &str) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(constraint))
}
