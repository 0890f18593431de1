//! PostgreSQL availability slots.

use crate::db_error;
use nuelreserve_core::stores::{DateRange, NewSlot, SlotStore};
use nuelreserve_core::{AvailabilitySlot, BookingError, Result, ServiceId, SlotId, UserId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    service_id: Uuid,
    provider_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    is_booked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SlotRow> for AvailabilitySlot {
    fn from(row: SlotRow) -> Self {
        Self {
            id: SlotId(row.id),
            service_id: ServiceId(row.service_id),
            provider_id: UserId(row.provider_id),
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            is_booked: row.is_booked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str =
    "id, service_id, provider_id, date, start_time, end_time, is_booked, created_at, updated_at";

/// PostgreSQL implementation of [`SlotStore`].
///
/// `mark_booked` is a single conditional update; of two racing calls
/// only one flips the flag, the other sees zero rows affected.
#[derive(Clone)]
pub struct PostgresSlotStore {
    pool: PgPool,
}

impl PostgresSlotStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn booked_flag(&self, id: SlotId) -> Result<Option<bool>> {
        sqlx::query_scalar("SELECT is_booked FROM availability WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to inspect slot", &e))
    }
}

impl SlotStore for PostgresSlotStore {
    async fn create(&self, slot: NewSlot) -> Result<AvailabilitySlot> {
        slot.validate()?;

        let row: SlotRow = sqlx::query_as(&format!(
            "INSERT INTO availability \
                 (id, service_id, provider_id, date, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(slot.service_id.0)
        .bind(slot.provider_id.0)
        .bind(slot.date)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create slot", &e))?;

        Ok(row.into())
    }

    async fn get(&self, id: SlotId) -> Result<AvailabilitySlot> {
        let row: Option<SlotRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM availability WHERE id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to get slot", &e))?;

        row.map(Into::into).ok_or(BookingError::NotFound {
            resource: "Availability slot",
        })
    }

    async fn list_for_service(
        &self,
        service_id: ServiceId,
        range: DateRange,
        free_only: bool,
    ) -> Result<Vec<AvailabilitySlot>> {
        let rows: Vec<SlotRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM availability \
             WHERE service_id = $1 \
               AND ($2::date IS NULL OR date >= $2) \
               AND ($3::date IS NULL OR date <= $3) \
               AND (NOT $4 OR NOT is_booked) \
             ORDER BY date ASC, start_time ASC"
        ))
        .bind(service_id.0)
        .bind(range.from)
        .bind(range.to)
        .bind(free_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list slots", &e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: SlotId) -> Result<()> {
        let result = sqlx::query("DELETE FROM availability WHERE id = $1 AND NOT is_booked")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete slot", &e))?;

        if result.rows_affected() == 0 {
            return match self.booked_flag(id).await? {
                Some(_) => Err(BookingError::SlotInUse),
                None => Err(BookingError::NotFound {
                    resource: "Availability slot",
                }),
            };
        }
        Ok(())
    }

    async fn mark_booked(&self, id: SlotId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE availability \
             SET is_booked = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_booked",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark slot booked", &e))?;

        if result.rows_affected() == 0 {
            return match self.booked_flag(id).await? {
                Some(_) => Err(BookingError::SlotAlreadyBooked),
                None => Err(BookingError::NotFound {
                    resource: "Availability slot",
                }),
            };
        }
        Ok(())
    }

    async fn mark_free(&self, id: SlotId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE availability \
             SET is_booked = FALSE, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark slot free", &e))?;

        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound {
                resource: "Availability slot",
            });
        }
        Ok(())
    }
}
