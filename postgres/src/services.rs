//! PostgreSQL service listings.

use crate::db_error;
use nuelreserve_core::stores::{NewService, ServiceStore};
use nuelreserve_core::{BookingError, Result, Service, ServiceId, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    provider_id: Uuid,
    title: String,
    description: Option<String>,
    category: String,
    duration_minutes: i32,
    price: f64,
    currency: String,
    location: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: ServiceId(row.id),
            provider_id: UserId(row.provider_id),
            title: row.title,
            description: row.description,
            category: row.category,
            duration_minutes: row.duration_minutes,
            price: row.price,
            currency: row.currency,
            location: row.location,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, provider_id, title, description, category, duration_minutes, \
                       price, currency, location, is_active, created_at, updated_at";

/// PostgreSQL implementation of [`ServiceStore`].
#[derive(Clone)]
pub struct PostgresServiceStore {
    pool: PgPool,
}

impl PostgresServiceStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ServiceStore for PostgresServiceStore {
    async fn create(&self, service: NewService) -> Result<Service> {
        service.validate()?;

        let row: ServiceRow = sqlx::query_as(&format!(
            "INSERT INTO services \
                 (id, provider_id, title, description, category, duration_minutes, \
                  price, currency, location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(service.provider_id.0)
        .bind(&service.title)
        .bind(&service.description)
        .bind(&service.category)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(&service.currency)
        .bind(&service.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create service", &e))?;

        Ok(row.into())
    }

    async fn get(&self, id: ServiceId) -> Result<Service> {
        let row: Option<ServiceRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM services WHERE id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to get service", &e))?;

        row.map(Into::into).ok_or(BookingError::NotFound {
            resource: "Service",
        })
    }

    async fn update(&self, service: &Service) -> Result<Service> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "UPDATE services \
             SET title = $2, description = $3, category = $4, duration_minutes = $5, \
                 price = $6, currency = $7, location = $8, is_active = $9, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(service.id.0)
        .bind(&service.title)
        .bind(&service.description)
        .bind(&service.category)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(&service.currency)
        .bind(&service.location)
        .bind(service.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update service", &e))?;

        row.map(Into::into).ok_or(BookingError::NotFound {
            resource: "Service",
        })
    }

    async fn list_active(&self, category: Option<String>) -> Result<Vec<Service>> {
        let rows: Vec<ServiceRow> = match category {
            Some(category) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM services \
                     WHERE is_active AND category = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM services \
                     WHERE is_active \
                     ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| db_error("Failed to list services", &e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_provider(&self, provider_id: UserId) -> Result<Vec<Service>> {
        let rows: Vec<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM services \
             WHERE provider_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(provider_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list provider services", &e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
