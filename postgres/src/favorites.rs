//! PostgreSQL favorites persistence.

use crate::db_error;
use nuelreserve_core::stores::FavoriteStore;
use nuelreserve_core::{Favorite, Result, ServiceId, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    user_id: Uuid,
    service_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            service_id: ServiceId(row.service_id),
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of [`FavoriteStore`].
#[derive(Clone)]
pub struct PostgresFavoriteStore {
    pool: PgPool,
}

impl PostgresFavoriteStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl FavoriteStore for PostgresFavoriteStore {
    async fn add(&self, user_id: UserId, service_id: ServiceId) -> Result<()> {
        sqlx::query(
            "INSERT INTO favorites (user_id, service_id) \
             VALUES ($1, $2) \
             ON CONFLICT (user_id, service_id) DO NOTHING",
        )
        .bind(user_id.0)
        .bind(service_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add favorite", &e))?;
        Ok(())
    }

    async fn remove(&self, user_id: UserId, service_id: ServiceId) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND service_id = $2")
            .bind(user_id.0)
            .bind(service_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove favorite", &e))?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Favorite>> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(
            "SELECT user_id, service_id, created_at FROM favorites \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list favorites", &e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
