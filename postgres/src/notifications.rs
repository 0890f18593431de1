//! PostgreSQL notification persistence.

use crate::db_error;
use nuelreserve_core::stores::{NewNotification, NotificationStore};
use nuelreserve_core::{
    BookingError, Notification, NotificationId, NotificationType, Result, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    message: String,
    related_id: Option<Uuid>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = BookingError;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: NotificationId(row.id),
            user_id: UserId(row.user_id),
            kind: NotificationType::parse(&row.kind)?,
            title: row.title,
            message: row.message,
            related_id: row.related_id,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

const COLUMNS: &str = "id, user_id, type, title, message, related_id, read, created_at";

/// PostgreSQL implementation of [`NotificationStore`].
#[derive(Clone)]
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    /// Create a store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl NotificationStore for PostgresNotificationStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification> {
        let row: NotificationRow = sqlx::query_as(&format!(
            "INSERT INTO notifications (id, user_id, type, title, message, related_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(notification.user_id.0)
        .bind(notification.kind.as_str())
        .bind(notification.title)
        .bind(notification.message)
        .bind(notification.related_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert notification", &e))?;

        row.try_into()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list notifications", &e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn unread_count(&self, user_id: UserId) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
        )
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count unread notifications", &e))?;

        Ok(count.unsigned_abs())
    }

    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> Result<()> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id.0)
                .bind(user_id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to mark notification read", &e))?;

        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound {
                resource: "Notification",
            });
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id.0)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to mark notifications read", &e))?;

        Ok(result.rows_affected())
    }
}
