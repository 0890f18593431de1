//! Notification inbox endpoints.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use nuelreserve_core::stores::NotificationStore;
use nuelreserve_core::{Notification, NotificationId};
use serde::Serialize;
use uuid::Uuid;

/// Envelope for notification listings.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,
}

/// Body of the unread-count response.
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    /// Number of unread notifications.
    pub count: u64,
}

/// Body of the mark-all-read response.
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// How many notifications were flipped to read.
    pub updated: u64,
}

/// List the caller's notifications, newest first.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_notifications<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<NotificationsResponse>, AppError>
where
    NS: NotificationStore,
{
    let notifications = state.notifications.list_for_user(user.id).await?;
    Ok(Json(NotificationsResponse { notifications }))
}

/// Count the caller's unread notifications.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn unread_count<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError>
where
    NS: NotificationStore,
{
    let count = state.notifications.unread_count(user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark one notification as read. The caller must own it.
///
/// # Errors
///
/// 404 when the notification does not exist or belongs to someone else.
pub async fn mark_read<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    NS: NotificationStore,
{
    state
        .notifications
        .mark_read(NotificationId(id), user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark all of the caller's notifications as read.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn mark_all_read<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<MarkAllReadResponse>, AppError>
where
    NS: NotificationStore,
{
    let updated = state.notifications.mark_all_read(user.id).await?;
    Ok(Json(MarkAllReadResponse {
        success: true,
        updated,
    }))
}
