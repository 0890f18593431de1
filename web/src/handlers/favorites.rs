//! Favorites (bookmarked services).

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use nuelreserve_core::stores::{FavoriteStore, ServiceStore};
use nuelreserve_core::{Favorite, ServiceId};
use serde::Serialize;
use uuid::Uuid;

/// Envelope for favorite listings.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    /// Favorites, newest first.
    pub favorites: Vec<Favorite>,
}

/// Bookmark a service. Bookmarking twice is a no-op.
///
/// # Errors
///
/// 404 for unknown services.
pub async fn add_favorite<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    SS: ServiceStore,
    FS: FavoriteStore,
{
    // Reject dangling bookmarks up front.
    let service = state.services.get(ServiceId(service_id)).await?;
    state.favorites.add(user.id, service.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a bookmark. Removing a non-bookmark is a no-op.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn remove_favorite<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    FS: FavoriteStore,
{
    state.favorites.remove(user.id, ServiceId(service_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's bookmarks, newest first.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_favorites<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<FavoritesResponse>, AppError>
where
    FS: FavoriteStore,
{
    let favorites = state.favorites.list_for_user(user.id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}
