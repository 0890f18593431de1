//! Booking creation, status transitions and listings.

use crate::error::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use nuelreserve_core::stores::{
    BookingStore, FavoriteStore, NotificationStore, ServiceStore, SlotStore,
};
use nuelreserve_core::{Booking, BookingId, BookingStatus, Notifier, ServiceId, SlotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/v1/bookings`.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Service to book.
    pub service_id: Uuid,
    /// Free slot to consume.
    pub availability_id: Uuid,
    /// Optional customer notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `PATCH /api/v1/bookings/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Requested target status.
    pub status: String,
}

/// Success envelope for single-booking responses.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The created or updated booking.
    pub booking: Booking,
}

/// Envelope for booking listings.
#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    /// Bookings, newest first.
    pub bookings: Vec<Booking>,
}

/// Create a booking, consuming an availability slot.
///
/// Returns `201 {"success": true, "booking": ...}`. A consumed slot or
/// an existing open booking for the same service is a 409; an unknown
/// service or slot is a 404.
///
/// # Errors
///
/// Maps [`nuelreserve_core::BookingError`] through [`AppError`].
pub async fn create_booking<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    AppJson(req): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError>
where
    SS: ServiceStore + Clone,
    AS: SlotStore + Clone,
    BS: BookingStore + Clone,
    NS: NotificationStore,
    FS: FavoriteStore,
    N: Notifier + Clone,
{
    let booking = state
        .lifecycle()
        .create_booking(
            user.id,
            &user.display_name,
            ServiceId(req.service_id),
            SlotId(req.availability_id),
            req.notes,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            booking,
        }),
    ))
}

/// Transition a booking's status.
///
/// The caller must be a participant; role and transition rules are
/// enforced by the lifecycle manager.
///
/// # Errors
///
/// 400 for unknown or illegal target statuses, 403 for non-participants
/// or the wrong role, 409 when a concurrent transition won.
pub async fn update_booking_status<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, AppError>
where
    SS: ServiceStore + Clone,
    AS: SlotStore + Clone,
    BS: BookingStore + Clone,
    NS: NotificationStore,
    FS: FavoriteStore,
    N: Notifier + Clone,
{
    let status = BookingStatus::parse(&req.status)?;
    let booking = state
        .lifecycle()
        .transition_status(BookingId(id), user.id, status)
        .await?;

    Ok(Json(BookingResponse {
        success: true,
        booking,
    }))
}

/// List the caller's bookings as a customer, newest first.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_my_bookings<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<BookingsResponse>, AppError>
where
    BS: BookingStore,
{
    let bookings = state.bookings.list_for_customer(user.id).await?;
    Ok(Json(BookingsResponse { bookings }))
}

/// List incoming bookings for the caller as a provider, newest first.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_incoming_bookings<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<BookingsResponse>, AppError>
where
    BS: BookingStore,
{
    let bookings = state.bookings.list_for_provider(user.id).await?;
    Ok(Json(BookingsResponse { bookings }))
}
