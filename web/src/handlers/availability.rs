//! Availability slot management and listings.

use crate::error::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use nuelreserve_core::stores::{DateRange, NewSlot, ServiceStore, SlotStore};
use nuelreserve_core::types::{parse_date, parse_time};
use nuelreserve_core::{AvailabilitySlot, ServiceId, SlotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/v1/services/{id}/availability`.
#[derive(Debug, Deserialize)]
pub struct CreateSlotRequest {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Window start, `HH:MM` or `HH:MM:SS`.
    pub start_time: String,
    /// Window end, `HH:MM` or `HH:MM:SS`.
    pub end_time: String,
}

/// Date filter for slot listings. Bounds are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct ListSlotsQuery {
    /// Earliest date, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Latest date, `YYYY-MM-DD`.
    pub to: Option<String>,
}

/// Success envelope for single-slot responses.
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The created slot.
    pub slot: AvailabilitySlot,
}

/// Envelope for slot listings.
#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    /// Slots ordered by (date, start_time) ascending.
    pub slots: Vec<AvailabilitySlot>,
}

/// List a service's slots.
///
/// The owner sees every slot; everyone else sees only free ones, since
/// a consumed slot is no longer bookable. A deactivated service is
/// invisible to non-owners, matching the service detail endpoint.
///
/// # Errors
///
/// 400 for malformed dates, 404 for unknown or deactivated services.
pub async fn list_slots<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(service_id): Path<Uuid>,
    Query(query): Query<ListSlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError>
where
    SS: ServiceStore,
    AS: SlotStore,
{
    let service = state.services.get(ServiceId(service_id)).await?;
    if !service.is_active && service.provider_id != user.id {
        return Err(AppError::not_found("Service not found"));
    }

    let range = DateRange {
        from: query.from.as_deref().map(|s| parse_date("from", s)).transpose()?,
        to: query.to.as_deref().map(|s| parse_date("to", s)).transpose()?,
    };
    let free_only = service.provider_id != user.id;

    let slots = state
        .slots
        .list_for_service(service.id, range, free_only)
        .await?;
    Ok(Json(SlotsResponse { slots }))
}

/// Create a free slot for a service. Owner only.
///
/// Overlapping windows are not rejected; customers simply pick one.
///
/// # Errors
///
/// 403 when the caller does not own the service, 400 for malformed
/// dates, times or an empty window.
pub async fn create_slot<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(service_id): Path<Uuid>,
    AppJson(req): AppJson<CreateSlotRequest>,
) -> Result<(StatusCode, Json<SlotResponse>), AppError>
where
    SS: ServiceStore,
    AS: SlotStore,
{
    let service = state.services.get(ServiceId(service_id)).await?;
    if service.provider_id != user.id {
        return Err(AppError::forbidden("You do not own this service"));
    }

    let slot = state
        .slots
        .create(NewSlot {
            service_id: service.id,
            provider_id: user.id,
            date: parse_date("date", &req.date)?,
            start_time: parse_time("start_time", &req.start_time)?,
            end_time: parse_time("end_time", &req.end_time)?,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SlotResponse {
            success: true,
            slot,
        }),
    ))
}

/// Delete a free slot. Owner only.
///
/// # Errors
///
/// 403 when the caller does not own the slot, 409 when a booking has
/// consumed it.
pub async fn delete_slot<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(slot_id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    AS: SlotStore,
{
    let slot = state.slots.get(SlotId(slot_id)).await?;
    if slot.provider_id != user.id {
        return Err(AppError::forbidden("You do not own this slot"));
    }

    state.slots.delete(slot.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
