//! Provider dashboard aggregates.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::state::AppState;
use axum::{Json, extract::State};
use chrono::Utc;
use nuelreserve_core::analytics::{self, DashboardStats};
use nuelreserve_core::stores::{BookingStore, ServiceStore};
use nuelreserve_core::Booking;
use serde::Serialize;

/// Body of the dashboard response.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Aggregate figures over the provider's bookings.
    pub stats: DashboardStats,
    /// Next open bookings, soonest first, at most five.
    pub upcoming: Vec<Booking>,
}

/// Aggregate dashboard figures for the caller as a provider.
///
/// Revenue and the monthly buckets count completed bookings created in
/// the last 30 days.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn provider_dashboard<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>, AppError>
where
    SS: ServiceStore,
    BS: BookingStore,
{
    let services = state.services.list_for_provider(user.id).await?;
    let bookings = state.bookings.list_for_provider(user.id).await?;

    let now = Utc::now();
    let stats = analytics::dashboard_stats(services.len() as u64, &bookings, now);
    let upcoming = analytics::upcoming_bookings(&bookings, now.date_naive());

    Ok(Json(DashboardResponse { stats, upcoming }))
}
