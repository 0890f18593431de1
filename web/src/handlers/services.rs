//! Service listing CRUD and discovery.

use crate::error::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use nuelreserve_core::stores::{NewService, ServiceStore};
use nuelreserve_core::{Service, ServiceId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/v1/services`.
#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    /// Display title.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Discovery category.
    pub category: String,
    /// Session length in minutes.
    pub duration_minutes: i32,
    /// Price per booking.
    pub price: f64,
    /// ISO 4217 currency code, defaults to USD.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Optional location hint.
    #[serde(default)]
    pub location: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Body of `PATCH /api/v1/services/{id}`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New duration.
    pub duration_minutes: Option<i32>,
    /// New price. Existing bookings keep their frozen price.
    pub price: Option<f64>,
    /// New currency code.
    pub currency: Option<String>,
    /// New location hint.
    pub location: Option<String>,
    /// Toggle discovery visibility.
    pub is_active: Option<bool>,
}

/// Discovery filter for `GET /api/v1/services`.
#[derive(Debug, Default, Deserialize)]
pub struct ListServicesQuery {
    /// Restrict to one category.
    pub category: Option<String>,
}

/// Success envelope for single-service responses.
#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    /// Always `true` on the success path.
    pub success: bool,
    /// The created or updated service.
    pub service: Service,
}

/// Envelope for service listings.
#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    /// Matching services, newest first.
    pub services: Vec<Service>,
}

/// List active services for discovery.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_services<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    Query(query): Query<ListServicesQuery>,
) -> Result<Json<ServicesResponse>, AppError>
where
    SS: ServiceStore,
{
    let services = state.services.list_active(query.category).await?;
    Ok(Json(ServicesResponse { services }))
}

/// Fetch one service.
///
/// Inactive services are visible only to their owner; everyone else
/// sees a 404, matching their absence from discovery.
///
/// # Errors
///
/// 404 for unknown or hidden services.
pub async fn get_service<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, AppError>
where
    SS: ServiceStore,
{
    let service = state.services.get(ServiceId(id)).await?;
    if !service.is_active && service.provider_id != user.id {
        return Err(AppError::not_found("Service not found"));
    }
    Ok(Json(service))
}

/// Create a service owned by the caller.
///
/// # Errors
///
/// 400 for invalid fields.
pub async fn create_service<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    AppJson(req): AppJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), AppError>
where
    SS: ServiceStore,
{
    let service = state
        .services
        .create(NewService {
            provider_id: user.id,
            title: req.title,
            description: req.description,
            category: req.category,
            duration_minutes: req.duration_minutes,
            price: req.price,
            currency: req.currency,
            location: req.location,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ServiceResponse {
            success: true,
            service,
        }),
    ))
}

/// Edit a service. Owner only.
///
/// Price and duration edits do not drift into existing bookings, which
/// keep the values frozen at creation.
///
/// # Errors
///
/// 403 when the caller is not the owner, 400 for invalid fields.
pub async fn update_service<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<UpdateServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError>
where
    SS: ServiceStore,
{
    let mut service = state.services.get(ServiceId(id)).await?;
    if service.provider_id != user.id {
        return Err(AppError::forbidden("You do not own this service"));
    }

    if let Some(title) = req.title {
        service.title = title;
    }
    if let Some(description) = req.description {
        service.description = Some(description);
    }
    if let Some(category) = req.category {
        service.category = category;
    }
    if let Some(duration_minutes) = req.duration_minutes {
        service.duration_minutes = duration_minutes;
    }
    if let Some(price) = req.price {
        service.price = price;
    }
    if let Some(currency) = req.currency {
        service.currency = currency;
    }
    if let Some(location) = req.location {
        service.location = Some(location);
    }
    if let Some(is_active) = req.is_active {
        service.is_active = is_active;
    }

    validate_edited(&service)?;
    let service = state.services.update(&service).await?;

    Ok(Json(ServiceResponse {
        success: true,
        service,
    }))
}

/// Deactivate a service. Owner only.
///
/// Soft delete: the service disappears from discovery but existing
/// bookings are untouched.
///
/// # Errors
///
/// 403 when the caller is not the owner.
pub async fn deactivate_service<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceResponse>, AppError>
where
    SS: ServiceStore,
{
    let mut service = state.services.get(ServiceId(id)).await?;
    if service.provider_id != user.id {
        return Err(AppError::forbidden("You do not own this service"));
    }

    service.is_active = false;
    let service = state.services.update(&service).await?;

    Ok(Json(ServiceResponse {
        success: true,
        service,
    }))
}

/// List all of the caller's own services, active or not.
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_own_services<SS, AS, BS, NS, FS, N>(
    State(state): State<AppState<SS, AS, BS, NS, FS, N>>,
    user: AuthUser,
) -> Result<Json<ServicesResponse>, AppError>
where
    SS: ServiceStore,
{
    let services = state.services.list_for_provider(user.id).await?;
    Ok(Json(ServicesResponse { services }))
}

/// Re-run creation validation against an edited service.
fn validate_edited(service: &Service) -> Result<(), AppError> {
    NewService {
        provider_id: service.provider_id,
        title: service.title.clone(),
        description: service.description.clone(),
        category: service.category.clone(),
        duration_minutes: service.duration_minutes,
        price: service.price,
        currency: service.currency.clone(),
        location: service.location.clone(),
    }
    .validate()?;
    Ok(())
}
