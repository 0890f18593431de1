//! Route table.

use crate::handlers;
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use nuelreserve_core::Notifier;
use nuelreserve_core::stores::{
    BookingStore, FavoriteStore, NotificationStore, ServiceStore, SlotStore,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router over the given state.
///
/// All business routes live under `/api/v1` and require a bearer user
/// id; `/health` is open.
pub fn router<SS, AS, BS, NS, FS, N>(state: AppState<SS, AS, BS, NS, FS, N>) -> Router
where
    SS: ServiceStore + Clone + Send + Sync + 'static,
    AS: SlotStore + Clone + Send + Sync + 'static,
    BS: BookingStore + Clone + Send + Sync + 'static,
    NS: NotificationStore + Clone + Send + Sync + 'static,
    FS: FavoriteStore + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let api = Router::new()
        // Bookings
        .route(
            "/bookings",
            post(handlers::bookings::create_booking).get(handlers::bookings::list_my_bookings),
        )
        .route(
            "/bookings/:id/status",
            patch(handlers::bookings::update_booking_status),
        )
        .route(
            "/provider/bookings",
            get(handlers::bookings::list_incoming_bookings),
        )
        // Services
        .route(
            "/services",
            get(handlers::services::list_services).post(handlers::services::create_service),
        )
        .route(
            "/services/:id",
            get(handlers::services::get_service)
                .patch(handlers::services::update_service)
                .delete(handlers::services::deactivate_service),
        )
        .route(
            "/provider/services",
            get(handlers::services::list_own_services),
        )
        // Availability
        .route(
            "/services/:id/availability",
            get(handlers::availability::list_slots).post(handlers::availability::create_slot),
        )
        .route(
            "/availability/:id",
            delete(handlers::availability::delete_slot),
        )
        // Notifications
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/notifications/:id/read",
            post(handlers::notifications::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(handlers::notifications::mark_all_read),
        )
        // Favorites
        .route("/favorites", get(handlers::favorites::list_favorites))
        .route(
            "/favorites/:service_id",
            put(handlers::favorites::add_favorite).delete(handlers::favorites::remove_favorite),
        )
        // Provider dashboard
        .route(
            "/provider/dashboard",
            get(handlers::dashboard::provider_dashboard),
        );

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(handlers::health::health_check))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
