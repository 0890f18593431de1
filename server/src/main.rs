//! NuelReserve booking marketplace HTTP server.
//!
//! Wires the Postgres stores, the store-backed notifier and the
//! realtime hub into the Axum router and serves it.

mod config;

use config::Config;
use nuelreserve_core::{RealtimeHub, StoreNotifier};
use nuelreserve_postgres::{
    PostgresBookingStore, PostgresFavoriteStore, PostgresNotificationStore, PostgresServiceStore,
    PostgresSlotStore,
};
use nuelreserve_web::{AppState, router};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nuelreserve=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting NuelReserve server");

    let config = Config::from_env();
    info!(
        database_url = %config.postgres.url,
        address = %config.bind_address(),
        "Configuration loaded"
    );

    let pool = nuelreserve_postgres::connect(&config.postgres.url, config.postgres.max_connections)
        .await?;
    info!("Database connected");

    nuelreserve_postgres::migrate(&pool).await?;
    info!("Migrations applied");

    let realtime = RealtimeHub::default();
    let notifications = PostgresNotificationStore::new(pool.clone());
    let state = AppState {
        services: PostgresServiceStore::new(pool.clone()),
        slots: PostgresSlotStore::new(pool.clone()),
        bookings: PostgresBookingStore::new(pool.clone()),
        notifications: notifications.clone(),
        favorites: PostgresFavoriteStore::new(pool),
        notifier: StoreNotifier::new(notifications, realtime.clone()),
        realtime,
    };

    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown on Ctrl+C or SIGTERM.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
