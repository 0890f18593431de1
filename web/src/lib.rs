//! Axum HTTP interface for the NuelReserve booking core.
//!
//! Handlers are a thin imperative shell over `nuelreserve-core`:
//!
//! 1. **Extract** the caller and the request body
//! 2. **Delegate** to a store or the booking lifecycle manager
//! 3. **Map** the domain result onto the JSON response shape
//!
//! Success responses carry the resource (mutations wrap it in
//! `{"success": true, ...}`); every error body is `{"error": "..."}`
//! with the status fixed by the domain error class.
//!
//! # Example
//!
//! ```ignore
//! use nuelreserve_web::{AppState, router};
//!
//! let app = router(AppState {
//!     services, slots, bookings, notifications, favorites,
//!     notifier, realtime,
//! });
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{AppJson, AuthUser, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
