//! HTTP request handlers.
//!
//! Handlers are thin: extract, delegate to the stores or the lifecycle
//! manager, map the domain result onto the response shape. All business
//! rules live in `nuelreserve-core`.

pub mod availability;
pub mod bookings;
pub mod dashboard;
pub mod favorites;
pub mod health;
pub mod notifications;
pub mod services;
