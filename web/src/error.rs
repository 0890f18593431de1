//! Error types for web handlers.
//!
//! Bridges [`BookingError`] into HTTP responses. Every error body has
//! the shape `{"error": "..."}`; server-side failures are logged with
//! their source and surfaced as an opaque 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nuelreserve_core::BookingError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors with an HTTP status and a user-facing message,
/// and implements Axum's `IntoResponse`.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let booking = state.bookings.get(id).await?;
///     Ok(Json(booking))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code.
    status: StatusCode,
    /// Error message (user-facing).
    message: String,
    /// Internal error (for logging, not exposed to the client).
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into())
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into())
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into())
    }

    /// Create a 500 Internal Server Error with an opaque message.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Human-readable error message.
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            error: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Map domain errors onto the HTTP surface.
///
/// Validation problems (including illegal status transitions) are 400,
/// races and uniqueness conflicts are 409, role and participation
/// failures are 403, storage failures are an opaque 500.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match &err {
            BookingError::NotFound { .. } => Self::not_found(err.to_string()),
            BookingError::InvalidTransition { .. } => Self::bad_request(err.to_string()),
            BookingError::DatabaseError(_) | BookingError::Internal => {
                Self::internal().with_source(anyhow::Error::new(err))
            }
            e if e.is_validation() => Self::bad_request(err.to_string()),
            e if e.is_conflict() => Self::conflict(err.to_string()),
            e if e.is_forbidden() => Self::forbidden(err.to_string()),
            _ => Self::internal().with_source(anyhow::Error::new(err)),
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal().with_source(err)
    }
}
