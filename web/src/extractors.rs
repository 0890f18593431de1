//! Custom Axum extractors.
//!
//! - `AuthUser`: the authenticated caller, from the `Authorization`
//!   bearer token (session verification is delegated upstream; the
//!   token carries the user id).
//! - `AppJson`: JSON request bodies with the API's error body shape.
//! - `CorrelationId`: extract or generate request correlation IDs.

use crate::error::AppError;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use nuelreserve_core::UserId;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// The authenticated caller.
///
/// Extracted from `Authorization: Bearer <user-uuid>`, with the display
/// name taken from the `X-User-Name` header when present. A missing or
/// malformed token rejects with 401 and an `{"error": ...}` body.
///
/// # Example
///
/// ```ignore
/// async fn handler(user: AuthUser) -> String {
///     format!("Hello, {}", user.display_name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Caller's user id.
    pub id: UserId,
    /// Display name used in outgoing notifications.
    pub display_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let id = Uuid::parse_str(token.trim())
            .map_err(|_| AppError::unauthorized("Invalid authentication token"))?;

        let display_name = parts
            .headers
            .get("X-User-Name")
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| "A user".to_string(), ToString::to_string);

        Ok(Self {
            id: UserId(id),
            display_name,
        })
    }
}

/// JSON request body.
///
/// Axum's stock [`Json`] rejects a missing or malformed body with a
/// plain-text 422; every error this API emits is a 400-class status
/// with an `{"error": ...}` body, so body extraction goes through this
/// wrapper instead.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        Ok(Self(value))
    }
}

/// Correlation ID for request tracing.
///
/// Extracts the correlation ID from the `X-Correlation-ID` header,
/// or generates a new UUID v4 if not present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .headers
            .get("X-Correlation-ID")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn auth_user_from_bearer_token() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header("Authorization", format!("Bearer {id}"))
            .header("X-User-Name", "Ada Lovelace")
            .body(())
            .expect("valid request");

        let (mut parts, ()) = req.into_parts();
        let user = AuthUser::from_request_parts(&mut parts, &())
            .await
            .expect("should extract");

        assert_eq!(user.id.0, id);
        assert_eq!(user.display_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn auth_user_defaults_display_name() {
        let req = Request::builder()
            .header("Authorization", format!("Bearer {}", Uuid::new_v4()))
            .body(())
            .expect("valid request");

        let (mut parts, ()) = req.into_parts();
        let user = AuthUser::from_request_parts(&mut parts, &())
            .await
            .expect("should extract");

        assert_eq!(user.display_name, "A user");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let req = Request::builder().body(()).expect("valid request");

        let (mut parts, ()) = req.into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &())
            .await
            .expect_err("should reject");

        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_token_is_unauthorized() {
        let req = Request::builder()
            .header("Authorization", "Bearer not-a-uuid")
            .body(())
            .expect("valid request");

        let (mut parts, ()) = req.into_parts();
        let err = AuthUser::from_request_parts(&mut parts, &())
            .await
            .expect_err("should reject");

        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let req = Request::builder()
            .header("X-Correlation-ID", uuid.to_string())
            .body(())
            .expect("valid request");

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn correlation_id_generates_new() {
        let req = Request::builder().body(()).expect("valid request");

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("should extract");

        assert_ne!(correlation_id.0, Uuid::nil());
    }
}
