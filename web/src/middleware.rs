//! Axum middleware for request tracking.
//!
//! Every request gets a correlation ID: taken from the
//! `X-Correlation-ID` header when the client sends one, generated
//! otherwise. The ID is stored in request extensions, attached to the
//! request's tracing span and echoed back in the response header.

use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .route("/api/v1/bookings", post(create_booking))
///     .layer(correlation_id_layer());
/// ```
#[must_use]
pub fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn correlation_id_generated_if_missing() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        let correlation_id = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("correlation ID header should be present");
        assert!(Uuid::parse_str(correlation_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn correlation_id_preserved_from_request() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(correlation_id_layer());

        let uuid = Uuid::new_v4();
        let request = Request::builder()
            .uri("/test")
            .header(CORRELATION_ID_HEADER, uuid.to_string())
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        let echoed = response
            .headers()
            .get(CORRELATION_ID_HEADER)
            .expect("correlation ID header should be present");
        assert_eq!(echoed.to_str().unwrap(), uuid.to_string());
    }
}
