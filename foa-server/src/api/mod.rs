//! HTTP API
//!
//! Each resource module exposes `router()`; [`build_app`] merges them and
//! adds the tower-http stack plus JWT authentication.
//!
//! - [`health`] - liveness
//! - [`auth`] - sign-up, logins, session, password
//! - [`foods`], [`categories`], [`toppings`], [`locations`] - catalog
//! - [`staff`], [`customers`] - people management
//! - [`cart`], [`checkout`], [`me`] - customer self-service
//! - [`orders`], [`messages`], [`analytics`], [`exports`] - dashboard
//! - [`upload`] - images
//! - [`payments`] - provider webhooks

pub mod analytics;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod customers;
pub mod exports;
pub mod foods;
pub mod health;
pub mod live;
pub mod locations;
pub mod me;
pub mod messages;
pub mod orders;
pub mod payments;
pub mod staff;
pub mod toppings;
pub mod upload;

use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Multipart framing on top of the image limit
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Access log line per request
async fn log_request(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    tracing::info!(
        target: "http_access",
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        "request"
    );
    response
}

/// Requests running past the deadline answer 408
fn timeout_layer(timeout_ms: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_millis(timeout_ms))
}

/// All routes; `state` is only used by the rate-limit layers
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(foods::router())
        .merge(categories::router())
        .merge(toppings::router())
        .merge(locations::router())
        .merge(staff::router())
        .merge(customers::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(me::router())
        .merge(orders::router())
        .merge(messages::router())
        .merge(analytics::router())
        .merge(exports::router())
        .merge(upload::router())
        .merge(payments::router())
}

/// Fully configured application, used by the listener and by tests
pub fn build_app(state: &ServerState) -> Router {
    let body_limit = state.config.max_upload_bytes + UPLOAD_OVERHEAD_BYTES;
    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        // JWT authentication; public routes are skipped inside
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone())
        .layer(timeout_layer(state.config.request_timeout_ms))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn slow_requests_time_out_with_408() {
        let app: Router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(timeout_layer(50));

        let slow = app
            .clone()
            .oneshot(http::Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(slow.status(), StatusCode::REQUEST_TIMEOUT);

        let fast = app
            .oneshot(http::Request::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(fast.status(), StatusCode::OK);
    }
}
