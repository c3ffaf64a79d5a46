//! HTTP route handlers.
//!
//! Health routes are never cached. Every response carries the privacy and
//! security headers the dashboard backend is required to send.

mod health;

use axum::{
    http::{
        header::{CACHE_CONTROL, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
        HeaderName, HeaderValue,
    },
    middleware,
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::{handle_panic, AppError};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Cache-Control for probe responses
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");
const DATA_CLASSIFICATION: HeaderName = HeaderName::from_static("x-data-classification");
const XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");
const PRIVACY_POLICY: HeaderName = HeaderName::from_static("x-privacy-policy");

/// Creates the Axum router with all routes and response headers.
pub fn create_router(state: AppState) -> Router {
    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new()
        .route("/api/health", get(health::health))
        .route("/health", get(health::health))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ));

    Router::new()
        .merge(health_routes)
        .fallback(|| async { AppError::RouteNotFound })
        .with_state(state)
        // Panics become a JSON 500 and still pass through the header layers below
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PERMISSIONS_POLICY,
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            DATA_CLASSIFICATION,
            HeaderValue::from_static("sensitive"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRIVACY_POLICY,
            HeaderValue::from_static("/privacy"),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
