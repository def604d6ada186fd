//! Vendor Hub dashboard library.
//!
//! The JSON API behind the vendor dashboard: store setup, product catalog,
//! order lifecycle and self-delivery queues, coupons, reviews,
//! notifications and reports. Business data lives in the managed backend
//! (see [`backend`]); the dashboard's own `PostgreSQL` only holds sessions
//! and vendor preferences.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod geocoding;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the application router with request tracing, request IDs and
/// Sentry layers. The session layer is added by the caller so tests can use
/// an in-memory store.
pub fn build_router(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
