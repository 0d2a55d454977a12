//! HTTP API server with observability for the booking engine.
//!
//! Provides REST endpoints for the booking lifecycle, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use booking_store::{
    BookingRepository, IdentityStore, InMemoryBookingRepository, InMemoryCatalog, ItemStore,
};
use domain::BookingEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::bookings::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/bookings",
            post(routes::bookings::create).get(routes::bookings::list_for_booker),
        )
        .route("/bookings/owner", get(routes::bookings::list_for_owner))
        .route(
            "/bookings/{id}",
            get(routes::bookings::get).patch(routes::bookings::set_approval),
        )
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel))
        .route("/items/{id}/schedule", get(routes::bookings::item_schedule))
        .route(
            "/items/{id}/comment-eligibility",
            get(routes::bookings::comment_eligibility),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over the given stores.
pub fn create_default_state(
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn IdentityStore>,
    items: Arc<dyn ItemStore>,
) -> Arc<AppState> {
    Arc::new(AppState {
        engine: BookingEngine::new(bookings, users, items),
    })
}

/// Creates application state backed by in-memory stores, with `catalog`
/// serving both users and items.
pub fn in_memory_state(catalog: InMemoryCatalog) -> Arc<AppState> {
    create_default_state(
        Arc::new(InMemoryBookingRepository::new()),
        Arc::new(catalog.clone()),
        Arc::new(catalog),
    )
}
