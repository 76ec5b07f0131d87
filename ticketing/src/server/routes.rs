//! Router configuration for the ticketing system.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{analytics, availability, bookings, events, holds, metrics};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures all routes including:
/// - Health checks
/// - Event catalogue
/// - Seat availability and seat maps
/// - Hold lifecycle (create, inspect, checkout/finalize, release)
/// - Booking history
/// - Analytics and Prometheus metrics
pub fn build_router(state: AppState) -> Router {
    // API routes
    let api_routes = Router::new()
        // Event catalogue
        .route("/events", get(events::list_events))
        .route("/events/:event", get(events::get_event))
        // Availability queries
        .route("/events/:event/blocks", get(availability::list_blocks))
        .route(
            "/events/:event/blocks/:block/availability",
            get(availability::get_block_availability),
        )
        .route(
            "/events/:event/blocks/:block/seats",
            get(availability::get_seat_map),
        )
        // Hold lifecycle
        .route("/events/:event/holds", post(holds::create_hold))
        .route(
            "/events/:event/holds/:id",
            get(holds::get_hold).delete(holds::release_hold),
        )
        .route(
            "/events/:event/holds/:id/finalize",
            post(holds::finalize_hold),
        )
        .route(
            "/events/:event/holds/:id/checkout",
            post(holds::checkout_hold),
        )
        // Analytics
        .route("/events/:event/analytics", get(analytics::get_sales_summary))
        // Booking history across events
        .route(
            "/holders/:holder/bookings",
            get(bookings::list_holder_bookings),
        )
        .route("/bookings/:id", get(bookings::get_booking));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics::render_metrics))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
