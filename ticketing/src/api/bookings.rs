//! Booking history API endpoints ("my tickets").
//!
//! - GET /api/holders/:holder/bookings?limit=N - A holder's bookings, newest first
//! - GET /api/bookings/:id - One booking
//!
//! Both span every event; each booking names its event.

use crate::manager::DEFAULT_BOOKINGS_LIMIT;
use crate::server::{ApiError, AppState};
use crate::types::{Booking, BookingId, HolderId};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    /// Maximum number of bookings (default 50)
    pub limit: Option<usize>,
}

/// List a holder's bookings, newest first.
pub async fn list_holder_bookings(
    State(state): State<AppState>,
    Path(holder): Path<String>,
    Query(query): Query<BookingsQuery>,
) -> Json<Vec<Booking>> {
    let limit = query.limit.unwrap_or(DEFAULT_BOOKINGS_LIMIT);
    Json(state.catalog.bookings_for(&HolderId::new(holder), limit))
}

/// Get one booking.
///
/// # Errors
///
/// Returns 404 if the booking does not exist.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    let booking_id = BookingId::from_uuid(id);
    state
        .catalog
        .booking(&booking_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Booking", booking_id))
}
