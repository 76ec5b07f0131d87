//! Seat availability API endpoints.
//!
//! - GET /api/events/:event/blocks - Seat counts for every block
//! - GET /api/events/:event/blocks/:block/availability - Seat counts for one block
//! - GET /api/events/:event/blocks/:block/seats - Seat map with per-seat status and price
//!
//! Seats under an expired hold are reported as available.

use crate::server::{ApiError, AppState};
use crate::types::{Availability, BlockId, EventId, SeatView};
use axum::{
    Json,
    extract::{Path, State},
};

/// Get seat counts for every block of an event, in layout order.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/events/india-vs-australia/blocks
/// # [{"block":"A","capacity":200,"available":198,"held":2,"sold":0}, ...]
/// ```
///
/// # Errors
///
/// Returns 404 if the event is unknown or inactive.
pub async fn list_blocks(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> Result<Json<Vec<Availability>>, ApiError> {
    let manager = state.catalog.manager(&EventId::new(event))?;
    Ok(Json(manager.venue_availability()))
}

/// Get seat counts for one block.
///
/// # Errors
///
/// Returns 404 if the event or block does not exist.
pub async fn get_block_availability(
    State(state): State<AppState>,
    Path((event, block)): Path<(String, String)>,
) -> Result<Json<Availability>, ApiError> {
    let manager = state.catalog.manager(&EventId::new(event))?;
    let availability = manager.availability(&BlockId::new(block))?;
    Ok(Json(availability))
}

/// Get the seat map of one block, row-major.
///
/// # Errors
///
/// Returns 404 if the event or block does not exist.
pub async fn get_seat_map(
    State(state): State<AppState>,
    Path((event, block)): Path<(String, String)>,
) -> Result<Json<Vec<SeatView>>, ApiError> {
    let manager = state.catalog.manager(&EventId::new(event))?;
    let seats = manager.seat_map(&BlockId::new(block))?;
    Ok(Json(seats))
}
