//! Event catalogue API endpoints.
//!
//! - GET /api/events - Active events, soonest first, with seats left
//! - GET /api/events/:event - One event with per-block seat counts

use crate::catalog::EventSummary;
use crate::server::{ApiError, AppState};
use crate::types::{Availability, Event, EventId};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

/// An event with the seat counts of every block.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    /// The event
    #[serde(flatten)]
    pub event: Event,
    /// Seat counts in layout order
    pub blocks: Vec<Availability>,
}

/// List active events.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/events
/// # [{"id":"india-vs-australia","name":"India vs Australia",...,"capacity":580,"available":580}]
/// ```
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<EventSummary>> {
    Json(state.catalog.summaries())
}

/// Get one active event.
///
/// # Errors
///
/// Returns 404 if the event is unknown or inactive.
pub async fn get_event(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> Result<Json<EventDetail>, ApiError> {
    let id = EventId::new(event);
    let event = state.catalog.event(&id)?;
    let blocks = state.catalog.manager(&id)?.venue_availability();
    Ok(Json(EventDetail { event, blocks }))
}
