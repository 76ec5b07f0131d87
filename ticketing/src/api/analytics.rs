//! Analytics API endpoints.
//!
//! - GET /api/events/:event/analytics - Sales summary for the dashboard cards

use crate::analytics::SalesSummary;
use crate::server::{ApiError, AppState};
use crate::types::EventId;
use axum::{
    Json,
    extract::{Path, State},
};

/// Get the current sales summary of an event.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/events/india-vs-australia/analytics
/// # {"capacity":580,"sold":12,"revenue":1200000,"average_ticket_price":100000,...}
/// ```
///
/// # Errors
///
/// Returns 404 if the event is unknown or inactive.
pub async fn get_sales_summary(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> Result<Json<SalesSummary>, ApiError> {
    let manager = state.catalog.manager(&EventId::new(event))?;
    Ok(Json(manager.sales_summary()))
}
