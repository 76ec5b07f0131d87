//! Hold lifecycle API endpoints.
//!
//! - POST /api/events/:event/holds - Hold seats for a holder (all-or-nothing)
//! - GET /api/events/:event/holds/:id - Inspect an active hold
//! - POST /api/events/:event/holds/:id/finalize - Finalize with an external payment outcome
//! - POST /api/events/:event/holds/:id/checkout - Charge through the gateway, then finalize
//! - DELETE /api/events/:event/holds/:id - Release a hold
//!
//! A hold is only visible under the event it was taken for.
//!
//! # Hold Flow
//!
//! ```text
//! POST /holds ──▶ Held (15 min) ──checkout/finalize──▶ Booking
//!                   │
//!                   └── DELETE / expiry ──▶ seats Available again
//! ```

use crate::error::SeatHoldError;
use crate::manager::SeatHoldManager;
use crate::payment::{PaymentConfirmation, PaymentMethod, charge_hold};
use crate::server::{ApiError, AppState};
use crate::types::{Booking, EventId, Hold, HoldId, HolderId, SeatId};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to hold seats.
#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    /// Who is checking out (session or user id)
    pub holder: String,
    /// Seat ids such as `A-5-12`
    pub seats: Vec<String>,
}

/// Hold details with the time left to pay.
#[derive(Debug, Serialize)]
pub struct HoldResponse {
    /// The hold
    #[serde(flatten)]
    pub hold: Hold,
    /// Seconds until the hold expires
    pub expires_in_secs: i64,
}

/// Response after releasing a hold.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    /// Whether an active hold was released
    pub released: bool,
}

// ============================================================================
// Handlers
// ============================================================================

fn hold_response(manager: &SeatHoldManager, hold: Hold) -> HoldResponse {
    let expires_in_secs = hold.remaining_at(manager.now()).num_seconds();
    HoldResponse {
        hold,
        expires_in_secs,
    }
}

/// Hold seats.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/india-vs-australia/holds \
///   -H "Content-Type: application/json" \
///   -d '{"holder": "fan-42", "seats": ["A-1-1", "A-1-2"]}'
/// ```
///
/// # Errors
///
/// - 409 if any seat is held or sold
/// - 404 for an unknown event or block
/// - 422 for malformed seat ids, unknown seats, or requests outside the policy
pub async fn create_hold(
    State(state): State<AppState>,
    Path(event): Path<String>,
    payload: Result<Json<CreateHoldRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HoldResponse>), ApiError> {
    let Json(request) = payload?;

    if request.holder.trim().is_empty() {
        return Err(ApiError::validation("holder must not be empty"));
    }

    let seats = request
        .seats
        .iter()
        .map(|seat| seat.parse::<SeatId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(SeatHoldError::from)?;

    let manager = state.catalog.manager(&EventId::new(event))?;
    let hold = manager.request_hold(seats, HolderId::new(request.holder))?;

    Ok((StatusCode::CREATED, Json(hold_response(&manager, hold))))
}

/// Get an active hold.
///
/// # Errors
///
/// - 404 if the event or hold is unknown, or the hold is already finalized/released
/// - 410 if the hold has expired
pub async fn get_hold(
    State(state): State<AppState>,
    Path((event, id)): Path<(String, Uuid)>,
) -> Result<Json<HoldResponse>, ApiError> {
    let manager = state.catalog.manager(&EventId::new(event))?;
    let hold = manager.active_hold(HoldId::from_uuid(id))?;
    Ok(Json(hold_response(&manager, hold)))
}

/// Finalize a hold with the outcome of an external payment.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/india-vs-australia/holds/<id>/finalize \
///   -H "Content-Type: application/json" \
///   -d '{"status": "approved", "transaction_id": "txn_1", "amount": 200000}'
/// ```
///
/// # Errors
///
/// - 404 if the event or hold is unknown
/// - 410 if the hold expired (its seats are released)
/// - 402 if the payment was declined or the amount differs (seats stay held)
pub async fn finalize_hold(
    State(state): State<AppState>,
    Path((event, id)): Path<(String, Uuid)>,
    payload: Result<Json<PaymentConfirmation>, JsonRejection>,
) -> Result<Json<Booking>, ApiError> {
    let Json(confirmation) = payload?;
    let manager = state.catalog.manager(&EventId::new(event))?;
    let booking = manager.finalize(HoldId::from_uuid(id), &confirmation)?;
    Ok(Json(booking))
}

/// Charge the hold total through the payment gateway, then finalize.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/india-vs-australia/holds/<id>/checkout \
///   -H "Content-Type: application/json" \
///   -d '{"type": "upi", "vpa": "fan@okbank"}'
/// ```
///
/// # Errors
///
/// Same as [`finalize_hold`]; the gateway is not called for unknown or
/// expired holds. If the hold expires while the charge is in flight the
/// 410 message carries the captured transaction id so it can be refunded.
pub async fn checkout_hold(
    State(state): State<AppState>,
    Path((event, id)): Path<(String, Uuid)>,
    payload: Result<Json<PaymentMethod>, JsonRejection>,
) -> Result<Json<Booking>, ApiError> {
    let Json(method) = payload?;
    let manager = state.catalog.manager(&EventId::new(event))?;
    let hold = manager.active_hold(HoldId::from_uuid(id))?;

    let confirmation = charge_hold(state.payment_gateway.as_ref(), &hold, method).await;
    match manager.finalize(hold.id, &confirmation) {
        Ok(booking) => Ok(Json(booking)),
        Err(error @ SeatHoldError::HoldExpired { .. }) => {
            let Some(transaction_id) = confirmation.transaction_id() else {
                return Err(error.into());
            };
            tracing::warn!(
                hold_id = %hold.id,
                event = %hold.event,
                holder = %hold.holder,
                amount = %hold.total,
                transaction_id = %transaction_id,
                "Payment captured after hold expired; refund required"
            );
            Err(ApiError::new(
                StatusCode::GONE,
                "HOLD_EXPIRED",
                format!("{error}; payment {transaction_id} was captured and must be refunded"),
            ))
        }
        Err(error) => Err(error.into()),
    }
}

/// Release a hold. Idempotent.
///
/// # Errors
///
/// Returns 404 if the event is unknown or inactive.
pub async fn release_hold(
    State(state): State<AppState>,
    Path((event, id)): Path<(String, Uuid)>,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let manager = state.catalog.manager(&EventId::new(event))?;
    Ok(Json(ReleaseResponse {
        released: manager.release(HoldId::from_uuid(id)),
    }))
}
