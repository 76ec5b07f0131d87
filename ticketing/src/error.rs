//! Error types for seat hold operations.

use crate::types::{BlockId, EventId, HoldId, SeatId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for seat hold operations.
pub type Result<T, E = SeatHoldError> = std::result::Result<T, E>;

/// Errors returned by the [`SeatHoldManager`](crate::manager::SeatHoldManager).
///
/// Expiry sweeping is housekeeping and never produces one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeatHoldError {
    /// At least one requested seat is held or sold; nothing was held.
    #[error("seats unavailable: {}", join_seats(.seats))]
    SeatUnavailable {
        /// Requested seats that could not be held
        seats: Vec<SeatId>,
    },

    /// The hold's window closed before the operation was evaluated.
    #[error("hold {hold_id} expired at {expired_at}")]
    HoldExpired {
        /// Expired hold
        hold_id: HoldId,
        /// When it expired
        expired_at: DateTime<Utc>,
    },

    /// The payment step was rejected; the seats stay held.
    #[error("payment failed for hold {hold_id}: {reason}")]
    PaymentFailed {
        /// Hold whose payment failed
        hold_id: HoldId,
        /// Gateway or validation reason
        reason: String,
    },

    /// No active record of this hold (never existed or already discarded).
    #[error("hold {hold_id} not found")]
    HoldNotFound {
        /// Requested hold
        hold_id: HoldId,
    },

    /// No active event with this id.
    #[error("event '{event}' not found")]
    UnknownEvent {
        /// Requested event
        event: EventId,
    },

    /// The venue has no such block.
    #[error("block '{block}' not found")]
    UnknownBlock {
        /// Requested block
        block: BlockId,
    },

    /// The block exists but has no such row/seat.
    #[error("seat {seat} does not exist")]
    UnknownSeat {
        /// Requested seat
        seat: SeatId,
    },

    /// A hold request named no seats.
    #[error("a hold must include at least one seat")]
    EmptyHoldRequest,

    /// A hold request exceeded the per-hold seat limit.
    #[error("cannot hold more than {max} seats at once (requested: {requested})")]
    TooManySeats {
        /// Distinct seats requested
        requested: usize,
        /// Configured limit
        max: usize,
    },

    /// The hold policy cannot produce a valid expiry (zero, negative, or past
    /// the end of the calendar). Nothing was held.
    #[error("hold window of {seconds}s cannot be applied")]
    InvalidHoldWindow {
        /// Configured hold duration
        seconds: i64,
    },

    /// A seat identifier could not be parsed.
    #[error(transparent)]
    InvalidSeatId(#[from] SeatIdParseError),
}

/// A seat identifier was not of the form `<block>-<row>-<number>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid seat id '{input}' (expected <block>-<row>-<number>, e.g. A-5-12)")]
pub struct SeatIdParseError {
    /// Offending input
    pub input: String,
}

fn join_seats(seats: &[SeatId]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
