//! Domain types for the seat hold engine.
//!
//! Value objects (identifiers, money), the hold and booking records handed
//! back to callers, and the read-side snapshots consumed by the seat map and
//! analytics cards.

use crate::error::SeatIdParseError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// URL-safe slug naming an event, e.g. `india-vs-australia`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an `EventId` from its slug
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Get the slug
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a seating block (venue section), e.g. `A`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Creates a `BlockId` from its name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the block name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one physical seat: block, row and seat number (both 1-based).
///
/// The textual form is `<block>-<row>-<number>`, e.g. `A-5-12`, which is what
/// the seat map posts back. Ordering is by block, then row, then number; the
/// manager relies on it for a deterministic lock order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    /// Block the seat belongs to
    pub block: BlockId,
    /// Row within the block (1-based)
    pub row: u32,
    /// Seat number within the row (1-based)
    pub number: u32,
}

impl SeatId {
    /// Creates a `SeatId`
    #[must_use]
    pub fn new(block: impl Into<String>, row: u32, number: u32) -> Self {
        Self {
            block: BlockId::new(block),
            row,
            number,
        }
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.block, self.row, self.number)
    }
}

impl FromStr for SeatId {
    type Err = SeatIdParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || SeatIdParseError {
            input: input.to_string(),
        };

        // Split from the right so block names may themselves contain dashes.
        let mut parts = input.trim().rsplitn(3, '-');
        let number = parts.next().and_then(|s| s.parse::<u32>().ok());
        let row = parts.next().and_then(|s| s.parse::<u32>().ok());
        let block = parts.next().filter(|s| !s.is_empty());

        match (block, row, number) {
            (Some(block), Some(row), Some(number)) if row > 0 && number > 0 => {
                Ok(Self::new(block, row, number))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for SeatId {
    type Error = SeatIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

/// Unique identifier for a hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldId(Uuid);

impl HoldId {
    /// Creates a new random `HoldId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `HoldId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for HoldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whoever is checking out: a logged-in user or an anonymous session key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    /// Creates a `HolderId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Money Value Object (paise-based to avoid floating point errors)
// ============================================================================

/// Represents rupees as a whole number of paise
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero rupees
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from paise
    #[must_use]
    pub const fn from_paise(paise: u64) -> Self {
        Self(paise)
    }

    /// Creates a `Money` value from whole rupees
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (rupees * 100 > `u64::MAX`).
    /// Use `checked_from_rupees` for non-panicking conversion.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn from_rupees(rupees: u64) -> Self {
        match Self::checked_from_rupees(rupees) {
            Some(money) => money,
            None => panic!("Money::from_rupees overflow"),
        }
    }

    /// Creates a `Money` value from whole rupees with overflow checking
    #[must_use]
    pub const fn checked_from_rupees(rupees: u64) -> Option<Self> {
        match rupees.checked_mul(100) {
            Some(paise) => Some(Self(paise)),
            None => None,
        }
    }

    /// Returns the amount in paise
    #[must_use]
    pub const fn paise(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole rupees (rounded down)
    #[must_use]
    pub const fn rupees(&self) -> u64 {
        self.0 / 100
    }

    /// Adds two money amounts, clamping at the maximum representable value
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Divides evenly across `count` items (rounded down); zero when `count` is zero
    #[must_use]
    pub const fn split(self, count: u64) -> Self {
        match self.0.checked_div(count) {
            Some(share) => Self(share),
            None => Self::ZERO,
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}.{:02}", self.rupees(), self.0 % 100)
    }
}

// ============================================================================
// Events
// ============================================================================

/// A match on sale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event slug
    pub id: EventId,
    /// Display name, e.g. `India vs Australia`
    pub name: String,
    /// Scheduled start
    pub starts_at: DateTime<Utc>,
    /// Venue name
    pub stadium: String,
    /// Price of a seat in blocks without their own price
    pub ticket_price: Money,
    /// Inactive events are hidden and cannot be booked
    pub is_active: bool,
}

// ============================================================================
// Seat status
// ============================================================================

/// Externally visible status of a seat.
///
/// A seat whose hold has expired reports `Available` even before a sweep
/// has physically reclaimed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Free to be held
    Available,
    /// Claimed by an unexpired hold
    Held,
    /// Paid for; terminal
    Sold,
}

// ============================================================================
// Holds and bookings
// ============================================================================

/// Limits applied to every hold request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldPolicy {
    /// How long a hold stays valid after creation
    pub hold_duration: Duration,
    /// Largest number of seats a single hold may claim
    pub max_seats_per_hold: usize,
}

impl HoldPolicy {
    /// Creates a `HoldPolicy`
    #[must_use]
    pub const fn new(hold_duration: Duration, max_seats_per_hold: usize) -> Self {
        Self {
            hold_duration,
            max_seats_per_hold,
        }
    }
}

impl Default for HoldPolicy {
    /// Fifteen minutes, up to ten seats (a family booking).
    fn default() -> Self {
        Self::new(Duration::minutes(15), 10)
    }
}

/// A temporary, exclusive claim on one or more seats during checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Hold identifier
    pub id: HoldId,
    /// Event the seats belong to
    pub event: EventId,
    /// Who placed the hold
    pub holder: HolderId,
    /// Held seats, sorted
    pub seats: Vec<SeatId>,
    /// Sum of the held seats' unit prices
    pub total: Money,
    /// When the hold was granted
    pub created_at: DateTime<Utc>,
    /// First instant at which the hold is no longer valid
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    /// Whether the hold is expired at `now` (expiry is exclusive: a hold is
    /// only valid strictly before `expires_at`).
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Blocks touched by this hold, in lock order
    #[must_use]
    pub fn blocks(&self) -> BTreeSet<BlockId> {
        self.seats.iter().map(|seat| seat.block.clone()).collect()
    }
}

/// A finalized, paid reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub id: BookingId,
    /// Hold this booking was finalized from
    pub hold_id: HoldId,
    /// Event the seats belong to
    pub event: EventId,
    /// Who paid
    pub holder: HolderId,
    /// Sold seats, sorted
    pub seats: Vec<SeatId>,
    /// Amount charged
    pub total: Money,
    /// When payment was accepted
    pub finalized_at: DateTime<Utc>,
    /// Payment gateway transaction reference
    pub transaction_id: String,
}

// ============================================================================
// Read-side snapshots
// ============================================================================

/// Seat counts for one block at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Block the counts belong to
    pub block: BlockId,
    /// Total number of seats
    pub capacity: u32,
    /// Seats free to hold (includes seats whose hold has expired)
    pub available: u32,
    /// Seats under an unexpired hold
    pub held: u32,
    /// Seats sold
    pub sold: u32,
}

/// One seat as drawn on the seat map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    /// Seat identifier
    pub seat: SeatId,
    /// Status at the time of the snapshot
    pub status: SeatStatus,
    /// Unit price
    pub price: Money,
}
