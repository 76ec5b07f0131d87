//! Per-block seat table.
//!
//! A [`BlockInventory`] is the unit of mutual exclusion: the manager wraps
//! each one in its own mutex, and every status transition of a seat happens
//! while holding its block's lock.
//!
//! Seat state is stored with the hold's expiry, so a reader can tell at any
//! instant whether a `Held` slot is still held or logically available again.

use crate::types::{Availability, BlockId, BookingId, HoldId, Money, SeatId, SeatStatus, SeatView};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Stored state of one seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeatState {
    Available,
    Held {
        hold_id: HoldId,
        expires_at: DateTime<Utc>,
    },
    Sold {
        booking_id: BookingId,
    },
}

impl SeatState {
    /// Status as observed at `now`; an expired hold reads as available.
    pub(crate) fn status_at(&self, now: DateTime<Utc>) -> SeatStatus {
        match self {
            Self::Available => SeatStatus::Available,
            Self::Held { expires_at, .. } if now >= *expires_at => SeatStatus::Available,
            Self::Held { .. } => SeatStatus::Held,
            Self::Sold { .. } => SeatStatus::Sold,
        }
    }

    fn is_held_by(&self, hold: HoldId) -> bool {
        matches!(self, Self::Held { hold_id, .. } if *hold_id == hold)
    }
}

/// One seat: its price and state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SeatSlot {
    pub(crate) price: Money,
    pub(crate) state: SeatState,
}

/// All seats of one block, keyed by `(row, number)` in row-major order.
#[derive(Clone, Debug)]
pub struct BlockInventory {
    id: BlockId,
    seats: BTreeMap<(u32, u32), SeatSlot>,
}

impl BlockInventory {
    /// Creates a rectangular block of `rows` × `seats_per_row` seats, all
    /// available at `price`.
    #[must_use]
    pub fn new(id: BlockId, rows: u32, seats_per_row: u32, price: Money) -> Self {
        let seats = (1..=rows)
            .flat_map(|row| (1..=seats_per_row).map(move |number| (row, number)))
            .map(|key| {
                (
                    key,
                    SeatSlot {
                        price,
                        state: SeatState::Available,
                    },
                )
            })
            .collect();

        Self { id, seats }
    }

    /// Block identifier
    #[must_use]
    pub const fn id(&self) -> &BlockId {
        &self.id
    }

    /// Number of seats in the block
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // rows and seats per row are u32
    pub fn capacity(&self) -> u32 {
        self.seats.len() as u32
    }

    pub(crate) fn slot(&self, seat: &SeatId) -> Option<&SeatSlot> {
        if seat.block != self.id {
            return None;
        }
        self.seats.get(&(seat.row, seat.number))
    }

    fn slot_mut(&mut self, seat: &SeatId) -> Option<&mut SeatSlot> {
        if seat.block != self.id {
            return None;
        }
        self.seats.get_mut(&(seat.row, seat.number))
    }

    /// Status of `seat` at `now`, or `None` if the seat is not in this block.
    #[must_use]
    pub fn status_at(&self, seat: &SeatId, now: DateTime<Utc>) -> Option<SeatStatus> {
        self.slot(seat).map(|slot| slot.state.status_at(now))
    }

    /// Seat counts at `now`.
    #[must_use]
    pub fn availability_at(&self, now: DateTime<Utc>) -> Availability {
        let mut counts = Availability {
            block: self.id.clone(),
            capacity: self.capacity(),
            available: 0,
            held: 0,
            sold: 0,
        };

        for slot in self.seats.values() {
            match slot.state.status_at(now) {
                SeatStatus::Available => counts.available += 1,
                SeatStatus::Held => counts.held += 1,
                SeatStatus::Sold => counts.sold += 1,
            }
        }

        counts
    }

    /// Per-seat snapshot at `now`, row-major.
    #[must_use]
    pub fn seat_views_at(&self, now: DateTime<Utc>) -> Vec<SeatView> {
        self.seats
            .iter()
            .map(|(&(row, number), slot)| SeatView {
                seat: SeatId {
                    block: self.id.clone(),
                    row,
                    number,
                },
                status: slot.state.status_at(now),
                price: slot.price,
            })
            .collect()
    }

    /// Sum of the unit prices of every sold seat.
    #[must_use]
    pub fn sold_revenue(&self) -> Money {
        self.seats
            .values()
            .filter(|slot| matches!(slot.state, SeatState::Sold { .. }))
            .map(|slot| slot.price)
            .sum()
    }

    /// Mark `seat` held. Callers validate availability first.
    pub(crate) fn hold_seat(&mut self, seat: &SeatId, hold_id: HoldId, expires_at: DateTime<Utc>) {
        if let Some(slot) = self.slot_mut(seat) {
            slot.state = SeatState::Held {
                hold_id,
                expires_at,
            };
        }
    }

    /// Return `seat` to available if, and only if, `hold_id` still owns it.
    pub(crate) fn release_seat(&mut self, seat: &SeatId, hold_id: HoldId) -> bool {
        match self.slot_mut(seat) {
            Some(slot) if slot.state.is_held_by(hold_id) => {
                slot.state = SeatState::Available;
                true
            }
            _ => false,
        }
    }

    /// Mark `seat` sold if, and only if, `hold_id` still owns it.
    pub(crate) fn sell_seat(&mut self, seat: &SeatId, hold_id: HoldId, booking_id: BookingId) -> bool {
        match self.slot_mut(seat) {
            Some(slot) if slot.state.is_held_by(hold_id) => {
                slot.state = SeatState::Sold { booking_id };
                true
            }
            _ => false,
        }
    }
}
