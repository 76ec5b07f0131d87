//! Seat Hold Manager: the single source of truth for seat status.
//!
//! Manages exclusive, time-bounded holds on seats during checkout. This is the
//! part of the system that has to be right under concurrency (the "last seat"
//! problem): two checkouts racing for the same seat must never both win.
//!
//! **Concurrency Strategy**: pessimistic locking per block.
//!
//! - Every block's seat table sits behind its own mutex. A status change of a
//!   seat only happens while its block is locked.
//! - Operations touching several blocks lock them in ascending [`BlockId`]
//!   order before looking at any seat, so the all-or-nothing check and the
//!   mutation see the same state.
//! - The hold registry and booking ledger have their own locks, always taken
//!   *after* block locks. Global order: blocks (ascending) → holds → bookings.
//! - The evaluation time of every mutating operation is read from the clock
//!   after the block locks are held. Finalize, release and the sweeper are
//!   therefore serialised per hold: exactly one of them observes the hold.
//!
//! **Expiry**: lazy. A `Held` seat whose hold has passed its expiry reads as
//! `Available` everywhere, and can be held again before any sweep runs.
//! [`SeatHoldManager::sweep_expired`] only reclaims the stale records.
//!
//! ```text
//! Available ──request_hold──▶ Held ──finalize──▶ Sold
//!     ▲                        │
//!     └──── release / expiry ──┘
//! ```

use crate::error::{Result, SeatHoldError};
use crate::inventory::BlockInventory;
use crate::layout::{LayoutError, VenueLayout};
use crate::metrics;
use crate::payment::PaymentConfirmation;
use crate::types::{
    Availability, BlockId, Booking, BookingId, EventId, Hold, HoldId, HoldPolicy, HolderId, Money,
    SeatId, SeatStatus, SeatView,
};
use chrono::{DateTime, Duration, Utc};
use govvens_core::environment::Clock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Default number of bookings returned by [`SeatHoldManager::bookings_for`]
/// when the caller does not choose.
pub const DEFAULT_BOOKINGS_LIMIT: usize = 50;

type BlockGuards<'a> = BTreeMap<BlockId, MutexGuard<'a, BlockInventory>>;

/// Finalized bookings, in the order they were made.
#[derive(Debug, Default)]
struct BookingLedger {
    bookings: Vec<Booking>,
    by_id: HashMap<BookingId, usize>,
}

impl BookingLedger {
    fn record(&mut self, booking: Booking) {
        self.by_id.insert(booking.id, self.bookings.len());
        self.bookings.push(booking);
    }

    fn get(&self, id: &BookingId) -> Option<&Booking> {
        self.by_id.get(id).and_then(|&index| self.bookings.get(index))
    }
}

/// Owns seat availability for one event.
///
/// Share it between request handlers as `Arc<SeatHoldManager>`; every method
/// takes `&self`. The [`EventCatalog`](crate::catalog::EventCatalog) keeps one
/// manager per event.
pub struct SeatHoldManager {
    /// Event whose seats this manager sells
    event: EventId,
    /// Seat tables, one mutex per block
    blocks: BTreeMap<BlockId, Mutex<BlockInventory>>,
    /// Blocks in layout order, for venue-wide snapshots
    block_order: Vec<BlockId>,
    /// Registered holds; expired ones linger until swept or touched
    holds: Mutex<HashMap<HoldId, Hold>>,
    /// Finalized bookings
    bookings: RwLock<BookingLedger>,
    policy: HoldPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SeatHoldManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatHoldManager")
            .field("event", &self.event)
            .field("blocks", &self.block_order)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SeatHoldManager {
    /// Creates a manager over pre-built block inventories.
    ///
    /// Blocks keep the order given here for venue-wide snapshots. A block id
    /// appearing twice keeps the last inventory.
    #[must_use]
    pub fn new(
        event: EventId,
        blocks: Vec<BlockInventory>,
        policy: HoldPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut block_order = Vec::with_capacity(blocks.len());
        let mut table = BTreeMap::new();
        for block in blocks {
            let id = block.id().clone();
            if table.insert(id.clone(), Mutex::new(block)).is_none() {
                block_order.push(id);
            }
        }

        Self {
            event,
            blocks: table,
            block_order,
            holds: Mutex::new(HashMap::new()),
            bookings: RwLock::new(BookingLedger::default()),
            policy,
            clock,
        }
    }

    /// Creates a manager for a venue layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the layout is invalid.
    pub fn from_layout(
        event: EventId,
        layout: &VenueLayout,
        default_price: Money,
        policy: HoldPolicy,
        clock: Arc<dyn Clock>,
    ) -> std::result::Result<Self, LayoutError> {
        Ok(Self::new(event, layout.build(default_price)?, policy, clock))
    }

    /// Event whose seats this manager sells
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event
    }

    /// The hold policy in force
    #[must_use]
    pub const fn policy(&self) -> &HoldPolicy {
        &self.policy
    }

    /// Current time according to the injected clock
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Block identifiers in layout order
    #[must_use]
    pub fn block_ids(&self) -> &[BlockId] {
        &self.block_order
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Atomically hold every seat in `seats` for `holder`.
    ///
    /// All-or-nothing: if any seat is held (by an unexpired hold) or sold,
    /// nothing is held and [`SeatHoldError::SeatUnavailable`] lists the
    /// offending seats. Seats whose previous hold has expired count as
    /// available. Duplicate ids are collapsed.
    ///
    /// # Errors
    ///
    /// - [`SeatHoldError::EmptyHoldRequest`] / [`SeatHoldError::TooManySeats`]
    ///   for requests outside the policy
    /// - [`SeatHoldError::UnknownBlock`] / [`SeatHoldError::UnknownSeat`] for
    ///   seats not in the venue
    /// - [`SeatHoldError::SeatUnavailable`] if any seat is taken
    /// - [`SeatHoldError::InvalidHoldWindow`] if the policy's hold duration
    ///   does not yield an expiry after now
    pub fn request_hold<I>(&self, seats: I, holder: HolderId) -> Result<Hold>
    where
        I: IntoIterator<Item = SeatId>,
    {
        let seats: BTreeSet<SeatId> = seats.into_iter().collect();
        if seats.is_empty() {
            return Err(SeatHoldError::EmptyHoldRequest);
        }
        if seats.len() > self.policy.max_seats_per_hold {
            return Err(SeatHoldError::TooManySeats {
                requested: seats.len(),
                max: self.policy.max_seats_per_hold,
            });
        }

        let block_ids: BTreeSet<BlockId> = seats.iter().map(|seat| seat.block.clone()).collect();
        let mut guards = self.lock_blocks(&block_ids)?;
        let now = self.clock.now();
        let expires_at = self.expiry_from(now)?;

        let mut unavailable = Vec::new();
        let mut total = Money::ZERO;
        for seat in &seats {
            let slot = guards
                .get(&seat.block)
                .and_then(|block| block.slot(seat))
                .ok_or_else(|| SeatHoldError::UnknownSeat { seat: seat.clone() })?;

            if slot.state.status_at(now) == SeatStatus::Available {
                total = total.saturating_add(slot.price);
            } else {
                unavailable.push(seat.clone());
            }
        }

        if !unavailable.is_empty() {
            metrics::record_hold_rejected();
            info!(
                event = %self.event,
                holder = %holder,
                requested = seats.len(),
                unavailable = ?unavailable.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "Hold rejected: seats unavailable"
            );
            return Err(SeatHoldError::SeatUnavailable { seats: unavailable });
        }

        let hold = Hold {
            id: HoldId::new(),
            event: self.event.clone(),
            holder,
            seats: seats.into_iter().collect(),
            total,
            created_at: now,
            expires_at,
        };

        for seat in &hold.seats {
            if let Some(block) = guards.get_mut(&seat.block) {
                block.hold_seat(seat, hold.id, hold.expires_at);
            }
        }
        self.lock_holds().insert(hold.id, hold.clone());
        drop(guards);

        metrics::record_hold_created(hold.seats.len());
        info!(
            hold_id = %hold.id,
            event = %hold.event,
            holder = %hold.holder,
            seats = hold.seats.len(),
            total = %hold.total,
            expires_at = %hold.expires_at,
            "Seats held"
        );

        Ok(hold)
    }

    /// Convert a hold into a booking using the outcome of the payment step.
    ///
    /// The hold wins only if it is evaluated strictly before its expiry. An
    /// expired hold is discarded and its seats return to the pool. A failed
    /// payment leaves the seats held so the customer can retry within the
    /// window.
    ///
    /// # Errors
    ///
    /// - [`SeatHoldError::HoldNotFound`] if the hold is unknown or discarded
    /// - [`SeatHoldError::HoldExpired`] if the evaluation time is at or after expiry
    /// - [`SeatHoldError::PaymentFailed`] if the payment was declined or the
    ///   approved amount differs from the hold total
    pub fn finalize(&self, hold_id: HoldId, payment: &PaymentConfirmation) -> Result<Booking> {
        let block_ids = self
            .hold_blocks(hold_id)
            .ok_or(SeatHoldError::HoldNotFound { hold_id })?;
        let mut guards = self.lock_blocks(&block_ids)?;
        let now = self.clock.now();

        let mut holds = self.lock_holds();
        let (expires_at, total) = holds
            .get(&hold_id)
            .map(|hold| (hold.expires_at, hold.total))
            .ok_or(SeatHoldError::HoldNotFound { hold_id })?;

        if now >= expires_at {
            let expired = holds.remove(&hold_id);
            drop(holds);
            if let Some(hold) = expired {
                Self::return_seats(&mut guards, &hold);
                metrics::record_hold_expired();
            }
            info!(%hold_id, %expires_at, "Finalize rejected: hold expired");
            return Err(SeatHoldError::HoldExpired {
                hold_id,
                expired_at: expires_at,
            });
        }

        let transaction_id = match payment.settle(total) {
            Ok(transaction_id) => transaction_id.to_string(),
            Err(reason) => {
                metrics::record_payment_failed();
                warn!(%hold_id, reason = %reason, "Finalize rejected: payment failed; seats stay held");
                return Err(SeatHoldError::PaymentFailed { hold_id, reason });
            }
        };

        let hold = holds
            .remove(&hold_id)
            .ok_or(SeatHoldError::HoldNotFound { hold_id })?;
        drop(holds);

        let booking = Booking {
            id: BookingId::new(),
            hold_id,
            event: hold.event,
            holder: hold.holder,
            seats: hold.seats,
            total: hold.total,
            finalized_at: now,
            transaction_id,
        };

        for seat in &booking.seats {
            let sold = guards
                .get_mut(&seat.block)
                .is_some_and(|block| block.sell_seat(seat, hold_id, booking.id));
            debug_assert!(sold, "seat {seat} of an unexpired hold must still be owned by it");
        }
        self.bookings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .record(booking.clone());
        drop(guards);

        #[allow(clippy::cast_precision_loss)]
        let held_for_secs =
            (booking.finalized_at - hold.created_at).num_milliseconds() as f64 / 1000.0;
        metrics::record_hold_finalized(booking.seats.len(), booking.total.paise(), held_for_secs);
        info!(
            %hold_id,
            booking_id = %booking.id,
            event = %booking.event,
            holder = %booking.holder,
            seats = booking.seats.len(),
            total = %booking.total,
            "Hold finalized into booking"
        );

        Ok(booking)
    }

    /// Cancel a hold, returning its seats to the pool immediately.
    ///
    /// Idempotent: releasing an unknown, already released or expired hold is
    /// a no-op. Returns `true` only when an active hold was released.
    pub fn release(&self, hold_id: HoldId) -> bool {
        let Some(block_ids) = self.hold_blocks(hold_id) else {
            debug!(%hold_id, "Release is a no-op: hold not registered");
            return false;
        };
        let Ok(mut guards) = self.lock_blocks(&block_ids) else {
            return false;
        };
        let now = self.clock.now();

        let mut holds = self.lock_holds();
        let Some(hold) = holds.remove(&hold_id) else {
            debug!(%hold_id, "Release is a no-op: hold already discarded");
            return false;
        };
        drop(holds);
        Self::return_seats(&mut guards, &hold);

        if hold.is_expired_at(now) {
            metrics::record_hold_expired();
            debug!(%hold_id, "Release is a no-op: hold had already expired");
            false
        } else {
            metrics::record_hold_released();
            info!(%hold_id, holder = %hold.holder, seats = hold.seats.len(), "Hold released");
            true
        }
    }

    /// Discard every hold whose expiry is at or before `now` and return its
    /// seats to the pool. Returns the number of holds swept.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let candidates: Vec<(HoldId, BTreeSet<BlockId>)> = self
            .lock_holds()
            .values()
            .filter(|hold| hold.is_expired_at(now))
            .map(|hold| (hold.id, hold.blocks()))
            .collect();

        let mut swept = 0;
        for (hold_id, block_ids) in candidates {
            let Ok(mut guards) = self.lock_blocks(&block_ids) else {
                continue;
            };

            // Re-check under the locks: finalize or release may have won the race.
            let mut holds = self.lock_holds();
            if !holds.get(&hold_id).is_some_and(|hold| hold.is_expired_at(now)) {
                continue;
            }
            let Some(hold) = holds.remove(&hold_id) else {
                continue;
            };
            drop(holds);

            let returned = Self::return_seats(&mut guards, &hold);
            metrics::record_hold_expired();
            debug!(%hold_id, returned, "Expired hold swept");
            swept += 1;
        }

        if swept > 0 {
            info!(event = %self.event, swept, "Expired holds swept");
        }
        swept
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Seat counts for one block. Seats under an expired hold count as
    /// available.
    ///
    /// # Errors
    ///
    /// Returns [`SeatHoldError::UnknownBlock`] if the block does not exist.
    pub fn availability(&self, block: &BlockId) -> Result<Availability> {
        let guard = self.lock_block(block)?;
        let counts = guard.availability_at(self.clock.now());
        drop(guard);

        metrics::update_seats_available(self.event.as_str(), block.as_str(), counts.available);
        Ok(counts)
    }

    /// Seat counts for every block, in layout order.
    ///
    /// Each block is a consistent snapshot; blocks are read one after another.
    #[must_use]
    pub fn venue_availability(&self) -> Vec<Availability> {
        self.block_order
            .iter()
            .filter_map(|block| self.availability(block).ok())
            .collect()
    }

    /// Status of one seat right now.
    ///
    /// # Errors
    ///
    /// Returns [`SeatHoldError::UnknownBlock`] / [`SeatHoldError::UnknownSeat`]
    /// if the seat is not in the venue.
    pub fn seat_status(&self, seat: &SeatId) -> Result<SeatStatus> {
        self.lock_block(&seat.block)?
            .status_at(seat, self.clock.now())
            .ok_or_else(|| SeatHoldError::UnknownSeat { seat: seat.clone() })
    }

    /// Every seat of a block with its status and price, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`SeatHoldError::UnknownBlock`] if the block does not exist.
    pub fn seat_map(&self, block: &BlockId) -> Result<Vec<SeatView>> {
        Ok(self.lock_block(block)?.seat_views_at(self.clock.now()))
    }

    /// An active hold. Expired holds are reported as absent.
    #[must_use]
    pub fn hold(&self, hold_id: HoldId) -> Option<Hold> {
        self.active_hold(hold_id).ok()
    }

    /// An active hold, telling an expired hold apart from an unknown one.
    ///
    /// # Errors
    ///
    /// - [`SeatHoldError::HoldNotFound`] if the hold is unknown or discarded
    /// - [`SeatHoldError::HoldExpired`] if it has expired but not been swept
    pub fn active_hold(&self, hold_id: HoldId) -> Result<Hold> {
        let now = self.clock.now();
        let holds = self.lock_holds();
        let hold = holds
            .get(&hold_id)
            .ok_or(SeatHoldError::HoldNotFound { hold_id })?;

        if hold.is_expired_at(now) {
            return Err(SeatHoldError::HoldExpired {
                hold_id,
                expired_at: hold.expires_at,
            });
        }
        Ok(hold.clone())
    }

    /// Holds in the registry, counting expired ones not yet swept.
    #[must_use]
    pub fn registered_holds(&self) -> usize {
        self.lock_holds().len()
    }

    /// A booking by id.
    #[must_use]
    pub fn booking(&self, booking_id: &BookingId) -> Option<Booking> {
        self.bookings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(booking_id)
            .cloned()
    }

    /// A holder's bookings, newest first, at most `limit` of them.
    #[must_use]
    pub fn bookings_for(&self, holder: &HolderId, limit: usize) -> Vec<Booking> {
        self.bookings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bookings
            .iter()
            .rev()
            .filter(|booking| booking.holder == *holder)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Every booking, oldest first.
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .bookings
            .clone()
    }

    // ------------------------------------------------------------------------
    // Locking helpers
    // ------------------------------------------------------------------------

    /// Lock one block.
    pub(crate) fn lock_block(&self, block: &BlockId) -> Result<MutexGuard<'_, BlockInventory>> {
        self.blocks
            .get(block)
            .map(|mutex| mutex.lock().unwrap_or_else(PoisonError::into_inner))
            .ok_or_else(|| SeatHoldError::UnknownBlock {
                block: block.clone(),
            })
    }

    /// Lock several blocks in ascending order (the `BTreeSet` iteration order).
    fn lock_blocks(&self, blocks: &BTreeSet<BlockId>) -> Result<BlockGuards<'_>> {
        let mut guards = BTreeMap::new();
        for block in blocks {
            guards.insert(block.clone(), self.lock_block(block)?);
        }
        Ok(guards)
    }

    /// Expiry of a hold granted at `now`.
    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let window = self.policy.hold_duration;
        let invalid = SeatHoldError::InvalidHoldWindow {
            seconds: window.num_seconds(),
        };
        if window <= Duration::zero() {
            return Err(invalid);
        }
        now.checked_add_signed(window).ok_or(invalid)
    }

    fn lock_holds(&self) -> MutexGuard<'_, HashMap<HoldId, Hold>> {
        self.holds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks a registered hold spans. A hold's seat set never changes, so
    /// the answer stays valid after the registry lock is dropped.
    fn hold_blocks(&self, hold_id: HoldId) -> Option<BTreeSet<BlockId>> {
        self.lock_holds().get(&hold_id).map(Hold::blocks)
    }

    /// Return a hold's seats to the pool; seats since taken by another hold
    /// are left alone. Returns how many seats were returned.
    fn return_seats(guards: &mut BlockGuards<'_>, hold: &Hold) -> usize {
        hold.seats
            .iter()
            .filter(|seat| {
                guards
                    .get_mut(&seat.block)
                    .is_some_and(|block| block.release_seat(seat, hold.id))
            })
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use govvens_testing::ManualClock;

    fn manager_with_clock() -> (SeatHoldManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_at_test_epoch());
        let blocks = vec![
            BlockInventory::new(BlockId::new("A"), 2, 2, Money::from_rupees(1000)),
            BlockInventory::new(BlockId::new("B"), 1, 2, Money::from_rupees(1500)),
        ];
        let manager = SeatHoldManager::new(
            EventId::new("test-match"),
            blocks,
            HoldPolicy::default(),
            clock.clone(),
        );
        (manager, clock)
    }

    fn seat(text: &str) -> SeatId {
        text.parse().unwrap()
    }

    fn holder(name: &str) -> HolderId {
        HolderId::new(name)
    }

    #[test]
    fn request_hold_rejects_empty_and_oversized_requests() {
        let (manager, _) = manager_with_clock();
        assert_eq!(
            manager.request_hold(Vec::new(), holder("h")),
            Err(SeatHoldError::EmptyHoldRequest)
        );

        let policy = HoldPolicy::new(Duration::minutes(15), 2);
        let small = SeatHoldManager::new(
            EventId::new("test-match"),
            vec![BlockInventory::new(BlockId::new("A"), 1, 5, Money::from_rupees(10))],
            policy,
            Arc::new(ManualClock::starting_at_test_epoch()),
        );
        let error = small
            .request_hold(
                [seat("A-1-1"), seat("A-1-2"), seat("A-1-3")],
                holder("h"),
            )
            .unwrap_err();
        assert_eq!(error, SeatHoldError::TooManySeats { requested: 3, max: 2 });
    }

    #[test]
    fn unusable_hold_window_holds_nothing() {
        for window in [Duration::zero(), Duration::seconds(-5), Duration::MAX] {
            let manager = SeatHoldManager::new(
                EventId::new("test-match"),
                vec![BlockInventory::new(BlockId::new("A"), 1, 1, Money::from_rupees(10))],
                HoldPolicy::new(window, 10),
                Arc::new(ManualClock::starting_at_test_epoch()),
            );

            let error = manager.request_hold([seat("A-1-1")], holder("h")).unwrap_err();
            assert_eq!(
                error,
                SeatHoldError::InvalidHoldWindow {
                    seconds: window.num_seconds()
                }
            );
            assert_eq!(manager.seat_status(&seat("A-1-1")), Ok(SeatStatus::Available));
            assert_eq!(manager.registered_holds(), 0);
        }
    }

    #[test]
    fn holds_and_bookings_carry_the_event() {
        let (manager, _) = manager_with_clock();
        let hold = manager.request_hold([seat("A-1-1")], holder("h")).unwrap();
        assert_eq!(hold.event, EventId::new("test-match"));

        let booking = manager
            .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
            .unwrap();
        assert_eq!(&booking.event, manager.event_id());
    }

    #[test]
    fn duplicate_seats_collapse() {
        let (manager, _) = manager_with_clock();
        let hold = manager
            .request_hold([seat("A-1-1"), seat("A-1-1")], holder("h"))
            .unwrap();
        assert_eq!(hold.seats, vec![seat("A-1-1")]);
        assert_eq!(hold.total, Money::from_rupees(1000));
    }

    #[test]
    fn unknown_seats_and_blocks_are_rejected_without_side_effects() {
        let (manager, _) = manager_with_clock();
        assert!(matches!(
            manager.request_hold([seat("A-1-1"), seat("Z-1-1")], holder("h")),
            Err(SeatHoldError::UnknownBlock { .. })
        ));
        assert!(matches!(
            manager.request_hold([seat("A-1-1"), seat("A-9-9")], holder("h")),
            Err(SeatHoldError::UnknownSeat { .. })
        ));
        assert_eq!(manager.seat_status(&seat("A-1-1")), Ok(SeatStatus::Available));
    }

    #[test]
    fn hold_spanning_blocks_prices_each_seat() {
        let (manager, clock) = manager_with_clock();
        let hold = manager
            .request_hold([seat("B-1-1"), seat("A-2-2")], holder("h"))
            .unwrap();

        assert_eq!(hold.seats, vec![seat("A-2-2"), seat("B-1-1")]);
        assert_eq!(hold.total, Money::from_rupees(2500));
        assert_eq!(hold.expires_at, clock.now() + Duration::minutes(15));
        assert_eq!(manager.availability(&BlockId::new("A")).unwrap().held, 1);
        assert_eq!(manager.availability(&BlockId::new("B")).unwrap().held, 1);
    }

    #[test]
    fn expired_seat_can_be_taken_over_and_stale_hold_cannot_touch_it() {
        let (manager, clock) = manager_with_clock();
        let stale = manager
            .request_hold([seat("A-1-1"), seat("A-1-2")], holder("first"))
            .unwrap();

        clock.advance(Duration::minutes(15));
        let fresh = manager
            .request_hold([seat("A-1-1")], holder("second"))
            .unwrap();

        // Releasing or sweeping the stale hold must not free the taken-over seat.
        assert!(!manager.release(stale.id));
        assert_eq!(manager.seat_status(&seat("A-1-1")), Ok(SeatStatus::Held));
        assert_eq!(manager.seat_status(&seat("A-1-2")), Ok(SeatStatus::Available));
        assert_eq!(manager.hold(fresh.id).map(|h| h.holder), Some(holder("second")));
    }

    #[test]
    fn payment_failure_keeps_seats_held_for_retry() {
        let (manager, _) = manager_with_clock();
        let hold = manager.request_hold([seat("A-1-1")], holder("h")).unwrap();

        let error = manager
            .finalize(hold.id, &PaymentConfirmation::declined("card declined"))
            .unwrap_err();
        assert!(matches!(error, SeatHoldError::PaymentFailed { .. }));
        assert_eq!(manager.seat_status(&seat("A-1-1")), Ok(SeatStatus::Held));

        let wrong_amount = PaymentConfirmation::approved("txn_1", Money::from_rupees(1));
        assert!(matches!(
            manager.finalize(hold.id, &wrong_amount),
            Err(SeatHoldError::PaymentFailed { .. })
        ));

        let booking = manager
            .finalize(hold.id, &PaymentConfirmation::approved("txn_2", hold.total))
            .unwrap();
        assert_eq!(booking.transaction_id, "txn_2");
        assert_eq!(manager.seat_status(&seat("A-1-1")), Ok(SeatStatus::Sold));
    }

    #[test]
    fn finalize_at_exact_expiry_fails() {
        let (manager, clock) = manager_with_clock();
        let hold = manager.request_hold([seat("A-1-1")], holder("h")).unwrap();

        clock.set(hold.expires_at);
        let error = manager
            .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
            .unwrap_err();
        assert_eq!(
            error,
            SeatHoldError::HoldExpired {
                hold_id: hold.id,
                expired_at: hold.expires_at
            }
        );
        // The expired hold is gone for good.
        assert_eq!(
            manager.finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total)),
            Err(SeatHoldError::HoldNotFound { hold_id: hold.id })
        );
    }

    #[test]
    fn finalize_just_before_expiry_succeeds() {
        let (manager, clock) = manager_with_clock();
        let hold = manager.request_hold([seat("A-1-1")], holder("h")).unwrap();

        clock.set(hold.expires_at - Duration::milliseconds(1));
        assert!(manager
            .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
            .is_ok());
    }

    #[test]
    fn sold_seats_are_never_held_again() {
        let (manager, clock) = manager_with_clock();
        let hold = manager.request_hold([seat("B-1-2")], holder("h")).unwrap();
        manager
            .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
            .unwrap();

        clock.advance(Duration::days(1));
        manager.sweep_expired(clock.now());
        assert_eq!(
            manager.request_hold([seat("B-1-2")], holder("other")),
            Err(SeatHoldError::SeatUnavailable {
                seats: vec![seat("B-1-2")]
            })
        );
        assert!(!manager.release(hold.id));
        assert_eq!(manager.seat_status(&seat("B-1-2")), Ok(SeatStatus::Sold));
    }

    #[test]
    fn sweep_only_touches_expired_holds() {
        let (manager, clock) = manager_with_clock();
        let early = manager.request_hold([seat("A-1-1")], holder("early")).unwrap();
        clock.advance(Duration::minutes(10));
        let late = manager.request_hold([seat("A-1-2")], holder("late")).unwrap();

        assert_eq!(manager.sweep_expired(early.expires_at - Duration::seconds(1)), 0);
        assert_eq!(manager.sweep_expired(early.expires_at), 1);
        assert_eq!(manager.sweep_expired(early.expires_at), 0);
        assert!(manager.hold(late.id).is_some());
        assert_eq!(manager.seat_status(&seat("A-1-2")), Ok(SeatStatus::Held));
    }

    #[test]
    fn bookings_for_lists_newest_first_with_limit() {
        let (manager, clock) = manager_with_clock();
        let mut ids = Vec::new();
        for text in ["A-1-1", "A-1-2", "A-2-1"] {
            let hold = manager.request_hold([seat(text)], holder("fan")).unwrap();
            clock.advance(Duration::seconds(1));
            let booking = manager
                .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
                .unwrap();
            ids.push(booking.id);
        }
        let other = manager.request_hold([seat("B-1-1")], holder("other")).unwrap();
        manager
            .finalize(other.id, &PaymentConfirmation::approved("txn", other.total))
            .unwrap();

        let listed: Vec<BookingId> = manager
            .bookings_for(&holder("fan"), 2)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(listed, vec![ids[2], ids[1]]);
        assert_eq!(manager.bookings().len(), 4);
        assert_eq!(manager.booking(&ids[0]).map(|b| b.seats), Some(vec![seat("A-1-1")]));
    }

    #[test]
    fn venue_availability_follows_layout_order() {
        let (manager, _) = manager_with_clock();
        let blocks: Vec<String> = manager
            .venue_availability()
            .into_iter()
            .map(|a| a.block.to_string())
            .collect();
        assert_eq!(blocks, ["A", "B"]);
        assert_eq!(
            manager.availability(&BlockId::new("Q")),
            Err(SeatHoldError::UnknownBlock {
                block: BlockId::new("Q")
            })
        );
    }

    #[test]
    fn seat_map_reports_status_and_price() {
        let (manager, _) = manager_with_clock();
        manager.request_hold([seat("B-1-2")], holder("h")).unwrap();
        let map = manager.seat_map(&BlockId::new("B")).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[0].status, SeatStatus::Available);
        assert_eq!(map[1].status, SeatStatus::Held);
        assert_eq!(map[1].price, Money::from_rupees(1500));
    }
}
