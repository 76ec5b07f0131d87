//! Sales analytics for the organiser dashboard.
//!
//! Answers "how full is each block?" and "what have we taken so far?" from
//! the live seat tables and the booking ledger. Nothing is cached; a summary
//! is computed on demand.

use crate::manager::SeatHoldManager;
use crate::types::{Availability, BlockId, Money};
use serde::{Deserialize, Serialize};

/// Sales figures for one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSales {
    /// Seat counts at the time of the summary
    #[serde(flatten)]
    pub availability: Availability,
    /// Sum of the unit prices of sold seats
    pub revenue: Money,
    /// Sold seats as a percentage of capacity
    pub occupancy_percent: f64,
}

/// Venue-wide sales summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Per-block figures in layout order
    pub blocks: Vec<BlockSales>,
    /// Seats in the venue
    pub capacity: u32,
    /// Seats available right now
    pub available: u32,
    /// Seats under an active hold
    pub held: u32,
    /// Seats sold
    pub sold: u32,
    /// Sold seats as a percentage of capacity
    pub occupancy_percent: f64,
    /// Total of every booking
    pub revenue: Money,
    /// Number of bookings
    pub bookings: usize,
    /// Revenue divided by seats sold
    pub average_ticket_price: Money,
}

impl SalesSummary {
    /// Block with the most seats sold, if anything has sold
    #[must_use]
    pub fn most_popular_block(&self) -> Option<&BlockId> {
        self.blocks
            .iter()
            .filter(|block| block.availability.sold > 0)
            .max_by_key(|block| block.availability.sold)
            .map(|block| &block.availability.block)
    }
}

fn occupancy(sold: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    f64::from(sold) * 100.0 / f64::from(capacity)
}

impl SeatHoldManager {
    /// Compute the current sales summary.
    #[must_use]
    pub fn sales_summary(&self) -> SalesSummary {
        let blocks: Vec<BlockSales> = self
            .block_ids()
            .iter()
            .filter_map(|id| {
                let block = self.lock_block(id).ok()?;
                let availability = block.availability_at(self.now());
                let revenue = block.sold_revenue();
                drop(block);

                Some(BlockSales {
                    occupancy_percent: occupancy(availability.sold, availability.capacity),
                    availability,
                    revenue,
                })
            })
            .collect();

        let bookings = self.bookings();
        let revenue: Money = bookings.iter().map(|booking| booking.total).sum();

        let (capacity, available, held, sold) =
            blocks.iter().fold((0, 0, 0, 0), |(c, a, h, s), block| {
                let counts = &block.availability;
                (
                    c + counts.capacity,
                    a + counts.available,
                    h + counts.held,
                    s + counts.sold,
                )
            });

        SalesSummary {
            blocks,
            capacity,
            available,
            held,
            sold,
            occupancy_percent: occupancy(sold, capacity),
            revenue,
            bookings: bookings.len(),
            average_ticket_price: revenue.split(u64::from(sold)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::inventory::BlockInventory;
    use crate::payment::PaymentConfirmation;
    use crate::types::{EventId, HoldPolicy, HolderId, SeatId};
    use govvens_testing::test_clock;
    use std::sync::Arc;

    fn manager() -> SeatHoldManager {
        SeatHoldManager::new(
            EventId::new("test-match"),
            vec![
                BlockInventory::new(BlockId::new("A"), 2, 5, Money::from_rupees(1000)),
                BlockInventory::new(BlockId::new("B"), 1, 10, Money::from_rupees(500)),
            ],
            HoldPolicy::default(),
            Arc::new(test_clock()),
        )
    }

    fn book(manager: &SeatHoldManager, seats: &[&str]) {
        let seats: Vec<SeatId> = seats.iter().map(|s| s.parse().unwrap()).collect();
        let hold = manager.request_hold(seats, HolderId::new("fan")).unwrap();
        manager
            .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
            .unwrap();
    }

    #[test]
    fn empty_venue_summary() {
        let summary = manager().sales_summary();
        assert_eq!(summary.capacity, 20);
        assert_eq!(summary.available, 20);
        assert_eq!(summary.revenue, Money::ZERO);
        assert_eq!(summary.average_ticket_price, Money::ZERO);
        assert_eq!(summary.occupancy_percent, 0.0);
        assert!(summary.most_popular_block().is_none());
    }

    #[test]
    fn summary_counts_sales_and_holds() {
        let manager = manager();
        book(&manager, &["A-1-1", "A-1-2"]);
        book(&manager, &["B-1-1"]);
        manager
            .request_hold(["B-1-2".parse().unwrap()], HolderId::new("browser"))
            .unwrap();

        let summary = manager.sales_summary();
        assert_eq!((summary.sold, summary.held, summary.available), (3, 1, 16));
        assert_eq!(summary.bookings, 2);
        assert_eq!(summary.revenue, Money::from_rupees(2500));
        assert_eq!(summary.average_ticket_price, Money::from_paise(83_333));
        assert_eq!(summary.occupancy_percent, 15.0);

        assert_eq!(summary.blocks[0].revenue, Money::from_rupees(2000));
        assert_eq!(summary.blocks[0].occupancy_percent, 20.0);
        assert_eq!(summary.blocks[1].availability.held, 1);
        assert_eq!(summary.most_popular_block(), Some(&BlockId::new("A")));
    }
}
