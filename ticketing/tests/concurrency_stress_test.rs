//! Concurrency stress tests for last-seat scenarios.
//!
//! These tests verify that under heavy concurrent load, the seat hold manager
//! correctly handles race conditions and prevents double-booking.
//!
//! Run with: `cargo test --test concurrency_stress_test -- --nocapture`

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/expect

use chrono::Duration;
use govvens_core::environment::Clock;
use govvens_testing::ManualClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticketing::{
    BlockId, BlockInventory, EventId, HoldPolicy, HolderId, Money, PaymentConfirmation, SeatHoldError,
    SeatHoldManager, SeatId, SeatStatus,
};

fn manager_with(blocks: &[(&str, u32, u32)], clock: Arc<ManualClock>) -> Arc<SeatHoldManager> {
    let blocks = blocks
        .iter()
        .map(|(name, rows, per_row)| {
            BlockInventory::new(BlockId::new(*name), *rows, *per_row, Money::from_rupees(1000))
        })
        .collect();
    Arc::new(SeatHoldManager::new(
        EventId::new("stress-match"),
        blocks,
        HoldPolicy::default(),
        clock,
    ))
}

/// Test: 100 concurrent hold attempts for 1 seat.
///
/// Verifies that:
/// - Exactly 1 hold succeeds
/// - Exactly 99 attempts fail with `SeatUnavailable`
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_last_seat_concurrency_100_requests() {
    println!("🧪 Concurrency Stress Test: 100 concurrent requests for 1 seat");

    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let manager = manager_with(&[("A", 1, 1)], clock);
    let seat = SeatId::new("A", 1, 1);

    let mut handles = Vec::new();
    for i in 0..100 {
        let manager = Arc::clone(&manager);
        let seat = seat.clone();
        handles.push(tokio::spawn(async move {
            manager.request_hold([seat], HolderId::new(format!("fan-{i}")))
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(SeatHoldError::SeatUnavailable { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    println!("  ✅ {successes} succeeded, {conflicts} rejected");
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 99);
    assert_eq!(manager.seat_status(&seat), Ok(SeatStatus::Held));
}

/// Test: overlapping multi-seat requests across two blocks from OS threads.
///
/// Each request wants seat n in both A and B; 16 threads race for each of the
/// four pairs, half of them listing B first. Exactly one request per pair
/// wins and no seat is held twice.
#[test]
fn test_overlapping_cross_block_requests() {
    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let manager = manager_with(&[("A", 1, 4), ("B", 1, 4)], clock);
    let won = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for i in 0..64_u32 {
            let manager = Arc::clone(&manager);
            let won = Arc::clone(&won);
            scope.spawn(move || {
                let n = i % 4 + 1;
                let request = if i % 2 == 0 {
                    vec![SeatId::new("A", 1, n), SeatId::new("B", 1, n)]
                } else {
                    vec![SeatId::new("B", 1, n), SeatId::new("A", 1, n)]
                };
                if manager.request_hold(request, HolderId::new(format!("t{i}"))).is_ok() {
                    won.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    // Four disjoint seat pairs: exactly four winners.
    assert_eq!(won.load(Ordering::SeqCst), 4);
    let a = manager.availability(&BlockId::new("A")).unwrap();
    let b = manager.availability(&BlockId::new("B")).unwrap();
    assert_eq!((a.held, b.held), (4, 4));
}

/// Test: finalize racing release and the sweeper on the same hold.
///
/// Exactly one of them observes the hold; the seat ends up either sold (and
/// booked once) or available.
#[test]
fn test_finalize_release_sweep_race() {
    for _ in 0..50 {
        let clock = Arc::new(ManualClock::starting_at_test_epoch());
        let manager = manager_with(&[("A", 1, 1)], clock.clone());
        let seat = SeatId::new("A", 1, 1);
        let hold = manager
            .request_hold([seat.clone()], HolderId::new("fan"))
            .unwrap();

        let (finalized, released) = std::thread::scope(|scope| {
            let finalize = scope.spawn(|| {
                manager
                    .finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
                    .is_ok()
            });
            let release = scope.spawn(|| manager.release(hold.id));
            let sweep = scope.spawn(|| manager.sweep_expired(clock.now() + Duration::hours(1)));
            let _ = sweep.join().unwrap();
            (finalize.join().unwrap(), release.join().unwrap())
        });

        assert!(!(finalized && released), "a hold cannot be both sold and released");
        let status = manager.seat_status(&seat).unwrap();
        if finalized {
            assert_eq!(status, SeatStatus::Sold);
            assert_eq!(manager.bookings().len(), 1);
        } else {
            assert_eq!(status, SeatStatus::Available);
            assert!(manager.bookings().is_empty());
        }
    }
}

/// Test: many customers buying distinct seats concurrently all succeed.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_purchases_all_succeed() {
    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let manager = manager_with(&[("A", 10, 20)], clock);

    let mut handles = Vec::new();
    for row in 1..=10 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            let seats: Vec<SeatId> = (1..=10).map(|n| SeatId::new("A", row, n)).collect();
            let hold = manager.request_hold(seats, HolderId::new(format!("row-{row}")))?;
            manager.finalize(hold.id, &PaymentConfirmation::approved("txn", hold.total))
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let block = manager.availability(&BlockId::new("A")).unwrap();
    assert_eq!((block.sold, block.available), (100, 100));
    assert_eq!(manager.sales_summary().revenue, Money::from_rupees(100_000));
}
