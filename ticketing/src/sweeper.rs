//! Background expiry sweeper.
//!
//! Expiry is enforced lazily by each event's manager, so the sweeper is
//! housekeeping: it drops expired holds from every registry and keeps the hold
//! gauges honest. It runs on a fixed interval until its shutdown flag flips
//! to `true`.

use crate::catalog::EventCatalog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest interval the sweeper will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically calls [`EventCatalog::sweep_expired`].
pub struct ExpirySweeper {
    catalog: Arc<EventCatalog>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl ExpirySweeper {
    /// Create a sweeper and the sender that stops it.
    ///
    /// Intervals below [`MIN_SWEEP_INTERVAL`] (including zero) are raised to it.
    #[must_use]
    pub fn new(catalog: Arc<EventCatalog>, interval: Duration) -> (Self, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sweeper = Self {
            catalog,
            interval: interval.max(MIN_SWEEP_INTERVAL),
            shutdown: shutdown_rx,
        };

        (sweeper, shutdown_tx)
    }

    /// Interval between sweeps
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until shutdown is signalled or the sender is dropped.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = self.interval.as_millis(),
            events = self.catalog.len(),
            "Expiry sweeper started"
        );

        while !*self.shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    let swept = self.catalog.sweep_expired(self.catalog.now());
                    tracing::trace!(swept, "Sweep tick");
                }

                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        tracing::info!("Expiry sweeper stopped");
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_STADIUM;
    use crate::layout::VenueLayout;
    use crate::types::{Event, EventId, HoldPolicy, HolderId, Money, SeatId, SeatStatus};
    use chrono::Duration as ChronoDuration;
    use govvens_core::environment::Clock;
    use govvens_testing::ManualClock;

    fn catalog_with(clock: Arc<dyn Clock>, ids: &[&str]) -> Arc<EventCatalog> {
        let layout =
            VenueLayout::from_json_str(r#"{"blocks": [{"name": "B", "rows": 1, "seats_per_row": 2}]}"#)
                .unwrap();
        let mut catalog = EventCatalog::new(HoldPolicy::default(), clock.clone());
        for id in ids {
            let event = Event {
                id: EventId::new(*id),
                name: (*id).to_string(),
                starts_at: clock.now(),
                stadium: DEFAULT_STADIUM.to_string(),
                ticket_price: Money::from_rupees(1000),
                is_active: true,
            };
            catalog.add_event(event, &layout).unwrap();
        }
        Arc::new(catalog)
    }

    #[tokio::test]
    async fn sweeper_reclaims_expired_holds_in_every_event_and_stops_on_signal() {
        let clock = Arc::new(ManualClock::starting_at_test_epoch());
        let catalog = catalog_with(clock.clone(), &["opener", "final"]);
        let seat = SeatId::new("B", 1, 1);
        let mut holds = Vec::new();
        for id in ["opener", "final"] {
            let manager = catalog.manager(&EventId::new(id)).unwrap();
            holds.push(
                manager
                    .request_hold([seat.clone()], HolderId::new("fan"))
                    .unwrap(),
            );
        }

        let (sweeper, shutdown) = ExpirySweeper::new(catalog.clone(), Duration::from_millis(10));
        let handle = sweeper.spawn();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(catalog.registered_holds(), 2, "active holds must survive sweeps");

        clock.advance(ChronoDuration::minutes(15));
        tokio::time::timeout(Duration::from_secs(5), async {
            while catalog.registered_holds() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        for hold in &holds {
            let manager = catalog.manager(&hold.event).unwrap();
            assert!(manager.hold(hold.id).is_none());
            assert_eq!(manager.seat_status(&seat), Ok(SeatStatus::Available));
        }

        shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_the_sender_stops_the_sweeper() {
        let catalog = catalog_with(Arc::new(govvens_testing::test_clock()), &["opener"]);
        let (sweeper, shutdown) = ExpirySweeper::new(catalog, Duration::from_secs(60));
        let handle = sweeper.spawn();

        drop(shutdown);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn zero_interval_is_raised_to_the_minimum() {
        let catalog = catalog_with(Arc::new(govvens_testing::test_clock()), &["opener"]);
        let (sweeper, shutdown) = ExpirySweeper::new(catalog, Duration::ZERO);
        assert_eq!(sweeper.interval(), MIN_SWEEP_INTERVAL);

        let handle = sweeper.spawn();
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
