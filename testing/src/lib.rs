//! # Govvens Testing
//!
//! Testing utilities and helpers for the Govvens ticketing crates.
//!
//! This crate provides:
//! - Deterministic [`Clock`] implementations for driving hold expiry
//! - A tracing initialiser for tests that want log output
//!
//! ## Example
//!
//! ```ignore
//! use govvens_testing::ManualClock;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::starting_at_test_epoch());
//! let manager = SeatHoldManager::new(venue, policy, clock.clone());
//!
//! let hold = manager.request_hold(seats, holder)?;
//! clock.advance(chrono::Duration::minutes(16));
//! assert!(manager.finalize(hold.id, confirmation).is_err());
//! ```

use chrono::{DateTime, Utc};
use govvens_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use govvens_testing::mocks::FixedClock;
    /// use govvens_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when a test tells it to.
    ///
    /// Shared between the code under test (as `Arc<dyn Clock>`) and the test
    /// body, which calls [`advance`](Self::advance) or [`set`](Self::set) to
    /// step past hold expiries without sleeping.
    ///
    /// ```
    /// use govvens_testing::mocks::ManualClock;
    /// use govvens_core::environment::Clock;
    /// use chrono::Duration;
    ///
    /// let clock = ManualClock::starting_at_test_epoch();
    /// let start = clock.now();
    /// clock.advance(Duration::minutes(15));
    /// assert_eq!(clock.now() - start, Duration::minutes(15));
    /// ```
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a manual clock frozen at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Create a manual clock frozen at the shared test epoch
        /// (2025-01-01 00:00:00 UTC).
        #[must_use]
        pub fn starting_at_test_epoch() -> Self {
            Self::new(test_epoch())
        }

        /// Move the clock forward (or backward, for a negative duration).
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute instant.
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// The instant every test clock starts at: 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_735_689_600)
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }
}

/// Test helpers and utilities
pub mod helpers {
    /// Install a `tracing` subscriber that writes through the test harness.
    ///
    /// Safe to call from every test: only the first call installs anything.
    /// Honours `RUST_LOG`, defaulting to `debug` for the ticketing crate.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "ticketing=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock, test_epoch};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_epoch_is_new_year_2025() {
        assert_eq!(test_epoch().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_manual_clock_advances_and_sets() {
        let clock = ManualClock::starting_at_test_epoch();
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), test_epoch() + Duration::seconds(90));

        clock.set(test_epoch());
        assert_eq!(clock.now(), test_epoch());
    }
}
