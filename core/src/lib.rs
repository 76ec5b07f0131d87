//! # Govvens Core
//!
//! Environment traits shared by the Govvens ticketing crates.
//!
//! Domain code never reads ambient global state. Anything that varies between
//! production and tests (most importantly the current time) is abstracted
//! behind a trait in [`environment`] and injected by the caller.
//!
//! ## Example
//!
//! ```
//! use govvens_core::environment::{Clock, SystemClock};
//! use std::sync::Arc;
//!
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock);
//! let before = clock.now();
//! assert!(clock.now() >= before);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Duration, Utc};
pub use serde::{Deserialize, Serialize};

/// Environment module - Dependency injection traits
///
/// All time-dependent behaviour in the ticketing crates goes through
/// [`Clock`](environment::Clock), so hold expiry can be driven
/// deterministically from tests.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock = SystemClock;
    ///
    /// // Test - fixed time for deterministic tests
    /// let clock = govvens_testing::test_clock();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time from the operating system.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
