//! Seat Hold Reservation Engine - stadium ticketing with time-bounded holds
//!
//! The engine owns seat availability for every event in its catalogue, each
//! event with its own seats and price. During checkout a
//! customer's seats are held exclusively for a fixed window (15 minutes by
//! default); within that window the hold is finalized into a booking once
//! payment succeeds, released on cancellation, or silently expires.
//!
//! # Architecture
//!
//! ```text
//!  HTTP (axum)                       Background
//! ┌──────────────┐                 ┌──────────────┐
//! │  api::holds  │                 │   Expiry     │
//! │ api::blocks  │                 │   Sweeper    │
//! └──────┬───────┘                 └──────┬───────┘
//!        │                                │
//!        ▼                                ▼
//! ┌──────────────────────────────────────────────────┐
//! │       EventCatalog (one manager per event)       │
//! └────────────────────────┬─────────────────────────┘
//!                          ▼
//! ┌──────────────────────────────────────────────────┐
//! │                 SeatHoldManager                  │
//! │  ┌───────────┐ ┌───────────┐ ┌───────────┐       │
//! │  │ Block A   │ │ Block B   │ │ Block C   │ mutex │
//! │  │ per-seat  │ │ per-seat  │ │ per-seat  │ each  │
//! │  └───────────┘ └───────────┘ └───────────┘       │
//! │  hold registry            booking ledger         │
//! └──────────────────────────────────────────────────┘
//!                         ▲
//!                         │ PaymentConfirmation
//!                 ┌───────┴────────┐
//!                 │ PaymentGateway │
//!                 └────────────────┘
//! ```
//!
//! # Key Features
//!
//! ## 1. No Double Booking
//!
//! Every seat is `Available`, `Held` or `Sold`, never two at once. Hold
//! requests are all-or-nothing and serialised per block:
//!
//! ```text
//! 100 concurrent requests for A-1-1 → exactly 1 hold, 99 SeatUnavailable
//! ```
//!
//! ## 2. Holds Never Outlive Their Expiry
//!
//! Expiry is evaluated against an injected clock on every read and write, so
//! a hold stops counting the instant it expires, with or without a sweep.
//!
//! ## 3. Payment Retry
//!
//! A declined payment leaves the seats held; the customer can retry until the
//! hold expires.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut catalog = EventCatalog::new(HoldPolicy::default(), Arc::new(SystemClock));
//! let manager = catalog.add_event(event, &VenueLayout::stadium())?;
//!
//! let hold = manager.request_hold(["A-1-1".parse()?, "A-1-2".parse()?], HolderId::new("fan"))?;
//! let booking = manager.finalize(hold.id, &PaymentConfirmation::approved("txn_1", hold.total))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analytics;
pub mod api;
pub mod catalog;
pub mod config;
pub mod deploy;
pub mod error;
pub mod inventory;
pub mod layout;
pub mod manager;
pub mod metrics;
pub mod payment;
pub mod server;
pub mod sweeper;
pub mod types;

pub use analytics::{BlockSales, SalesSummary};
pub use catalog::{CatalogError, EventCatalog, EventSummary};
pub use config::{Config, ConfigError};
pub use error::{Result, SeatHoldError, SeatIdParseError};
pub use inventory::BlockInventory;
pub use layout::{LayoutError, VenueLayout};
pub use manager::SeatHoldManager;
pub use payment::{MockPaymentGateway, PaymentConfirmation, PaymentGateway, PaymentMethod};
pub use sweeper::ExpirySweeper;
pub use types::*;
