//! API endpoints for the ticketing system.
//!
//! This module contains all HTTP API handlers organized by domain:
//! - Events: The event catalogue
//! - Availability: Seat counts and seat maps
//! - Holds: Holding, finalizing, and releasing seats
//! - Bookings: A holder's booking history
//! - Analytics: Sales summary
//! - Metrics: Prometheus scrape endpoint

pub mod analytics;
pub mod availability;
pub mod bookings;
pub mod events;
pub mod holds;
pub mod metrics;

pub use analytics::get_sales_summary;
pub use availability::{get_block_availability, get_seat_map, list_blocks};
pub use bookings::{get_booking, list_holder_bookings};
pub use events::{get_event, list_events};
pub use holds::{checkout_hold, create_hold, finalize_hold, get_hold, release_hold};
pub use metrics::render_metrics;
