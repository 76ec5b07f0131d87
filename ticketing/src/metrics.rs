//! Business metrics for the seat hold engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `ticketing_holds_total{status}` - Holds by outcome (created, rejected,
//!   finalized, released, expired)
//! - `ticketing_seats_sold_total` - Seats sold
//! - `ticketing_revenue_paise_total` - Revenue from finalized bookings
//! - `ticketing_payments_failed_total` - Finalize calls rejected for payment
//!
//! ## Gauges
//! - `ticketing_active_holds` - Holds currently registered
//! - `ticketing_seats_available{event,block}` - Available seats per block
//!
//! ## Histograms
//! - `ticketing_hold_duration_seconds` - Time from hold creation to booking

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the global Prometheus recorder and register metric descriptions.
///
/// The returned handle renders the text exposition for `/metrics`.
///
/// # Errors
///
/// Returns [`MetricsError`] if a recorder is already installed or the
/// exporter cannot be built.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        // Holds last up to fifteen minutes
        .set_buckets_for_metric(
            Matcher::Full("ticketing_hold_duration_seconds".to_string()),
            &[1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_business_metrics();
    Ok(handle)
}

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "ticketing_holds_total",
        "Total number of holds by status (created, rejected, finalized, released, expired)"
    );
    describe_gauge!(
        "ticketing_active_holds",
        "Current number of holds awaiting payment"
    );
    describe_histogram!(
        "ticketing_hold_duration_seconds",
        "Time taken from hold creation to booking"
    );
    describe_counter!("ticketing_seats_sold_total", "Total number of seats sold");
    describe_counter!(
        "ticketing_revenue_paise_total",
        "Total revenue from finalized bookings in paise"
    );
    describe_counter!(
        "ticketing_payments_failed_total",
        "Total number of finalize attempts rejected by the payment step"
    );
    describe_gauge!(
        "ticketing_seats_available",
        "Current number of available seats per event and block"
    );

    tracing::info!("Business metrics registered");
}

/// Record a hold granted for `seats` seats.
pub fn record_hold_created(seats: usize) {
    metrics::counter!("ticketing_holds_total", "status" => "created").increment(1);
    metrics::gauge!("ticketing_active_holds").increment(1.0);
    tracing::debug!(seats, "Recorded hold_created metric");
}

/// Record a hold request refused because seats were taken.
pub fn record_hold_rejected() {
    metrics::counter!("ticketing_holds_total", "status" => "rejected").increment(1);
}

/// Record a hold converted into a booking.
///
/// # Arguments
///
/// * `seats` - Number of seats sold
/// * `amount_paise` - Booking total
/// * `duration_secs` - Time from hold creation to booking
pub fn record_hold_finalized(seats: usize, amount_paise: u64, duration_secs: f64) {
    metrics::counter!("ticketing_holds_total", "status" => "finalized").increment(1);
    metrics::gauge!("ticketing_active_holds").decrement(1.0);
    metrics::counter!("ticketing_seats_sold_total").increment(seats as u64);
    metrics::counter!("ticketing_revenue_paise_total").increment(amount_paise);
    metrics::histogram!("ticketing_hold_duration_seconds").record(duration_secs);
    tracing::debug!(seats, amount_paise, duration_secs, "Recorded hold_finalized metric");
}

/// Record a hold cancelled by its holder.
pub fn record_hold_released() {
    metrics::counter!("ticketing_holds_total", "status" => "released").increment(1);
    metrics::gauge!("ticketing_active_holds").decrement(1.0);
}

/// Record a hold discarded after its expiry.
pub fn record_hold_expired() {
    metrics::counter!("ticketing_holds_total", "status" => "expired").increment(1);
    metrics::gauge!("ticketing_active_holds").decrement(1.0);
}

/// Record a finalize attempt rejected by the payment step.
pub fn record_payment_failed() {
    metrics::counter!("ticketing_payments_failed_total").increment(1);
}

/// Update the available seats gauge for a block of an event.
pub fn update_seats_available(event: &str, block: &str, available: u32) {
    metrics::gauge!(
        "ticketing_seats_available",
        "event" => event.to_owned(),
        "block" => block.to_owned()
    )
    .set(f64::from(available));
}
