//! Seat hold reservation HTTP server.
//!
//! Loads the event catalogue, starts the expiry sweeper, and serves the JSON API
//! until Ctrl+C or SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! HOLD_DURATION_SECS=900 TICKET_PRICE_RUPEES=1000 cargo run --bin server
//! EVENTS_PATH=events.json cargo run --bin server
//! ```

use govvens_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use ticketing::{
    ExpirySweeper, MockPaymentGateway,
    config::Config,
    metrics::install_prometheus_recorder,
    server::{AppState, build_router, shutdown_signal},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticketing=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seat hold server");

    // Load configuration
    let config = Config::from_env();
    info!(
        hold_duration_secs = config.holds.hold_duration_secs,
        max_seats_per_hold = config.holds.max_seats_per_hold,
        events = ?config.venue.events_path,
        layout = ?config.venue.layout_path,
        "Configuration loaded"
    );

    // Metrics
    let metrics_handle = match install_prometheus_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics disabled");
            None
        }
    };

    // Event catalogue and seat inventory
    let catalog = Arc::new(config.load_catalog(Arc::new(SystemClock))?);
    for summary in catalog.summaries() {
        info!(
            event = %summary.event.id,
            starts_at = %summary.event.starts_at,
            capacity = summary.capacity,
            "Event on sale"
        );
    }

    // Expiry sweeper
    let (sweeper, sweeper_shutdown) = ExpirySweeper::new(catalog.clone(), config.sweep_interval());
    let sweeper_handle = sweeper.spawn();

    // Build application state
    let mut state = AppState::new(catalog, MockPaymentGateway::shared());
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }
    let app = build_router(state);

    // Create TCP listener
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the sweeper
    let _ = sweeper_shutdown.send(true);
    let timeout = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(timeout, sweeper_handle).await {
        Ok(Ok(())) => info!("Expiry sweeper stopped"),
        Ok(Err(e)) => warn!(error = %e, "Expiry sweeper task failed"),
        Err(_) => warn!(timeout_secs = timeout.as_secs(), "Expiry sweeper did not stop in time"),
    }

    info!("Server stopped");
    Ok(())
}
