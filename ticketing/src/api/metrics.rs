//! Prometheus scrape endpoint.
//!
//! - GET /metrics - Text exposition of every recorded metric

use crate::server::{ApiError, AppState};
use axum::{extract::State, http::StatusCode};

/// Render the Prometheus exposition.
///
/// # Errors
///
/// Returns 404 if the server was started without a metrics recorder.
pub async fn render_metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "METRICS_DISABLED",
                "metrics recorder is not installed",
            )
        })
}
