//! Application state for the ticketing HTTP server.
//!
//! Contains the shared resources needed by HTTP handlers:
//! - Event catalogue (one seat hold manager per event)
//! - Payment gateway (for checkout)
//! - Prometheus handle (for `/metrics`)

use crate::catalog::EventCatalog;
use crate::payment::PaymentGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Every event on sale
    pub catalog: Arc<EventCatalog>,

    /// Payment gateway used by checkout
    pub payment_gateway: Arc<dyn PaymentGateway>,

    /// Prometheus renderer; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state without a metrics endpoint.
    #[must_use]
    pub fn new(catalog: Arc<EventCatalog>, payment_gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            catalog,
            payment_gateway,
            metrics: None,
        }
    }

    /// Serve `handle` at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
