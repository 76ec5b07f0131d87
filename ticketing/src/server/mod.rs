//! HTTP server module for the ticketing system.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Health check endpoints
//! - JSON error responses
//! - Router configuration
//! - Graceful shutdown handling

pub mod error;
pub mod health;
pub mod routes;
pub mod shutdown;
pub mod state;

pub use error::ApiError;
pub use health::health_check;
pub use routes::build_router;
pub use shutdown::shutdown_signal;
pub use state::AppState;
