//! Configuration management for the ticketing application.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that parse but make no sense (a zero-length hold) are rejected
//! when the derived settings are built.

use crate::catalog::{CatalogError, CatalogFile, DEFAULT_STADIUM, EventCatalog, parse_event_id};
use crate::layout::{LayoutError, VenueLayout};
use crate::types::{Event, HoldPolicy, Money};
use chrono::{DateTime, Utc};
use govvens_core::environment::Clock;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Longest hold a venue may configure: one day.
pub const MAX_HOLD_DURATION_SECS: u64 = 86_400;

/// Configuration values that cannot be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Hold window is zero or longer than [`MAX_HOLD_DURATION_SECS`]
    #[error("HOLD_DURATION_SECS must be between 1 and {max}, got {value}")]
    HoldDuration {
        /// Configured value
        value: u64,
        /// Upper bound
        max: u64,
    },

    /// A hold must be allowed at least one seat
    #[error("MAX_SEATS_PER_HOLD must be at least 1")]
    MaxSeatsPerHold,

    /// Venue layout or price problem
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Event catalogue problem
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hold policy and sweeper
    pub holds: HoldConfig,
    /// Venue layout and pricing
    pub venue: VenueConfig,
    /// Application server configuration
    pub server: ServerConfig,
    /// Deployment runner configuration
    pub deploy: DeployConfig,
}

/// Hold configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// How long a hold lasts, in seconds (default: 15 minutes)
    pub hold_duration_secs: u64,
    /// Maximum seats in a single hold request
    pub max_seats_per_hold: usize,
    /// Interval between expiry sweeps, in seconds
    pub sweep_interval_secs: u64,
}

/// Venue and event configuration.
///
/// With `EVENTS_PATH` set the catalogue file lists every event; otherwise a
/// single event is built from the remaining fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Event catalogue JSON file
    pub events_path: Option<PathBuf>,
    /// Layout JSON file for the single event; the stadium layout when unset
    pub layout_path: Option<PathBuf>,
    /// Single event slug
    pub event_id: String,
    /// Single event name
    pub event_name: String,
    /// Single event start
    pub event_starts_at: DateTime<Utc>,
    /// Single event venue
    pub stadium: String,
    /// Single event ticket price in whole rupees
    pub ticket_price_rupees: u64,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Deployment runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Requirements file to normalise and install
    pub requirements: PathBuf,
    /// Python interpreter
    pub python: String,
    /// pip executable
    pub pip: String,
    /// Django management script
    pub manage_py: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            holds: HoldConfig {
                hold_duration_secs: parse_var(&lookup, "HOLD_DURATION_SECS").unwrap_or(900), // 15 minutes
                max_seats_per_hold: parse_var(&lookup, "MAX_SEATS_PER_HOLD").unwrap_or(10),
                sweep_interval_secs: parse_var(&lookup, "SWEEP_INTERVAL_SECS").unwrap_or(30),
            },
            venue: VenueConfig {
                events_path: path_var(&lookup, "EVENTS_PATH"),
                layout_path: path_var(&lookup, "VENUE_LAYOUT_PATH"),
                event_id: lookup("EVENT_ID").unwrap_or_else(|| "india-vs-australia".to_string()),
                event_name: lookup("EVENT_NAME").unwrap_or_else(|| "India vs Australia".to_string()),
                event_starts_at: parse_var(&lookup, "EVENT_STARTS_AT")
                    .unwrap_or_else(default_event_start),
                stadium: lookup("STADIUM").unwrap_or_else(|| DEFAULT_STADIUM.to_string()),
                ticket_price_rupees: parse_var(&lookup, "TICKET_PRICE_RUPEES").unwrap_or(1000),
            },
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&lookup, "PORT").unwrap_or(8080),
                log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
                shutdown_timeout: parse_var(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            deploy: DeployConfig {
                requirements: lookup("DEPLOY_REQUIREMENTS")
                    .map_or_else(|| PathBuf::from("requirements.txt"), PathBuf::from),
                python: lookup("DEPLOY_PYTHON").unwrap_or_else(|| "python".to_string()),
                pip: lookup("DEPLOY_PIP").unwrap_or_else(|| "pip".to_string()),
                manage_py: lookup("DEPLOY_MANAGE_PY")
                    .map_or_else(|| PathBuf::from("manage.py"), PathBuf::from),
            },
        }
    }

    /// Hold policy derived from the hold settings
    ///
    /// # Errors
    ///
    /// - [`ConfigError::HoldDuration`] unless the window is 1s to one day
    /// - [`ConfigError::MaxSeatsPerHold`] if zero seats are allowed
    pub fn hold_policy(&self) -> Result<HoldPolicy, ConfigError> {
        let value = self.holds.hold_duration_secs;
        if !(1..=MAX_HOLD_DURATION_SECS).contains(&value) {
            return Err(ConfigError::HoldDuration {
                value,
                max: MAX_HOLD_DURATION_SECS,
            });
        }
        if self.holds.max_seats_per_hold == 0 {
            return Err(ConfigError::MaxSeatsPerHold);
        }

        let seconds = i64::try_from(value).map_err(|_| ConfigError::HoldDuration {
            value,
            max: MAX_HOLD_DURATION_SECS,
        })?;
        Ok(HoldPolicy::new(
            chrono::Duration::seconds(seconds),
            self.holds.max_seats_per_hold,
        ))
    }

    /// Sweep interval, never shorter than one second
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.holds.sweep_interval_secs.max(1))
    }

    /// Event ticket price
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::PriceOverflow`] if the price does not fit in paise.
    pub fn ticket_price(&self) -> Result<Money, LayoutError> {
        Money::checked_from_rupees(self.venue.ticket_price_rupees)
            .ok_or_else(|| LayoutError::PriceOverflow("event".to_string()))
    }

    /// Load the configured venue layout, or the stadium layout when none is set
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the layout file cannot be read or is invalid.
    pub fn load_layout(&self) -> Result<VenueLayout, LayoutError> {
        match &self.venue.layout_path {
            Some(path) => VenueLayout::from_path(path),
            None => Ok(VenueLayout::stadium()),
        }
    }

    /// The single event described by the `EVENT_*` settings
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the slug or price is unusable.
    pub fn default_event(&self) -> Result<Event, ConfigError> {
        Ok(Event {
            id: parse_event_id(&self.venue.event_id)?,
            name: self.venue.event_name.clone(),
            starts_at: self.venue.event_starts_at,
            stadium: self.venue.stadium.clone(),
            ticket_price: self.ticket_price()?,
            is_active: true,
        })
    }

    /// Build the event catalogue: every event in `EVENTS_PATH`, or the
    /// single configured event.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the hold policy, a layout or the catalogue
    /// is invalid.
    pub fn load_catalog(&self, clock: Arc<dyn Clock>) -> Result<EventCatalog, ConfigError> {
        let policy = self.hold_policy()?;
        if let Some(path) = &self.venue.events_path {
            let file = CatalogFile::from_path(path)?;
            return Ok(EventCatalog::from_definitions(file.events, policy, clock)?);
        }

        let mut catalog = EventCatalog::new(policy, clock);
        catalog.add_event(self.default_event()?, &self.load_layout()?)?;
        Ok(catalog)
    }

    /// Socket address string for the HTTP listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 2025-11-05 18:00 IST
fn default_event_start() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_762_345_800)
}

fn path_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<PathBuf> {
    lookup(key).filter(|s| !s.trim().is_empty()).map(PathBuf::from)
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}
