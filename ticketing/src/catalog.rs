//! Event catalogue: every match on sale, each with its own seat inventory.
//!
//! Seats of different events never interact, so each event gets its own
//! [`SeatHoldManager`] and the catalogue only routes to it. Hold and booking
//! ids are unique across events.
//!
//! Catalogue file (`EVENTS_PATH`):
//!
//! ```json
//! {"events": [{
//!     "id": "india-vs-australia",
//!     "name": "India vs Australia",
//!     "starts_at": "2025-11-05T12:30:00Z",
//!     "stadium": "Chinnaswamy Stadium",
//!     "ticket_price_rupees": 2500,
//!     "layout": {"blocks": [{"name": "A", "rows": 10, "seats_per_row": 20}]}
//! }]}
//! ```
//!
//! `stadium`, `is_active` (default `true`) and `layout` (default: the stadium
//! layout) are optional.

use crate::error::{Result, SeatHoldError};
use crate::layout::{LayoutError, VenueLayout};
use crate::manager::SeatHoldManager;
use crate::types::{Booking, BookingId, Event, EventId, HoldPolicy, HolderId, Money};
use chrono::{DateTime, Utc};
use govvens_core::environment::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Venue used when an event does not name one
pub const DEFAULT_STADIUM: &str = "Chinnaswamy Stadium";

/// Errors raised while building the catalogue.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalogue file could not be read
    #[error("failed to read event catalogue {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalogue is not valid JSON for this schema
    #[error("invalid event catalogue JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Event id is empty or not URL-safe
    #[error("event id '{0}' must be non-empty and contain only letters, digits, '-' or '_'")]
    InvalidEventId(String),

    /// Two events share an id
    #[error("event '{0}' is defined more than once")]
    DuplicateEvent(EventId),

    /// Ticket price does not fit in paise
    #[error("ticket price for event '{0}' is too large")]
    PriceOverflow(EventId),

    /// Event layout is invalid
    #[error("layout for event '{event}': {source}")]
    Layout {
        /// Event whose layout failed
        event: EventId,
        /// Underlying error
        #[source]
        source: LayoutError,
    },
}

/// One event as written in the catalogue file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Event slug
    pub id: String,
    /// Display name
    pub name: String,
    /// Scheduled start
    pub starts_at: DateTime<Utc>,
    /// Venue name
    #[serde(default = "default_stadium")]
    pub stadium: String,
    /// Seat price in whole rupees
    pub ticket_price_rupees: u64,
    /// Whether the event is on sale
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Seat layout; the stadium layout when absent
    #[serde(default)]
    pub layout: Option<VenueLayout>,
}

fn default_stadium() -> String {
    DEFAULT_STADIUM.to_string()
}

const fn default_active() -> bool {
    true
}

impl EventDefinition {
    fn into_event(self) -> std::result::Result<(Event, VenueLayout), CatalogError> {
        let id = parse_event_id(&self.id)?;
        let ticket_price = Money::checked_from_rupees(self.ticket_price_rupees)
            .ok_or_else(|| CatalogError::PriceOverflow(id.clone()))?;

        let event = Event {
            id,
            name: self.name,
            starts_at: self.starts_at,
            stadium: self.stadium,
            ticket_price,
            is_active: self.is_active,
        };
        Ok((event, self.layout.unwrap_or_else(VenueLayout::stadium)))
    }
}

/// Validate an event slug.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidEventId`] for empty or non URL-safe slugs.
pub fn parse_event_id(slug: &str) -> std::result::Result<EventId, CatalogError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(EventId::new(slug))
    } else {
        Err(CatalogError::InvalidEventId(slug.to_string()))
    }
}

/// The catalogue file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Events in any order
    pub events: Vec<EventDefinition>,
}

impl CatalogFile {
    /// Parse a catalogue from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if the document does not match the schema.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a catalogue file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Listing entry: the event plus how many seats are left.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// The event
    #[serde(flatten)]
    pub event: Event,
    /// Seats in the venue
    pub capacity: u32,
    /// Seats free to hold right now
    pub available: u32,
}

#[derive(Debug)]
struct EventEntry {
    event: Event,
    manager: Arc<SeatHoldManager>,
}

/// Every event on the books, keyed by id.
///
/// Built at startup; lookups take `&self`. Inactive events stay in the
/// catalogue (their holds are still swept) but are invisible to customers.
pub struct EventCatalog {
    events: BTreeMap<EventId, EventEntry>,
    policy: HoldPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EventCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCatalog")
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl EventCatalog {
    /// Creates an empty catalogue. Every event added gets `policy` and `clock`.
    #[must_use]
    pub fn new(policy: HoldPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            events: BTreeMap::new(),
            policy,
            clock,
        }
    }

    /// Build a catalogue from file definitions.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] raised by a definition.
    pub fn from_definitions(
        definitions: Vec<EventDefinition>,
        policy: HoldPolicy,
        clock: Arc<dyn Clock>,
    ) -> std::result::Result<Self, CatalogError> {
        let mut catalog = Self::new(policy, clock);
        for definition in definitions {
            let (event, layout) = definition.into_event()?;
            catalog.add_event(event, &layout)?;
        }
        Ok(catalog)
    }

    /// Put an event on the books with its own seat inventory. Blocks without
    /// a price sell at the event's ticket price.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateEvent`] if the id is taken
    /// - [`CatalogError::Layout`] if the layout is invalid
    pub fn add_event(
        &mut self,
        event: Event,
        layout: &VenueLayout,
    ) -> std::result::Result<Arc<SeatHoldManager>, CatalogError> {
        if self.events.contains_key(&event.id) {
            return Err(CatalogError::DuplicateEvent(event.id));
        }

        let manager = SeatHoldManager::from_layout(
            event.id.clone(),
            layout,
            event.ticket_price,
            self.policy,
            Arc::clone(&self.clock),
        )
        .map_err(|source| CatalogError::Layout {
            event: event.id.clone(),
            source,
        })?;
        let manager = Arc::new(manager);

        tracing::info!(
            event = %event.id,
            name = %event.name,
            starts_at = %event.starts_at,
            active = event.is_active,
            blocks = manager.block_ids().len(),
            "Event added to catalogue"
        );
        self.events.insert(
            event.id.clone(),
            EventEntry {
                event,
                manager: Arc::clone(&manager),
            },
        );
        Ok(manager)
    }

    /// The hold policy every event uses
    #[must_use]
    pub const fn policy(&self) -> &HoldPolicy {
        &self.policy
    }

    /// Current time according to the injected clock
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Number of events, active or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalogue has no events at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn active(&self, id: &EventId) -> Result<&EventEntry> {
        self.events
            .get(id)
            .filter(|entry| entry.event.is_active)
            .ok_or_else(|| SeatHoldError::UnknownEvent { event: id.clone() })
    }

    /// Active events, soonest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .values()
            .filter(|entry| entry.event.is_active)
            .map(|entry| entry.event.clone())
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Active events with their remaining seats, soonest first.
    #[must_use]
    pub fn summaries(&self) -> Vec<EventSummary> {
        self.events()
            .into_iter()
            .filter_map(|event| {
                let manager = &self.events.get(&event.id)?.manager;
                let (capacity, available) = manager
                    .venue_availability()
                    .iter()
                    .fold((0, 0), |(c, a), block| (c + block.capacity, a + block.available));
                Some(EventSummary {
                    event,
                    capacity,
                    available,
                })
            })
            .collect()
    }

    /// An active event.
    ///
    /// # Errors
    ///
    /// Returns [`SeatHoldError::UnknownEvent`] if the event is unknown or inactive.
    pub fn event(&self, id: &EventId) -> Result<Event> {
        self.active(id).map(|entry| entry.event.clone())
    }

    /// Seat hold manager of an active event.
    ///
    /// # Errors
    ///
    /// Returns [`SeatHoldError::UnknownEvent`] if the event is unknown or inactive.
    pub fn manager(&self, id: &EventId) -> Result<Arc<SeatHoldManager>> {
        self.active(id).map(|entry| Arc::clone(&entry.manager))
    }

    /// Sweep expired holds in every event, active or not.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        self.events
            .values()
            .map(|entry| entry.manager.sweep_expired(now))
            .sum()
    }

    /// Registered holds across every event, counting unswept expired ones.
    #[must_use]
    pub fn registered_holds(&self) -> usize {
        self.events
            .values()
            .map(|entry| entry.manager.registered_holds())
            .sum()
    }

    /// A booking from any event.
    #[must_use]
    pub fn booking(&self, booking_id: &BookingId) -> Option<Booking> {
        self.events
            .values()
            .find_map(|entry| entry.manager.booking(booking_id))
    }

    /// A holder's bookings across every event, newest first, at most `limit`.
    #[must_use]
    pub fn bookings_for(&self, holder: &HolderId, limit: usize) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .events
            .values()
            .flat_map(|entry| entry.manager.bookings_for(holder, limit))
            .collect();
        bookings.sort_by(|a, b| b.finalized_at.cmp(&a.finalized_at));
        bookings.truncate(limit);
        bookings
    }
}
