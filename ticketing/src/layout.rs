//! Venue seat map layout.
//!
//! The layout is the JSON document the seat selection page is drawn from:
//!
//! ```json
//! {"blocks": [{"name": "A", "rows": 10, "seats_per_row": 20, "price_rupees": 1500}]}
//! ```
//!
//! `price_rupees` is optional; blocks without one sell at the event's ticket
//! price.

use crate::inventory::BlockInventory;
use crate::types::{BlockId, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// Layout file could not be read
    #[error("failed to read layout {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Layout is not valid JSON for this schema
    #[error("invalid layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Layout has no blocks
    #[error("layout defines no blocks")]
    NoBlocks,

    /// Block has an empty name
    #[error("block names must not be empty")]
    UnnamedBlock,

    /// Two blocks share a name
    #[error("block '{0}' is defined more than once")]
    DuplicateBlock(String),

    /// Block has zero rows or zero seats per row
    #[error("block '{0}' has no seats")]
    EmptyBlock(String),

    /// Price does not fit in paise
    #[error("price for block '{0}' is too large")]
    PriceOverflow(String),
}

/// One rectangular block of seats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLayout {
    /// Block name, e.g. `A`
    pub name: String,
    /// Number of rows
    pub rows: u32,
    /// Seats in every row
    pub seats_per_row: u32,
    /// Unit price override in whole rupees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_rupees: Option<u64>,
}

/// Seat map for a whole venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueLayout {
    /// Blocks in display order
    pub blocks: Vec<BlockLayout>,
}

impl VenueLayout {
    /// The stadium layout the seat selection page ships with:
    /// A (10 × 20), B (8 × 25), C (6 × 30).
    #[must_use]
    pub fn stadium() -> Self {
        let block = |name: &str, rows, seats_per_row| BlockLayout {
            name: name.to_string(),
            rows,
            seats_per_row,
            price_rupees: None,
        };

        Self {
            blocks: vec![block("A", 10, 20), block("B", 8, 25), block("C", 6, 30)],
        }
    }

    /// Parse a layout from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the JSON is malformed or the layout is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read and validate a layout file.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check the structural rules: at least one block, unique non-empty
    /// names, no empty blocks.
    ///
    /// # Errors
    ///
    /// Returns the first rule violated.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.blocks.is_empty() {
            return Err(LayoutError::NoBlocks);
        }

        let mut seen = HashSet::new();
        for block in &self.blocks {
            if block.name.trim().is_empty() {
                return Err(LayoutError::UnnamedBlock);
            }
            if !seen.insert(block.name.as_str()) {
                return Err(LayoutError::DuplicateBlock(block.name.clone()));
            }
            if block.rows == 0 || block.seats_per_row == 0 {
                return Err(LayoutError::EmptyBlock(block.name.clone()));
            }
        }

        Ok(())
    }

    /// Build the seat tables for every block, in layout order.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the layout is invalid or a price overflows.
    pub fn build(&self, default_price: Money) -> Result<Vec<BlockInventory>, LayoutError> {
        self.validate()?;

        self.blocks
            .iter()
            .map(|block| {
                let price = match block.price_rupees {
                    Some(rupees) => Money::checked_from_rupees(rupees)
                        .ok_or_else(|| LayoutError::PriceOverflow(block.name.clone()))?,
                    None => default_price,
                };
                Ok(BlockInventory::new(
                    BlockId::new(block.name.clone()),
                    block.rows,
                    block.seats_per_row,
                    price,
                ))
            })
            .collect()
    }
}

impl Default for VenueLayout {
    fn default() -> Self {
        Self::stadium()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stadium_layout_has_three_blocks() {
        let blocks = VenueLayout::stadium().build(Money::from_rupees(1000)).unwrap();
        let capacities: Vec<(String, u32)> = blocks
            .iter()
            .map(|b| (b.id().to_string(), b.capacity()))
            .collect();
        assert_eq!(
            capacities,
            [("A".to_string(), 200), ("B".to_string(), 200), ("C".to_string(), 180)]
        );
    }

    #[test]
    fn price_override_applies_per_block() {
        let layout = VenueLayout::from_json_str(
            r#"{"blocks": [
                {"name": "VIP", "rows": 1, "seats_per_row": 2, "price_rupees": 5000},
                {"name": "G", "rows": 1, "seats_per_row": 2}
            ]}"#,
        )
        .unwrap();
        let blocks = layout.build(Money::from_rupees(1000)).unwrap();
        let now = chrono::Utc::now();

        assert_eq!(blocks[0].seat_views_at(now)[0].price, Money::from_rupees(5000));
        assert_eq!(blocks[1].seat_views_at(now)[0].price, Money::from_rupees(1000));
    }

    #[test]
    fn invalid_layouts_are_rejected() {
        assert!(matches!(
            VenueLayout::from_json_str(r#"{"blocks": []}"#),
            Err(LayoutError::NoBlocks)
        ));
        assert!(matches!(
            VenueLayout::from_json_str(
                r#"{"blocks": [{"name": "A", "rows": 1, "seats_per_row": 1},
                               {"name": "A", "rows": 2, "seats_per_row": 2}]}"#
            ),
            Err(LayoutError::DuplicateBlock(name)) if name == "A"
        ));
        assert!(matches!(
            VenueLayout::from_json_str(r#"{"blocks": [{"name": "A", "rows": 0, "seats_per_row": 5}]}"#),
            Err(LayoutError::EmptyBlock(_))
        ));
        assert!(matches!(
            VenueLayout::from_json_str(r#"{"blocks": [{"name": " ", "rows": 1, "seats_per_row": 5}]}"#),
            Err(LayoutError::UnnamedBlock)
        ));
        assert!(matches!(
            VenueLayout::from_json_str("not json"),
            Err(LayoutError::Json(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = VenueLayout::from_path("/definitely/not/here.json").unwrap_err();
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }
}
