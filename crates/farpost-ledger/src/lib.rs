//! In-memory player ledger for the Farpost mining economy.
//!
//! The ledger is the complete economic state of one player: level, experience,
//! points, the 18-cell extraction grid, the three inventories, active booster
//! effects, the current selection, and lifetime statistics. It knows nothing
//! about prices or timers; the economy engine decides *what* changes and the
//! ledger makes the change while holding its invariants.
//!
//! # Invariants
//!
//! - Points, experience, and inventory counts never go negative. Attempts to
//!   drive them below zero clamp to zero and log a warning instead of
//!   failing.
//! - `owned_cells` always equals the number of owned cells in the grid.
//! - A cell, once owned, is never released.
//! - Extraction timestamps are present only while a cell is extracting or
//!   holds an uncollected result.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`PlayerLedger`] struct and its guarded mutations.
//! - [`inventory`] -- Checked add/remove helpers for counted inventories.
//! - [`snapshot`] -- Conversion to and from the persisted state shape,
//!   including validation of untrusted input.

pub mod inventory;
pub mod ledger;
pub mod snapshot;

pub use ledger::{Holding, PlayerLedger};
pub use snapshot::parse_snapshot;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from ledger mutations.
///
/// These indicate a caller bug (the economy engine validates player input
/// before touching the ledger), never a player mistake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The cell index is outside the grid.
    #[error("cell index {index} is outside the grid")]
    CellOutOfRange {
        /// The rejected index.
        index: usize,
    },

    /// The cell is already owned.
    #[error("cell {index} is already owned")]
    CellAlreadyOwned {
        /// The cell index.
        index: usize,
    },

    /// Adding to an inventory would overflow its counter.
    #[error("inventory overflow for {item}: {current} + {attempted}")]
    InventoryOverflow {
        /// The item whose count would overflow.
        item: String,
        /// Count held before the addition.
        current: u32,
        /// Units that were being added.
        attempted: u32,
    },
}

/// Errors from loading a persisted player state.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The top-level value is not a JSON object.
    #[error("persisted state is not an object")]
    NotAnObject,

    /// A required top-level key is absent.
    #[error("persisted state is missing required field `{0}`")]
    MissingField(&'static str),

    /// A numeric field is negative, fractional, or not a number.
    #[error("persisted field `{field}` must be a non-negative integer")]
    NotNonNegative {
        /// The offending field.
        field: &'static str,
    },

    /// The stored level is zero.
    #[error("persisted level must be at least 1")]
    LevelBelowOne,

    /// `cells` is not an array.
    #[error("persisted `cells` is not an array")]
    CellsNotArray,

    /// The grid does not have exactly the expected number of cells.
    #[error("persisted grid has {found} cells, expected {expected}")]
    CellCount {
        /// Number of cells found.
        found: usize,
        /// Number of cells required.
        expected: usize,
    },

    /// A cell lacks a boolean `owned` field.
    #[error("persisted cell {index} has no boolean `owned` field")]
    CellOwnedNotBoolean {
        /// Position of the cell in the array.
        index: usize,
    },

    /// The state passed the structural checks but did not deserialize.
    #[error("malformed persisted state: {0}")]
    Malformed(#[from] serde_json::Error),
}
