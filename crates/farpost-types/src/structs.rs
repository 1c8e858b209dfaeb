//! Core data structures for the Farpost economy.
//!
//! These mirror the persisted state shape exchanged with the browser client
//! and the backend, so every struct uses `camelCase` field names on the wire.
//! Timestamps are Unix epoch milliseconds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of cells in the extraction grid.
pub const GRID_SIZE: usize = 18;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One slot of the extraction grid.
///
/// A cell carries extraction timestamps if and only if it is extracting or
/// holds a completed extraction that has not been collected yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Grid index, `0..GRID_SIZE`.
    pub id: usize,
    /// Whether the player has bought this cell. Never reverts.
    pub owned: bool,
    /// Resource currently being extracted (or ready to collect).
    #[serde(default)]
    pub resource_type: Option<String>,
    /// When the running extraction started.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub extraction_start_time: Option<i64>,
    /// When the running extraction finishes.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub extraction_end_time: Option<i64>,
    /// Extraction finished and the resource awaits collection.
    #[serde(default)]
    pub is_ready: bool,
}

impl Cell {
    /// Create an idle cell.
    pub const fn new(id: usize, owned: bool) -> Self {
        Self {
            id,
            owned,
            resource_type: None,
            extraction_start_time: None,
            extraction_end_time: None,
            is_ready: false,
        }
    }

    /// The cell is running an extraction that has not completed.
    pub const fn is_extracting(&self) -> bool {
        self.extraction_start_time.is_some() && !self.is_ready
    }

    /// The cell cannot accept a new deployment (extracting or holding a
    /// ready resource).
    pub const fn is_busy(&self) -> bool {
        self.extraction_start_time.is_some() || self.is_ready
    }

    /// Drop all extraction state, leaving ownership untouched.
    pub fn clear_extraction(&mut self) {
        self.resource_type = None;
        self.extraction_start_time = None;
        self.extraction_end_time = None;
        self.is_ready = false;
    }
}

// ---------------------------------------------------------------------------
// Booster effect on a cell
// ---------------------------------------------------------------------------

/// A speed booster applied to a cell and the end of its effect window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActiveBoost {
    /// Booster type that was applied.
    pub booster_type: String,
    /// When the effect window closes.
    #[ts(type = "number")]
    pub expires_at: i64,
}

impl ActiveBoost {
    /// Whether the effect window is still open at `now`.
    pub const fn is_active(&self, now: i64) -> bool {
        self.expires_at > now
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Lifetime counters for one player.
///
/// Achievement tracking consumes these; the engine only increments them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerStats {
    /// Expeditions bought.
    pub expeditions_purchased: u32,
    /// Expeditions deployed onto cells.
    pub expeditions_deployed: u32,
    /// Boosters bought.
    pub boosters_purchased: u32,
    /// Boosters consumed (speed and instant).
    pub boosters_used: u32,
    /// Resources collected from ready cells.
    pub resources_collected: u32,
    /// Resource units sold.
    pub resources_sold: u32,
    /// Cells bought.
    pub cells_purchased: u32,
    /// Points spent on purchases.
    #[ts(type = "number")]
    pub points_spent: u64,
    /// Rare Earth Elements collected.
    pub rare_resources_collected: u32,
    /// Platinum Group Metals collected.
    pub platinum_resources_collected: u32,
    /// Helium-3 collected.
    pub helium_resources_collected: u32,
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// The persisted player state: what is saved and what a loader restores.
///
/// `boostedCells` and `stats` are optional on input so older saves load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerSnapshot {
    /// Player level, at least 1.
    pub level: u32,
    /// Cumulative experience points.
    #[ts(type = "number")]
    pub xp: u64,
    /// Spendable currency.
    #[ts(type = "number")]
    pub points: u64,
    /// Number of owned cells.
    pub owned_cells: u32,
    /// Maximum ownable cells at the current level.
    pub max_cells: u32,
    /// Collected resources held, by resource type.
    pub resources: BTreeMap<String, u32>,
    /// Undeployed expeditions held, by resource type.
    pub expeditions: BTreeMap<String, u32>,
    /// Unused boosters held, by booster type.
    pub boosters: BTreeMap<String, u32>,
    /// The full grid, exactly [`GRID_SIZE`] entries.
    pub cells: Vec<Cell>,
    /// Active booster effects keyed by cell index.
    #[serde(default)]
    pub boosted_cells: BTreeMap<usize, ActiveBoost>,
    /// Lifetime counters.
    #[serde(default)]
    pub stats: PlayerStats,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// How far along a running extraction is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ExtractionProgress {
    /// The extracting cell.
    pub cell_index: usize,
    /// Resource being extracted.
    pub resource_type: String,
    /// Completion percentage, 0 to 100.
    pub progress_pct: u8,
    /// Milliseconds until the extraction completes.
    #[ts(type = "number")]
    pub time_remaining_ms: i64,
    /// Full extraction length in milliseconds.
    #[ts(type = "number")]
    pub total_time_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_cell_is_not_busy() {
        let cell = Cell::new(3, true);
        assert!(!cell.is_busy());
        assert!(!cell.is_extracting());
    }

    #[test]
    fn ready_cell_is_busy_but_not_extracting() {
        let mut cell = Cell::new(7, true);
        cell.resource_type = Some("Iron Ore".to_owned());
        cell.extraction_start_time = Some(1_000);
        cell.extraction_end_time = Some(61_000);
        cell.is_ready = true;
        assert!(cell.is_busy());
        assert!(!cell.is_extracting());

        cell.clear_extraction();
        assert_eq!(cell, Cell::new(7, true));
    }

    #[test]
    fn cell_uses_camel_case_on_the_wire() {
        let cell = Cell::new(0, false);
        let value = serde_json::to_value(&cell).unwrap_or_default();
        assert!(value.get("extractionStartTime").is_some());
        assert!(value.get("isReady").is_some());
    }

    #[test]
    fn snapshot_without_optional_sections_parses() {
        let cells: Vec<serde_json::Value> = (0..GRID_SIZE)
            .map(|i| serde_json::json!({ "id": i, "owned": i == 7 }))
            .collect();
        let raw = serde_json::json!({
            "level": 1, "xp": 0, "points": 1000, "ownedCells": 1, "maxCells": 3,
            "resources": {}, "expeditions": {}, "boosters": {}, "cells": cells,
        });
        let parsed: Result<PlayerSnapshot, _> = serde_json::from_value(raw);
        assert!(parsed.is_ok());
        let snapshot = parsed.ok();
        assert_eq!(snapshot.map(|s| s.stats), Some(PlayerStats::default()));
    }

    #[test]
    fn boost_activity_is_strict() {
        let boost = ActiveBoost {
            booster_type: "Basic Booster".to_owned(),
            expires_at: 5_000,
        };
        assert!(boost.is_active(4_999));
        assert!(!boost.is_active(5_000));
    }
}
