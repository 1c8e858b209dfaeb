//! Conversion between [`PlayerLedger`] and the persisted state shape.
//!
//! Persisted state arrives from storage the engine does not control, so it is
//! treated as partially untrusted. [`parse_snapshot`] performs the structural
//! checks (required keys, non-negative scalars, an 18-cell grid with boolean
//! ownership) before deserializing. [`PlayerLedger::from_snapshot`] then
//! repairs inconsistencies that are recoverable, logging each repair.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use farpost_types::{Cell, GRID_SIZE, InteractionMode, PlayerSnapshot};

use crate::ledger::count_owned;
use crate::{PlayerLedger, SnapshotError};

/// Top-level keys every persisted state must carry.
const REQUIRED_FIELDS: [&str; 9] = [
    "level",
    "xp",
    "points",
    "ownedCells",
    "maxCells",
    "resources",
    "expeditions",
    "boosters",
    "cells",
];

/// Scalars that must be non-negative integers.
const NON_NEGATIVE_FIELDS: [&str; 3] = ["level", "xp", "points"];

/// Validate untrusted JSON and deserialize it into a [`PlayerSnapshot`].
pub fn parse_snapshot(value: &Value) -> Result<PlayerSnapshot, SnapshotError> {
    let object = value.as_object().ok_or(SnapshotError::NotAnObject)?;

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(SnapshotError::MissingField(field));
        }
    }

    for field in NON_NEGATIVE_FIELDS {
        if object.get(field).and_then(Value::as_u64).is_none() {
            return Err(SnapshotError::NotNonNegative { field });
        }
    }
    if object.get("level").and_then(Value::as_u64) == Some(0) {
        return Err(SnapshotError::LevelBelowOne);
    }

    let cells = object
        .get("cells")
        .and_then(Value::as_array)
        .ok_or(SnapshotError::CellsNotArray)?;
    if cells.len() != GRID_SIZE {
        return Err(SnapshotError::CellCount {
            found: cells.len(),
            expected: GRID_SIZE,
        });
    }
    for (index, cell) in cells.iter().enumerate() {
        if !cell.get("owned").is_some_and(Value::is_boolean) {
            return Err(SnapshotError::CellOwnedNotBoolean { index });
        }
    }

    Ok(serde_json::from_value(value.clone())?)
}

impl PlayerLedger {
    /// Produce the persisted state shape.
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            level: self.level,
            xp: self.xp,
            points: self.points,
            owned_cells: self.owned_cells,
            max_cells: self.max_cells,
            resources: self.resources.clone(),
            expeditions: self.expeditions.clone(),
            boosters: self.boosters.clone(),
            cells: self.cells.clone(),
            boosted_cells: self.boosted_cells.clone(),
            stats: self.stats.clone(),
        }
    }

    /// Rebuild a ledger from a persisted state.
    ///
    /// Structural problems fail; recoverable inconsistencies are repaired
    /// with a warning: mismatched cell ids, extraction state on unowned or
    /// half-populated cells, boosts on idle cells, and an `ownedCells` count
    /// that disagrees with the grid. The caller is responsible for
    /// recomputing the cell allowance from the level.
    pub fn from_snapshot(snapshot: PlayerSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.level == 0 {
            return Err(SnapshotError::LevelBelowOne);
        }
        if snapshot.cells.len() != GRID_SIZE {
            return Err(SnapshotError::CellCount {
                found: snapshot.cells.len(),
                expected: GRID_SIZE,
            });
        }

        let cells: Vec<Cell> = snapshot
            .cells
            .into_iter()
            .enumerate()
            .map(|(index, cell)| repair_cell(index, cell))
            .collect();

        let owned_cells = count_owned(&cells);
        if owned_cells != snapshot.owned_cells {
            warn!(
                stored = snapshot.owned_cells,
                actual = owned_cells,
                "Reconciling ownedCells with the grid"
            );
        }

        let boosted_cells: BTreeMap<_, _> = snapshot
            .boosted_cells
            .into_iter()
            .filter(|(index, _)| {
                let keep = cells.get(*index).is_some_and(Cell::is_extracting);
                if !keep {
                    warn!(cell = *index, "Dropping booster effect on idle cell");
                }
                keep
            })
            .collect();

        Ok(Self {
            level: snapshot.level,
            xp: snapshot.xp,
            points: snapshot.points,
            owned_cells,
            max_cells: snapshot.max_cells.max(owned_cells),
            resources: without_zeroes(snapshot.resources),
            expeditions: without_zeroes(snapshot.expeditions),
            boosters: without_zeroes(snapshot.boosters),
            cells,
            boosted_cells,
            selected_expedition: None,
            selected_booster: None,
            mode: InteractionMode::Select,
            speed_multiplier: 1,
            stats: snapshot.stats,
        })
    }

    /// Validate untrusted JSON and rebuild a ledger from it.
    pub fn from_json(value: &Value) -> Result<Self, SnapshotError> {
        Self::from_snapshot(parse_snapshot(value)?)
    }
}

fn repair_cell(index: usize, mut cell: Cell) -> Cell {
    if cell.id != index {
        warn!(index, stored_id = cell.id, "Correcting cell id");
        cell.id = index;
    }

    let has_any = cell.resource_type.is_some()
        || cell.extraction_start_time.is_some()
        || cell.extraction_end_time.is_some()
        || cell.is_ready;
    let complete = cell.resource_type.is_some()
        && cell.extraction_start_time.is_some()
        && cell.extraction_end_time.is_some();

    if has_any && (!cell.owned || !complete) {
        warn!(
            cell = index,
            owned = cell.owned,
            "Clearing inconsistent extraction state"
        );
        cell.clear_extraction();
    }
    cell
}

fn without_zeroes(map: BTreeMap<String, u32>) -> BTreeMap<String, u32> {
    map.into_iter().filter(|(_, qty)| *qty > 0).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn grid_json() -> Vec<Value> {
        (0..GRID_SIZE)
            .map(|i| json!({ "id": i, "owned": (7..=9).contains(&i) }))
            .collect()
    }

    fn state_json() -> Value {
        json!({
            "level": 2, "xp": 350, "points": 420,
            "ownedCells": 3, "maxCells": 4,
            "resources": { "Iron Ore": 3, "Silicon": 0 },
            "expeditions": { "Lunar Regolith": 1 },
            "boosters": {},
            "cells": grid_json(),
        })
    }

    #[test]
    fn valid_state_loads() {
        let ledger = PlayerLedger::from_json(&state_json());
        assert!(ledger.is_ok());
        let ledger = ledger.ok();
        assert_eq!(ledger.as_ref().map(PlayerLedger::points), Some(420));
        assert_eq!(ledger.as_ref().map(PlayerLedger::owned_cells), Some(3));
        // Zero entries are dropped on load.
        assert_eq!(
            ledger.map(|l| l.resources.contains_key("Silicon")),
            Some(false)
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut state = state_json();
        if let Some(object) = state.as_object_mut() {
            object.remove("boosters");
        }
        assert!(matches!(
            parse_snapshot(&state),
            Err(SnapshotError::MissingField("boosters"))
        ));
    }

    #[test]
    fn negative_points_are_rejected() {
        let mut state = state_json();
        state["points"] = json!(-5);
        assert!(matches!(
            parse_snapshot(&state),
            Err(SnapshotError::NotNonNegative { field: "points" })
        ));
    }

    #[test]
    fn zero_level_is_rejected() {
        let mut state = state_json();
        state["level"] = json!(0);
        assert!(matches!(
            parse_snapshot(&state),
            Err(SnapshotError::LevelBelowOne)
        ));
    }

    #[test]
    fn short_grid_is_rejected() {
        let mut state = state_json();
        state["cells"] = json!([{ "id": 0, "owned": true }]);
        assert!(matches!(
            parse_snapshot(&state),
            Err(SnapshotError::CellCount { found: 1, .. })
        ));
    }

    #[test]
    fn non_boolean_owned_is_rejected() {
        let mut state = state_json();
        state["cells"][4] = json!({ "id": 4, "owned": "yes" });
        assert!(matches!(
            parse_snapshot(&state),
            Err(SnapshotError::CellOwnedNotBoolean { index: 4 })
        ));
    }

    #[test]
    fn owned_count_is_reconciled() {
        let mut state = state_json();
        state["ownedCells"] = json!(11);
        let ledger = PlayerLedger::from_json(&state).ok();
        assert_eq!(ledger.map(|l| l.owned_cells()), Some(3));
    }

    #[test]
    fn extraction_on_unowned_cell_is_cleared() {
        let mut state = state_json();
        state["cells"][0] = json!({
            "id": 0, "owned": false, "resourceType": "Iron Ore",
            "extractionStartTime": 1, "extractionEndTime": 2, "isReady": true,
        });
        let ledger = PlayerLedger::from_json(&state).ok();
        let cell = ledger.as_ref().and_then(|l| l.cell(0)).cloned();
        assert_eq!(cell, Some(Cell::new(0, false)));
    }

    #[test]
    fn snapshot_round_trips() {
        let mut ledger = PlayerLedger::fresh(1000, &[7, 8, 9], 3);
        assert!(ledger.start_extraction(8, "Water Ice", 5_000, 245_000).is_ok());
        let restored = PlayerLedger::from_snapshot(ledger.snapshot());
        assert_eq!(restored.ok().map(|l| l.snapshot()), Some(ledger.snapshot()));
    }
}
