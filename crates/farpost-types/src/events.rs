//! Notifications published by a game session.
//!
//! Each variant carries the data a UI or backend needs to react to the change
//! without re-reading the whole player state. [`GameEvent::kind`] gives the
//! closed [`EventKind`] used for subscription filtering.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::actions::{
    BoosterApplication, BoosterPurchase, CellPurchase, Collection, Deployment, ExpeditionPurchase,
    Sale,
};
use crate::enums::{EventKind, InteractionMode, LoadSource};

/// A single notification emitted after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameEvent {
    /// An expedition was bought.
    ExpeditionPurchased(ExpeditionPurchase),
    /// A booster was bought.
    BoosterPurchased(BoosterPurchase),
    /// A grid cell was bought.
    CellPurchased(CellPurchase),
    /// An expedition started extracting.
    ExpeditionDeployed(Deployment),
    /// An extraction timer elapsed; the cell is ready to collect.
    ExtractionComplete {
        /// The completed cell.
        #[serde(rename = "cellIndex")]
        cell_index: usize,
        /// Resource awaiting collection.
        #[serde(rename = "resourceType")]
        resource_type: String,
    },
    /// A ready cell was collected.
    ResourceCollected(Collection),
    /// Resources were sold.
    ResourcesSold(Sale),
    /// A speed booster shortened an extraction.
    BoosterApplied(BoosterApplication),
    /// An instant-completion booster finished an extraction.
    InstantExtractApplied(BoosterApplication),
    /// The player reached a higher level.
    LevelUp {
        /// Level before the experience grant.
        #[serde(rename = "oldLevel")]
        old_level: u32,
        /// Level after the experience grant.
        #[serde(rename = "newLevel")]
        new_level: u32,
        /// Ownable cells at the new level.
        #[serde(rename = "maxCells")]
        max_cells: u32,
    },
    /// The player's selection or interaction mode changed.
    SelectionChanged {
        /// Current interaction mode.
        mode: InteractionMode,
        /// Selected expedition resource type.
        #[serde(rename = "selectedExpedition")]
        selected_expedition: Option<String>,
        /// Selected booster type.
        #[serde(rename = "selectedBooster")]
        selected_booster: Option<String>,
    },
    /// The player ledger changed.
    StateChanged,
    /// A persisted state was loaded.
    StateLoaded {
        /// Which candidate was used.
        source: LoadSource,
    },
    /// The session was reset to a fresh state.
    StateReset,
}

impl GameEvent {
    /// The subscription kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ExpeditionPurchased(_) => EventKind::ExpeditionPurchased,
            Self::BoosterPurchased(_) => EventKind::BoosterPurchased,
            Self::CellPurchased(_) => EventKind::CellPurchased,
            Self::ExpeditionDeployed(_) => EventKind::ExpeditionDeployed,
            Self::ExtractionComplete { .. } => EventKind::ExtractionComplete,
            Self::ResourceCollected(_) => EventKind::ResourceCollected,
            Self::ResourcesSold(_) => EventKind::ResourcesSold,
            Self::BoosterApplied(_) => EventKind::BoosterApplied,
            Self::InstantExtractApplied(_) => EventKind::InstantExtractApplied,
            Self::LevelUp { .. } => EventKind::LevelUp,
            Self::SelectionChanged { .. } => EventKind::SelectionChanged,
            Self::StateChanged => EventKind::StateChanged,
            Self::StateLoaded { .. } => EventKind::StateLoaded,
            Self::StateReset => EventKind::StateReset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_event_serializes_with_kind_only() {
        let value = serde_json::to_value(GameEvent::StateChanged).unwrap_or_default();
        assert_eq!(value, serde_json::json!({ "kind": "state_changed" }));
    }

    #[test]
    fn level_up_carries_camel_case_data() {
        let event = GameEvent::LevelUp {
            old_level: 1,
            new_level: 2,
            max_cells: 5,
        };
        let value = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(
            value,
            serde_json::json!({
                "kind": "level_up",
                "data": { "oldLevel": 1, "newLevel": 2, "maxCells": 5 }
            })
        );
        assert_eq!(event.kind(), EventKind::LevelUp);
    }

    #[test]
    fn kind_matches_serialized_tag() {
        let event = GameEvent::ExtractionComplete {
            cell_index: 8,
            resource_type: "Iron Ore".to_owned(),
        };
        let tag = serde_json::to_value(&event)
            .ok()
            .and_then(|v| v.get("kind").cloned())
            .unwrap_or_default();
        let kind = serde_json::to_value(event.kind()).unwrap_or_default();
        assert_eq!(tag, kind);
    }
}
