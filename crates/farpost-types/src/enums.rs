//! Enumeration types for the Farpost economy.
//!
//! Closed sets shared by the engine, the notifier, and the wire protocol.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Interaction mode
// ---------------------------------------------------------------------------

/// What a click on a grid cell currently means for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum InteractionMode {
    /// Plain selection; clicking a cell inspects or collects it.
    #[default]
    Select,
    /// An expedition is selected and the next owned cell receives it.
    Deploy,
    /// A booster is selected and the next extracting cell receives it.
    ApplyBooster,
}

// ---------------------------------------------------------------------------
// Booster effect
// ---------------------------------------------------------------------------

/// How a booster acts on an extracting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BoosterEffect {
    /// Divides the remaining extraction time by the booster multiplier.
    #[default]
    Speed,
    /// Completes the extraction immediately.
    InstantComplete,
}

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The closed set of notifications the game session publishes.
///
/// Subscribers filter on these instead of on free-form event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// An expedition was bought.
    ExpeditionPurchased,
    /// A booster was bought.
    BoosterPurchased,
    /// A grid cell was bought.
    CellPurchased,
    /// An expedition started extracting on a cell.
    ExpeditionDeployed,
    /// A cell's extraction timer elapsed and the cell is ready.
    ExtractionComplete,
    /// A ready cell was collected into the resource inventory.
    ResourceCollected,
    /// Resources were sold for points.
    ResourcesSold,
    /// A speed booster was applied to a cell.
    BoosterApplied,
    /// An instant-completion booster was applied to a cell.
    InstantExtractApplied,
    /// The player reached a higher level.
    LevelUp,
    /// The selected expedition/booster or interaction mode changed.
    SelectionChanged,
    /// Any successful mutation of the player ledger.
    StateChanged,
    /// A persisted state was loaded into the session.
    StateLoaded,
    /// The session was reset to the initial state.
    StateReset,
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Wire-level classification of a rejected action.
///
/// Every engine failure maps to exactly one kind, so remote callers can branch
/// on it without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ErrorKind {
    /// A booster or other configuration key does not exist.
    InvalidConfigKey,
    /// The named resource type does not exist.
    UnknownResource,
    /// The player level is below the item's requirement.
    InsufficientLevel,
    /// The player cannot afford the purchase.
    InsufficientFunds,
    /// The booster is reward-only.
    NotPurchasable,
    /// The player already owns as many cells as the level allows.
    MaxCellsReached,
    /// The requested cell is already owned.
    CellAlreadyOwned,
    /// Every cell in the grid is already owned.
    NoCellsAvailable,
    /// The cell index is outside the grid.
    InvalidCellIndex,
    /// The cell is not owned by the player.
    CellNotOwned,
    /// The cell is extracting or holds an uncollected resource.
    CellBusy,
    /// No expedition of the requested type is in inventory.
    NoExpeditionInInventory,
    /// The cell has nothing ready to collect.
    NotReady,
    /// There are no resources to sell.
    NothingToSell,
    /// Fewer resources are held than the sale requested.
    InsufficientInventory,
    /// No booster of the requested type is in inventory.
    NoBoosterInInventory,
    /// The action named no item and nothing is selected.
    NothingSelected,
    /// The cell is not running an extraction.
    CellNotExtracting,
    /// The cell already has an unexpired booster effect.
    BoosterAlreadyActiveOnCell,
    /// The cell's resource tier exceeds what the booster can accelerate.
    TierTooHigh,
    /// The engine hit a bookkeeping fault; the state is unchanged.
    Internal,
}

// ---------------------------------------------------------------------------
// Load source
// ---------------------------------------------------------------------------

/// Which candidate a state load ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LoadSource {
    /// The primary persisted state passed validation.
    Primary,
    /// The primary state was rejected; the backup was used.
    Backup,
    /// Neither candidate was usable; a fresh state was created.
    Fresh,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_serialize_snake_case() {
        let json = serde_json::to_string(&ErrorKind::BoosterAlreadyActiveOnCell).unwrap_or_default();
        assert_eq!(json, "\"booster_already_active_on_cell\"");
    }

    #[test]
    fn default_mode_is_select() {
        assert_eq!(InteractionMode::default(), InteractionMode::Select);
    }

    #[test]
    fn event_kind_round_trips() {
        let parsed: Result<EventKind, _> = serde_json::from_str("\"level_up\"");
        assert_eq!(parsed.ok(), Some(EventKind::LevelUp));
    }
}
