//! Error types for the economy engine.
//!
//! [`EconomyError`] is the player-facing rejection of an action. Each variant
//! maps to exactly one wire-level [`ErrorKind`] and carries the figures a
//! client needs to explain the rejection. A rejected action never mutates the
//! ledger.

use farpost_ledger::LedgerError;
use farpost_types::{ActionFailure, ErrorKind};

/// Reasons an economy action was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// The resource type is not in the catalog.
    #[error("unknown resource type: {name}")]
    UnknownResource {
        /// The rejected name.
        name: String,
    },

    /// The booster type is not in the catalog.
    #[error("unknown booster type: {name}")]
    UnknownBooster {
        /// The rejected name.
        name: String,
    },

    /// A cell or inventory refers to a resource the catalog no longer has.
    #[error("cell {index} holds resource {name}, which is not in the catalog")]
    StaleResource {
        /// The cell holding the stale resource.
        index: usize,
        /// The stale name.
        name: String,
    },

    /// The player level is too low.
    #[error("requires level {required}, player is level {current}")]
    InsufficientLevel {
        /// Level the item requires.
        required: u32,
        /// The player's level.
        current: u32,
    },

    /// The player cannot afford the purchase.
    #[error("requires {required} points, player has {available}")]
    InsufficientFunds {
        /// Price of the purchase.
        required: u64,
        /// Points held.
        available: u64,
    },

    /// The booster cannot be bought.
    #[error("{name} cannot be purchased")]
    NotPurchasable {
        /// The booster type.
        name: String,
    },

    /// The player owns as many cells as the level allows.
    #[error("cell limit of {max_cells} reached")]
    MaxCellsReached {
        /// The current allowance.
        max_cells: u32,
    },

    /// The requested cell is already owned.
    #[error("cell {index} is already owned")]
    CellAlreadyOwned {
        /// The requested cell.
        index: usize,
    },

    /// Every cell is owned.
    #[error("no cells left to purchase")]
    NoCellsAvailable,

    /// The index is outside the grid.
    #[error("cell index {index} is outside the grid")]
    InvalidCellIndex {
        /// The rejected index.
        index: usize,
    },

    /// The player does not own the cell.
    #[error("cell {index} is not owned")]
    CellNotOwned {
        /// The cell.
        index: usize,
    },

    /// The cell is extracting or holds an uncollected resource.
    #[error("cell {index} is busy")]
    CellBusy {
        /// The cell.
        index: usize,
    },

    /// No expedition of the type is held.
    #[error("no {resource} expedition in inventory")]
    NoExpeditionInInventory {
        /// The resource type.
        resource: String,
    },

    /// The cell has nothing ready to collect.
    #[error("cell {index} has nothing ready to collect")]
    NotReady {
        /// The cell.
        index: usize,
    },

    /// Nothing is held to sell, or the requested amount is zero.
    #[error("nothing to sell")]
    NothingToSell,

    /// Fewer units are held than the sale asked for.
    #[error("cannot sell {required} {resource}, only {available} held")]
    InsufficientInventory {
        /// The resource type.
        resource: String,
        /// Units requested.
        required: u32,
        /// Units held.
        available: u32,
    },

    /// No booster of the type is held.
    #[error("no {booster} in inventory")]
    NoBoosterInInventory {
        /// The booster type.
        booster: String,
    },

    /// A deployment named no resource type and no expedition is selected.
    #[error("no expedition selected")]
    NoExpeditionSelected,

    /// A booster application named no type and no booster is selected.
    #[error("no booster selected")]
    NoBoosterSelected,

    /// The cell is not running an extraction.
    #[error("cell {index} is not extracting")]
    CellNotExtracting {
        /// The cell.
        index: usize,
    },

    /// The cell already has an unexpired booster effect.
    #[error("cell {index} already has an active booster until {expires_at}")]
    BoosterAlreadyActiveOnCell {
        /// The cell.
        index: usize,
        /// When the existing effect ends.
        expires_at: i64,
    },

    /// The booster cannot accelerate a resource of this tier.
    #[error("{booster} boosts up to tier {tier_max}, {resource} is tier {resource_level}")]
    TierTooHigh {
        /// The booster type.
        booster: String,
        /// Highest tier the booster accepts.
        tier_max: u32,
        /// The resource being extracted.
        resource: String,
        /// The resource's tier.
        resource_level: u32,
    },

    /// A ledger mutation failed after validation passed.
    #[error("ledger fault: {0}")]
    Ledger(#[from] LedgerError),
}

impl EconomyError {
    /// The wire-level classification.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownResource { .. } => ErrorKind::UnknownResource,
            Self::UnknownBooster { .. } | Self::StaleResource { .. } => {
                ErrorKind::InvalidConfigKey
            }
            Self::InsufficientLevel { .. } => ErrorKind::InsufficientLevel,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::NotPurchasable { .. } => ErrorKind::NotPurchasable,
            Self::MaxCellsReached { .. } => ErrorKind::MaxCellsReached,
            Self::CellAlreadyOwned { .. } => ErrorKind::CellAlreadyOwned,
            Self::NoCellsAvailable => ErrorKind::NoCellsAvailable,
            Self::InvalidCellIndex { .. } => ErrorKind::InvalidCellIndex,
            Self::CellNotOwned { .. } => ErrorKind::CellNotOwned,
            Self::CellBusy { .. } => ErrorKind::CellBusy,
            Self::NoExpeditionInInventory { .. } => ErrorKind::NoExpeditionInInventory,
            Self::NotReady { .. } => ErrorKind::NotReady,
            Self::NothingToSell => ErrorKind::NothingToSell,
            Self::InsufficientInventory { .. } => ErrorKind::InsufficientInventory,
            Self::NoBoosterInInventory { .. } => ErrorKind::NoBoosterInInventory,
            Self::NoExpeditionSelected | Self::NoBoosterSelected => ErrorKind::NothingSelected,
            Self::CellNotExtracting { .. } => ErrorKind::CellNotExtracting,
            Self::BoosterAlreadyActiveOnCell { .. } => ErrorKind::BoosterAlreadyActiveOnCell,
            Self::TierTooHigh { .. } => ErrorKind::TierTooHigh,
            Self::Ledger(_) => ErrorKind::Internal,
        }
    }

    /// The threshold that was not met, when the rejection has one.
    pub fn required(&self) -> Option<u64> {
        match self {
            Self::InsufficientLevel { required, .. } => Some(u64::from(*required)),
            Self::InsufficientFunds { required, .. } => Some(*required),
            Self::InsufficientInventory { required, .. } => Some(u64::from(*required)),
            Self::TierTooHigh { resource_level, .. } => Some(u64::from(*resource_level)),
            _ => None,
        }
    }

    /// What the player had, when the rejection has a figure for it.
    pub fn available(&self) -> Option<u64> {
        match self {
            Self::InsufficientLevel { current, .. } => Some(u64::from(*current)),
            Self::InsufficientFunds { available, .. } => Some(*available),
            Self::InsufficientInventory { available, .. } => Some(u64::from(*available)),
            Self::MaxCellsReached { max_cells } => Some(u64::from(*max_cells)),
            Self::TierTooHigh { tier_max, .. } => Some(u64::from(*tier_max)),
            _ => None,
        }
    }

    /// The structured failure sent to remote callers.
    pub fn to_failure(&self) -> ActionFailure {
        ActionFailure {
            kind: self.kind(),
            message: self.to_string(),
            required: self.required(),
            available: self.available(),
        }
    }
}

/// Problems found when validating an economy catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The level curve has no entries.
    #[error("level thresholds are empty")]
    EmptyThresholds,

    /// Level 1 must start at zero experience.
    #[error("first level threshold must be 0, got {first}")]
    FirstThresholdNotZero {
        /// The configured first threshold.
        first: u64,
    },

    /// Thresholds must strictly increase.
    #[error("threshold for level {level} does not exceed the previous level")]
    ThresholdsNotAscending {
        /// The first level whose threshold is out of order.
        level: usize,
    },

    /// Two entries share a name.
    #[error("duplicate catalog entry: {name}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// A resource has a zero extraction time.
    #[error("resource {name} has a zero extraction time")]
    ZeroDuration {
        /// The resource.
        name: String,
    },

    /// A booster has a zero multiplier.
    #[error("booster {name} has a zero multiplier")]
    ZeroMultiplier {
        /// The booster.
        name: String,
    },

    /// A purchasable booster has no price.
    #[error("booster {name} is purchasable but has no cost")]
    MissingCost {
        /// The booster.
        name: String,
    },

    /// A starting cell is outside the grid.
    #[error("starting cell {index} is outside the grid")]
    StartingCellOutOfRange {
        /// The rejected index.
        index: usize,
    },
}
