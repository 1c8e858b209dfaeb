//! Precondition checks shared by the action handlers.
//!
//! Every check reads the catalog and the ledger without mutating either.
//! Handlers run all of an action's checks before the first mutation, which is
//! what makes each action all-or-nothing.

use farpost_ledger::{Holding, PlayerLedger};
use farpost_types::Cell;

use crate::config::{BoosterSpec, EconomyConfig, ResourceSpec};
use crate::error::EconomyError;

/// Resolve a resource name.
pub fn resource<'a>(config: &'a EconomyConfig, name: &str) -> Result<&'a ResourceSpec, EconomyError> {
    config.resource(name).ok_or_else(|| EconomyError::UnknownResource {
        name: name.to_owned(),
    })
}

/// Resolve a booster name.
pub fn booster<'a>(config: &'a EconomyConfig, name: &str) -> Result<&'a BoosterSpec, EconomyError> {
    config.booster(name).ok_or_else(|| EconomyError::UnknownBooster {
        name: name.to_owned(),
    })
}

/// Resolve the resource a cell is extracting or holding.
pub fn cell_resource<'a>(
    config: &'a EconomyConfig,
    cell: &Cell,
) -> Result<&'a ResourceSpec, EconomyError> {
    let name = cell.resource_type.as_deref().unwrap_or_default();
    config.resource(name).ok_or_else(|| EconomyError::StaleResource {
        index: cell.id,
        name: name.to_owned(),
    })
}

/// The player must be at least `required`.
pub const fn level(ledger: &PlayerLedger, required: u32) -> Result<(), EconomyError> {
    if ledger.level() < required {
        return Err(EconomyError::InsufficientLevel {
            required,
            current: ledger.level(),
        });
    }
    Ok(())
}

/// The player must hold at least `cost` points.
pub const fn funds(ledger: &PlayerLedger, cost: u64) -> Result<(), EconomyError> {
    if ledger.points() < cost {
        return Err(EconomyError::InsufficientFunds {
            required: cost,
            available: ledger.points(),
        });
    }
    Ok(())
}

/// The index must be on the grid.
pub fn cell(ledger: &PlayerLedger, index: usize) -> Result<&Cell, EconomyError> {
    ledger
        .cell(index)
        .ok_or(EconomyError::InvalidCellIndex { index })
}

/// The index must be on the grid and owned.
pub fn owned_cell(ledger: &PlayerLedger, index: usize) -> Result<&Cell, EconomyError> {
    let cell = cell(ledger, index)?;
    if !cell.owned {
        return Err(EconomyError::CellNotOwned { index });
    }
    Ok(cell)
}

/// At least one expedition of `resource` must be held.
pub fn expedition_held(ledger: &PlayerLedger, resource: &str) -> Result<(), EconomyError> {
    if ledger.count(Holding::Expeditions, resource) == 0 {
        return Err(EconomyError::NoExpeditionInInventory {
            resource: resource.to_owned(),
        });
    }
    Ok(())
}

/// At least one booster of `booster` must be held.
pub fn booster_held(ledger: &PlayerLedger, booster: &str) -> Result<(), EconomyError> {
    if ledger.count(Holding::Boosters, booster) == 0 {
        return Err(EconomyError::NoBoosterInInventory {
            booster: booster.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> PlayerLedger {
        PlayerLedger::fresh(100, &[7, 8, 9], 3)
    }

    #[test]
    fn funds_boundary() {
        let ledger = ledger();
        assert!(funds(&ledger, 100).is_ok());
        assert_eq!(
            funds(&ledger, 101),
            Err(EconomyError::InsufficientFunds {
                required: 101,
                available: 100
            })
        );
    }

    #[test]
    fn level_gate() {
        let ledger = ledger();
        assert!(level(&ledger, 1).is_ok());
        assert!(matches!(
            level(&ledger, 5),
            Err(EconomyError::InsufficientLevel { required: 5, current: 1 })
        ));
    }

    #[test]
    fn cell_checks_distinguish_range_and_ownership() {
        let ledger = ledger();
        assert!(owned_cell(&ledger, 7).is_ok());
        assert_eq!(
            owned_cell(&ledger, 0).err(),
            Some(EconomyError::CellNotOwned { index: 0 })
        );
        assert_eq!(
            owned_cell(&ledger, 18).err(),
            Some(EconomyError::InvalidCellIndex { index: 18 })
        );
    }

    #[test]
    fn unknown_names_map_to_their_errors() {
        let config = EconomyConfig::default();
        assert!(matches!(
            resource(&config, "Gold"),
            Err(EconomyError::UnknownResource { .. })
        ));
        assert!(matches!(
            booster(&config, "Gold Booster"),
            Err(EconomyError::UnknownBooster { .. })
        ));
    }

    #[test]
    fn empty_inventories_are_rejected() {
        let ledger = ledger();
        assert!(expedition_held(&ledger, "Iron Ore").is_err());
        assert!(booster_held(&ledger, "Basic Booster").is_err());
    }
}
