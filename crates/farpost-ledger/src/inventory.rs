//! Counted inventories keyed by item name.
//!
//! Resources, expeditions, and boosters are all plain `name -> count` maps.
//! Additions use checked arithmetic; removals never underflow. A removal
//! that asks for more than is held is clamped to zero and logged, because
//! a negative count is a bookkeeping bug rather than a player mistake.
//! Keys are dropped when their count reaches zero.

use std::collections::BTreeMap;

use tracing::warn;

use crate::LedgerError;

/// Number of units of `item` held. Absent items count as zero.
pub fn count(inventory: &BTreeMap<String, u32>, item: &str) -> u32 {
    inventory.get(item).copied().unwrap_or(0)
}

/// Sum of all held units, or `None` on overflow.
pub fn total(inventory: &BTreeMap<String, u32>) -> Option<u32> {
    let mut sum: u32 = 0;
    for qty in inventory.values() {
        sum = sum.checked_add(*qty)?;
    }
    Some(sum)
}

/// Add `amount` units of `item`, returning the new count.
pub fn add(
    inventory: &mut BTreeMap<String, u32>,
    item: &str,
    amount: u32,
) -> Result<u32, LedgerError> {
    let current = count(inventory, item);
    let updated = current
        .checked_add(amount)
        .ok_or_else(|| LedgerError::InventoryOverflow {
            item: item.to_owned(),
            current,
            attempted: amount,
        })?;
    if updated > 0 {
        inventory.insert(item.to_owned(), updated);
    }
    Ok(updated)
}

/// Remove up to `amount` units of `item`, returning the new count.
///
/// Removing more than is held clamps the count to zero and logs a warning.
pub fn remove_clamped(inventory: &mut BTreeMap<String, u32>, item: &str, amount: u32) -> u32 {
    let current = count(inventory, item);
    let remaining = current.checked_sub(amount).unwrap_or_else(|| {
        warn!(item, current, requested = amount, "Inventory removal clamped to zero");
        0
    });
    if remaining == 0 {
        inventory.remove(item);
    } else {
        inventory.insert(item.to_owned(), remaining);
    }
    remaining
}

/// Items with a nonzero count, in name order.
pub fn held(inventory: &BTreeMap<String, u32>) -> Vec<(String, u32)> {
    inventory
        .iter()
        .filter(|(_, qty)| **qty > 0)
        .map(|(name, qty)| (name.clone(), *qty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_with(item: &str, qty: u32) -> BTreeMap<String, u32> {
        let mut inv = BTreeMap::new();
        inv.insert(item.to_owned(), qty);
        inv
    }

    #[test]
    fn absent_item_counts_zero() {
        assert_eq!(count(&BTreeMap::new(), "Iron Ore"), 0);
    }

    #[test]
    fn add_stacks() {
        let mut inv = inventory_with("Iron Ore", 2);
        assert_eq!(add(&mut inv, "Iron Ore", 3).ok(), Some(5));
        assert_eq!(count(&inv, "Iron Ore"), 5);
    }

    #[test]
    fn add_overflow_is_rejected_and_leaves_count() {
        let mut inv = inventory_with("Iron Ore", u32::MAX);
        assert!(add(&mut inv, "Iron Ore", 1).is_err());
        assert_eq!(count(&inv, "Iron Ore"), u32::MAX);
    }

    #[test]
    fn remove_exact_drops_key() {
        let mut inv = inventory_with("Silicon", 4);
        assert_eq!(remove_clamped(&mut inv, "Silicon", 4), 0);
        assert!(!inv.contains_key("Silicon"));
    }

    #[test]
    fn remove_more_than_held_clamps() {
        let mut inv = inventory_with("Silicon", 2);
        assert_eq!(remove_clamped(&mut inv, "Silicon", 5), 0);
        assert_eq!(count(&inv, "Silicon"), 0);
    }

    #[test]
    fn held_skips_zero_entries() {
        let mut inv = inventory_with("Silicon", 2);
        inv.insert("Titanium".to_owned(), 0);
        assert_eq!(held(&inv), vec![("Silicon".to_owned(), 2)]);
        assert_eq!(total(&inv), Some(2));
    }
}
