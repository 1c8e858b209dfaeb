//! The economy catalog: resource and booster tables, level curve, cell
//! pricing, and the starting state.
//!
//! The catalog is loaded once and never mutated. It deserializes from the
//! `economy` section of `farpost-config.yaml`; every field falls back to the
//! built-in table so a partial file still yields a complete catalog.
//! Resource and booster tables keep their declaration order, which is also
//! their tier order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use farpost_types::{BoosterEffect, GRID_SIZE};

use crate::error::CatalogError;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Static economy tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Extractable resources in tier order.
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceSpec>,

    /// Booster types in tier order.
    #[serde(default = "default_boosters")]
    pub boosters: Vec<BoosterSpec>,

    /// Cumulative XP needed for each level; entry `i` unlocks level `i + 1`.
    #[serde(default = "default_level_thresholds")]
    pub level_thresholds: Vec<u64>,

    /// Cell allowance by the level that unlocks it.
    #[serde(default = "default_cell_unlocks")]
    pub cell_unlocks: BTreeMap<u32, u32>,

    /// Cell allowance when no unlock applies.
    #[serde(default = "default_max_cells")]
    pub default_max_cells: u32,

    /// Points charged per cell.
    #[serde(default = "default_cell_cost")]
    pub cell_cost: u64,

    /// Experience granted per cell purchase.
    #[serde(default = "default_cell_xp")]
    pub cell_xp: u64,

    /// Floor for a speed-boosted extraction's remaining time.
    #[serde(default = "default_min_boosted_remaining_ms")]
    pub min_boosted_remaining_ms: i64,

    /// State of a brand-new player.
    #[serde(default)]
    pub starting: StartingConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            resources: default_resources(),
            boosters: default_boosters(),
            level_thresholds: default_level_thresholds(),
            cell_unlocks: default_cell_unlocks(),
            default_max_cells: default_max_cells(),
            cell_cost: default_cell_cost(),
            cell_xp: default_cell_xp(),
            min_boosted_remaining_ms: default_min_boosted_remaining_ms(),
            starting: StartingConfig::default(),
        }
    }
}

impl EconomyConfig {
    /// Look up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Look up a booster by name.
    pub fn booster(&self, name: &str) -> Option<&BoosterSpec> {
        self.boosters.iter().find(|b| b.name == name)
    }

    /// Check the catalog for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), CatalogError> {
        match self.level_thresholds.first() {
            None => return Err(CatalogError::EmptyThresholds),
            Some(&first) if first != 0 => {
                return Err(CatalogError::FirstThresholdNotZero { first });
            }
            Some(_) => {}
        }
        for (index, pair) in self.level_thresholds.windows(2).enumerate() {
            match pair {
                [lower, upper] if upper <= lower => {
                    return Err(CatalogError::ThresholdsNotAscending {
                        level: index.saturating_add(2),
                    });
                }
                _ => {}
            }
        }

        let mut names = BTreeSet::new();
        for resource in &self.resources {
            if !names.insert(resource.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: resource.name.clone(),
                });
            }
            if resource.extraction_secs == 0 {
                return Err(CatalogError::ZeroDuration {
                    name: resource.name.clone(),
                });
            }
        }

        names.clear();
        for booster in &self.boosters {
            if !names.insert(booster.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: booster.name.clone(),
                });
            }
            if booster.multiplier == 0 {
                return Err(CatalogError::ZeroMultiplier {
                    name: booster.name.clone(),
                });
            }
            if booster.purchasable && booster.cost.is_none() {
                return Err(CatalogError::MissingCost {
                    name: booster.name.clone(),
                });
            }
        }

        if let Some(&index) = self.starting.cells.iter().find(|i| **i >= GRID_SIZE) {
            return Err(CatalogError::StartingCellOutOfRange { index });
        }
        Ok(())
    }
}

/// One extractable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Display name and inventory key.
    pub name: String,
    /// Base extraction time in seconds.
    pub extraction_secs: u64,
    /// Points to buy one expedition.
    pub cost: u64,
    /// Points earned per unit sold.
    pub value: u64,
    /// Experience per unit collected.
    pub xp: u64,
    /// Experience per unit sold.
    pub sale_xp: u64,
    /// Minimum player level to buy or deploy.
    pub level: u32,
    /// Short label.
    pub symbol: String,
}

/// One booster type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoosterSpec {
    /// Display name and inventory key.
    pub name: String,
    /// Purchase price; `None` for reward-only boosters.
    #[serde(default)]
    pub cost: Option<u64>,
    /// Divisor applied to the remaining extraction time.
    pub multiplier: u32,
    /// Minimum player level to buy.
    pub level: u32,
    /// Length of the effect window in seconds.
    pub duration_secs: u64,
    /// Highest resource level the booster can accelerate.
    pub tier_max: u32,
    /// Experience granted per use.
    pub use_xp: u64,
    /// Short label.
    pub symbol: String,
    /// Whether the booster is sold in the shop.
    #[serde(default = "default_true")]
    pub purchasable: bool,
    /// How the booster acts.
    #[serde(default)]
    pub effect: BoosterEffect,
}

/// Starting state of a new player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingConfig {
    /// Points granted up front.
    #[serde(default = "default_starting_points")]
    pub points: u64,
    /// Cells owned from the start.
    #[serde(default = "default_starting_cells")]
    pub cells: Vec<usize>,
}

impl Default for StartingConfig {
    fn default() -> Self {
        Self {
            points: default_starting_points(),
            cells: default_starting_cells(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default table
// ---------------------------------------------------------------------------

fn resource(
    name: &str,
    extraction_secs: u64,
    cost: u64,
    value: u64,
    (xp, sale_xp): (u64, u64),
    level: u32,
    symbol: &str,
) -> ResourceSpec {
    ResourceSpec {
        name: name.to_owned(),
        extraction_secs,
        cost,
        value,
        xp,
        sale_xp,
        level,
        symbol: symbol.to_owned(),
    }
}

fn speed_booster(
    name: &str,
    cost: u64,
    multiplier: u32,
    level: u32,
    (tier_max, use_xp): (u32, u64),
    symbol: &str,
) -> BoosterSpec {
    BoosterSpec {
        name: name.to_owned(),
        cost: Some(cost),
        multiplier,
        level,
        duration_secs: 7200,
        tier_max,
        use_xp,
        symbol: symbol.to_owned(),
        purchasable: true,
        effect: BoosterEffect::Speed,
    }
}

// Per-unit sale XP is 5% of the unit value, rounded down, the same rate the
// remote sale endpoint applies to a whole sale. The client catalog names the
// field but never fills it in.
fn default_resources() -> Vec<ResourceSpec> {
    vec![
        resource("Lunar Regolith", 30, 20, 50, (10, 2), 1, "LR"),
        resource("Iron Ore", 60, 30, 100, (15, 5), 1, "Fe"),
        resource("Aluminum", 120, 35, 150, (18, 7), 1, "Al"),
        resource("Water Ice", 240, 40, 200, (20, 10), 1, "H2O"),
        resource("Magnesium", 360, 45, 180, (22, 9), 5, "Mg"),
        resource("Silicon", 480, 50, 250, (25, 12), 5, "Si"),
        resource("Titanium", 720, 80, 500, (40, 25), 5, "Ti"),
        resource("Rare Earth Elements", 960, 150, 1500, (75, 75), 10, "REE"),
        resource("Platinum Group Metals", 1200, 200, 2000, (100, 100), 15, "PGM"),
        resource("Helium-3", 1440, 300, 5000, (150, 250), 20, "He-3"),
    ]
}

// Use XP has no upstream figure either: speed boosters grant 5 per tier step
// through Master (30 for Ultimate), and Instant Extract matches Advanced.
fn default_boosters() -> Vec<BoosterSpec> {
    vec![
        speed_booster("Basic Booster", 100, 2, 1, (1, 5), "B1"),
        speed_booster("Advanced Booster", 250, 3, 5, (5, 10), "B2"),
        speed_booster("Elite Booster", 500, 4, 10, (10, 15), "B3"),
        speed_booster("Master Booster", 1000, 5, 15, (15, 20), "B4"),
        speed_booster("Ultimate Booster", 2000, 10, 20, (20, 30), "B5"),
        BoosterSpec {
            name: "Instant Extract".to_owned(),
            cost: None,
            multiplier: 999,
            level: 1,
            duration_secs: 1,
            tier_max: 20,
            use_xp: 10,
            symbol: "IE".to_owned(),
            purchasable: false,
            effect: BoosterEffect::InstantComplete,
        },
    ]
}

fn default_level_thresholds() -> Vec<u64> {
    vec![
        0, 300, 1200, 2200, 3500, 5200, 7300, 9800, 12800, 16400, 20600,
    ]
}

fn default_cell_unlocks() -> BTreeMap<u32, u32> {
    [
        (1, 3),
        (2, 4),
        (3, 5),
        (10, 8),
        (15, 12),
        (20, 16),
        (25, 24),
        (30, 32),
        (35, 48),
        (40, 64),
    ]
    .into_iter()
    .collect()
}

const fn default_max_cells() -> u32 {
    3
}

const fn default_cell_cost() -> u64 {
    500
}

const fn default_cell_xp() -> u64 {
    100
}

const fn default_min_boosted_remaining_ms() -> i64 {
    1000
}

const fn default_starting_points() -> u64 {
    1000
}

fn default_starting_cells() -> Vec<usize> {
    vec![7, 8, 9]
}

const fn default_true() -> bool {
    true
}
