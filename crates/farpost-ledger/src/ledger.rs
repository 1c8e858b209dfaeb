//! The player ledger: one player's complete economic state.
//!
//! All mutations go through methods so the invariants listed in the crate
//! docs hold after every call. Validation of player intent (can they afford
//! it, is the cell free) belongs to the economy engine; the ledger only
//! rejects calls that would corrupt its own structure.

use std::collections::BTreeMap;

use tracing::warn;

use farpost_types::{ActiveBoost, Cell, GRID_SIZE, InteractionMode, PlayerStats};

use crate::{LedgerError, inventory};

// ---------------------------------------------------------------------------
// Holding
// ---------------------------------------------------------------------------

/// Selects one of the three counted inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Holding {
    /// Collected resources awaiting sale.
    Resources,
    /// Purchased expeditions awaiting deployment.
    Expeditions,
    /// Purchased boosters awaiting use.
    Boosters,
}

// ---------------------------------------------------------------------------
// PlayerLedger
// ---------------------------------------------------------------------------

/// The in-memory economy of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLedger {
    pub(crate) level: u32,
    pub(crate) xp: u64,
    pub(crate) points: u64,
    pub(crate) owned_cells: u32,
    pub(crate) max_cells: u32,
    pub(crate) resources: BTreeMap<String, u32>,
    pub(crate) expeditions: BTreeMap<String, u32>,
    pub(crate) boosters: BTreeMap<String, u32>,
    pub(crate) cells: Vec<Cell>,
    pub(crate) boosted_cells: BTreeMap<usize, ActiveBoost>,
    pub(crate) selected_expedition: Option<String>,
    pub(crate) selected_booster: Option<String>,
    pub(crate) mode: InteractionMode,
    pub(crate) speed_multiplier: u32,
    pub(crate) stats: PlayerStats,
}

impl PlayerLedger {
    /// Create a level-1 ledger with the given starting points and owned
    /// cells.
    ///
    /// Starting indices outside the grid are ignored with a warning.
    pub fn fresh(points: u64, starting_cells: &[usize], max_cells: u32) -> Self {
        for index in starting_cells.iter().filter(|i| **i >= GRID_SIZE) {
            warn!(index, "Ignoring starting cell outside the grid");
        }
        let cells: Vec<Cell> = (0..GRID_SIZE)
            .map(|id| Cell::new(id, starting_cells.contains(&id)))
            .collect();
        let owned_cells = count_owned(&cells);
        Self {
            level: 1,
            xp: 0,
            points,
            owned_cells,
            max_cells,
            resources: BTreeMap::new(),
            expeditions: BTreeMap::new(),
            boosters: BTreeMap::new(),
            cells,
            boosted_cells: BTreeMap::new(),
            selected_expedition: None,
            selected_booster: None,
            mode: InteractionMode::Select,
            speed_multiplier: 1,
            stats: PlayerStats::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    /// Current level, at least 1.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Cumulative experience.
    pub const fn xp(&self) -> u64 {
        self.xp
    }

    /// Spendable points.
    pub const fn points(&self) -> u64 {
        self.points
    }

    /// Number of owned cells.
    pub const fn owned_cells(&self) -> u32 {
        self.owned_cells
    }

    /// Ownable cells at the current level.
    pub const fn max_cells(&self) -> u32 {
        self.max_cells
    }

    /// Divisor applied to extraction durations of new deployments.
    pub const fn speed_multiplier(&self) -> u32 {
        self.speed_multiplier
    }

    /// Set the extraction speed divisor. Zero is treated as 1.
    pub fn set_speed_multiplier(&mut self, multiplier: u32) {
        self.speed_multiplier = multiplier.max(1);
    }

    /// Deduct points, returning the new balance.
    ///
    /// Deducting more than the balance clamps to zero and logs a warning.
    pub fn debit_points(&mut self, amount: u64) -> u64 {
        self.points = self.points.checked_sub(amount).unwrap_or_else(|| {
            warn!(points = self.points, amount, "Point debit clamped to zero");
            0
        });
        self.points
    }

    /// Add points, returning the new balance. Saturates at `u64::MAX`.
    pub const fn credit_points(&mut self, amount: u64) -> u64 {
        self.points = self.points.saturating_add(amount);
        self.points
    }

    /// Add experience, returning the new total. Experience never decreases.
    pub const fn grant_xp(&mut self, amount: u64) -> u64 {
        self.xp = self.xp.saturating_add(amount);
        self.xp
    }

    /// Record a new level and its cell allowance.
    ///
    /// Levels below 1 are raised to 1. The allowance never drops below the
    /// number of cells already owned.
    pub fn set_level(&mut self, level: u32, max_cells: u32) {
        self.level = level.max(1);
        if max_cells < self.owned_cells {
            warn!(
                max_cells,
                owned_cells = self.owned_cells,
                "Cell allowance below owned count, keeping owned count"
            );
        }
        self.max_cells = max_cells.max(self.owned_cells);
    }

    // -----------------------------------------------------------------------
    // Inventories
    // -----------------------------------------------------------------------

    /// The inventory map for `holding`.
    pub const fn holding(&self, holding: Holding) -> &BTreeMap<String, u32> {
        match holding {
            Holding::Resources => &self.resources,
            Holding::Expeditions => &self.expeditions,
            Holding::Boosters => &self.boosters,
        }
    }

    const fn holding_mut(&mut self, holding: Holding) -> &mut BTreeMap<String, u32> {
        match holding {
            Holding::Resources => &mut self.resources,
            Holding::Expeditions => &mut self.expeditions,
            Holding::Boosters => &mut self.boosters,
        }
    }

    /// Units of `item` held in `holding`.
    pub fn count(&self, holding: Holding, item: &str) -> u32 {
        inventory::count(self.holding(holding), item)
    }

    /// Add units to an inventory, returning the new count.
    pub fn add_item(
        &mut self,
        holding: Holding,
        item: &str,
        amount: u32,
    ) -> Result<u32, LedgerError> {
        inventory::add(self.holding_mut(holding), item, amount)
    }

    /// Remove units from an inventory, returning the new count.
    ///
    /// Removing more than is held clamps to zero and logs a warning.
    pub fn remove_item(&mut self, holding: Holding, item: &str, amount: u32) -> u32 {
        inventory::remove_clamped(self.holding_mut(holding), item, amount)
    }

    /// Drop every entry of `holding` whose name fails `keep`, returning the
    /// dropped entries.
    pub fn retain_items(
        &mut self,
        holding: Holding,
        mut keep: impl FnMut(&str) -> bool,
    ) -> Vec<(String, u32)> {
        let inventory = self.holding_mut(holding);
        let dropped: Vec<(String, u32)> = inventory
            .iter()
            .filter(|(name, _)| !keep(name))
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        for (name, _) in &dropped {
            inventory.remove(name);
        }
        dropped
    }

    // -----------------------------------------------------------------------
    // Grid
    // -----------------------------------------------------------------------

    /// The full grid in index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One cell, or `None` outside the grid.
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    fn cell_mut(&mut self, index: usize) -> Result<&mut Cell, LedgerError> {
        self.cells
            .get_mut(index)
            .ok_or(LedgerError::CellOutOfRange { index })
    }

    /// Index of the lowest unowned cell, if any.
    pub fn first_unowned_cell(&self) -> Option<usize> {
        self.cells.iter().position(|cell| !cell.owned)
    }

    /// Take ownership of a cell.
    pub fn claim_cell(&mut self, index: usize) -> Result<(), LedgerError> {
        let cell = self.cell_mut(index)?;
        if cell.owned {
            return Err(LedgerError::CellAlreadyOwned { index });
        }
        cell.owned = true;
        self.owned_cells = count_owned(&self.cells);
        Ok(())
    }

    /// Begin an extraction on a cell.
    pub fn start_extraction(
        &mut self,
        index: usize,
        resource_type: &str,
        start: i64,
        end: i64,
    ) -> Result<(), LedgerError> {
        let cell = self.cell_mut(index)?;
        cell.resource_type = Some(resource_type.to_owned());
        cell.extraction_start_time = Some(start);
        cell.extraction_end_time = Some(end);
        cell.is_ready = false;
        Ok(())
    }

    /// Move a running extraction's end time.
    pub fn set_extraction_end(&mut self, index: usize, end: i64) -> Result<(), LedgerError> {
        self.cell_mut(index)?.extraction_end_time = Some(end);
        Ok(())
    }

    /// Flag a cell's extraction as complete.
    pub fn mark_ready(&mut self, index: usize) -> Result<(), LedgerError> {
        self.cell_mut(index)?.is_ready = true;
        Ok(())
    }

    /// Clear a cell's extraction state, returning the resource it held.
    pub fn clear_extraction(&mut self, index: usize) -> Result<Option<String>, LedgerError> {
        let cell = self.cell_mut(index)?;
        let resource = cell.resource_type.take();
        cell.clear_extraction();
        Ok(resource)
    }

    // -----------------------------------------------------------------------
    // Booster effects
    // -----------------------------------------------------------------------

    /// All recorded booster effects by cell.
    pub const fn boosted_cells(&self) -> &BTreeMap<usize, ActiveBoost> {
        &self.boosted_cells
    }

    /// The booster effect recorded on a cell, expired or not.
    pub fn boost(&self, index: usize) -> Option<&ActiveBoost> {
        self.boosted_cells.get(&index)
    }

    /// Record a booster effect on a cell, replacing any previous one.
    pub fn set_boost(&mut self, index: usize, boost: ActiveBoost) -> Result<(), LedgerError> {
        if index >= GRID_SIZE {
            return Err(LedgerError::CellOutOfRange { index });
        }
        self.boosted_cells.insert(index, boost);
        Ok(())
    }

    /// Remove a cell's booster effect.
    pub fn clear_boost(&mut self, index: usize) -> Option<ActiveBoost> {
        self.boosted_cells.remove(&index)
    }

    /// Remove effects whose window closed at or before `now`, returning the
    /// affected cells.
    pub fn prune_expired_boosts(&mut self, now: i64) -> Vec<usize> {
        let expired: Vec<usize> = self
            .boosted_cells
            .iter()
            .filter(|(_, boost)| !boost.is_active(now))
            .map(|(index, _)| *index)
            .collect();
        for index in &expired {
            self.boosted_cells.remove(index);
        }
        expired
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Current interaction mode.
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Selected expedition resource type.
    pub fn selected_expedition(&self) -> Option<&str> {
        self.selected_expedition.as_deref()
    }

    /// Selected booster type.
    pub fn selected_booster(&self) -> Option<&str> {
        self.selected_booster.as_deref()
    }

    /// Select an expedition and switch to deploy mode.
    pub fn select_expedition(&mut self, resource_type: &str) {
        self.selected_expedition = Some(resource_type.to_owned());
        self.selected_booster = None;
        self.mode = InteractionMode::Deploy;
    }

    /// Select a booster and switch to booster mode.
    pub fn select_booster(&mut self, booster_type: &str) {
        self.selected_booster = Some(booster_type.to_owned());
        self.selected_expedition = None;
        self.mode = InteractionMode::ApplyBooster;
    }

    /// Drop any selection and return to select mode.
    pub fn clear_selection(&mut self) {
        self.selected_expedition = None;
        self.selected_booster = None;
        self.mode = InteractionMode::Select;
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Lifetime counters.
    pub const fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Mutable lifetime counters.
    pub const fn stats_mut(&mut self) -> &mut PlayerStats {
        &mut self.stats
    }
}

pub(crate) fn count_owned(cells: &[Cell]) -> u32 {
    let owned = cells.iter().filter(|cell| cell.owned).count();
    u32::try_from(owned).unwrap_or(u32::MAX)
}
