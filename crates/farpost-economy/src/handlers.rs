//! Execution of economy actions against a player ledger.
//!
//! Each handler runs every precondition check first and only then mutates
//! the ledger, so a rejected action leaves the ledger untouched. A successful
//! handler returns an [`Applied`] carrying the action's outcome, the events
//! to publish (the action's own event first, then any selection change, then
//! any level-up), and the timer changes the scheduler must make.
//!
//! Handlers take the current time as an argument and never read a clock.

use tracing::{debug, info, warn};

use farpost_ledger::{Holding, PlayerLedger, inventory};
use farpost_types::{
    ActiveBoost, BoosterApplication, BoosterEffect, BoosterPurchase, CellPurchase, Collection,
    Deployment, ExpeditionPurchase, GameEvent, Sale, SaleLine,
};

use crate::config::{EconomyConfig, ResourceSpec};
use crate::error::EconomyError;
use crate::level::{level_for_xp, max_cells_for_level};
use crate::validation;

/// Resource names tracked by dedicated collection counters.
const RARE_RESOURCE: &str = "Rare Earth Elements";
const PLATINUM_RESOURCE: &str = "Platinum Group Metals";
const HELIUM_RESOURCE: &str = "Helium-3";

// ---------------------------------------------------------------------------
// Handler results
// ---------------------------------------------------------------------------

/// A change to a cell's completion timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerDirective {
    /// Arm (or re-arm) the cell's timer for `deadline`.
    Schedule {
        /// The cell.
        cell: usize,
        /// Epoch milliseconds at which the extraction completes.
        deadline: i64,
    },
    /// Disarm the cell's timer.
    Cancel {
        /// The cell.
        cell: usize,
    },
}

/// A successfully applied action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    /// The action's result payload.
    pub outcome: T,
    /// Events to publish, in order.
    pub events: Vec<GameEvent>,
    /// Timer changes for the scheduler.
    pub timers: Vec<TimerDirective>,
}

impl<T> Applied<T> {
    fn new(outcome: T, event: GameEvent) -> Self {
        Self {
            outcome,
            events: vec![event],
            timers: Vec::new(),
        }
    }

    fn with_event(mut self, event: Option<GameEvent>) -> Self {
        self.events.extend(event);
        self
    }

    fn with_timer(mut self, timer: TimerDirective) -> Self {
        self.timers.push(timer);
        self
    }
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

/// Buy one expedition of `resource_type`.
pub fn purchase_expedition(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    resource_type: &str,
) -> Result<Applied<ExpeditionPurchase>, EconomyError> {
    let spec = validation::resource(config, resource_type)?;
    validation::level(ledger, spec.level)?;
    validation::funds(ledger, spec.cost)?;

    let new_amount = ledger.add_item(Holding::Expeditions, &spec.name, 1)?;
    let points_remaining = ledger.debit_points(spec.cost);
    let stats = ledger.stats_mut();
    stats.expeditions_purchased = stats.expeditions_purchased.saturating_add(1);
    stats.points_spent = stats.points_spent.saturating_add(spec.cost);

    debug!(resource = %spec.name, cost = spec.cost, new_amount, "Expedition purchased");
    let outcome = ExpeditionPurchase {
        resource_type: spec.name.clone(),
        cost: spec.cost,
        new_amount,
        points_remaining,
    };
    let event = GameEvent::ExpeditionPurchased(outcome.clone());
    Ok(Applied::new(outcome, event))
}

/// Buy one booster of `booster_type`.
pub fn purchase_booster(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    booster_type: &str,
) -> Result<Applied<BoosterPurchase>, EconomyError> {
    let spec = validation::booster(config, booster_type)?;
    let cost = match spec.cost {
        Some(cost) if spec.purchasable => cost,
        _ => {
            return Err(EconomyError::NotPurchasable {
                name: spec.name.clone(),
            });
        }
    };
    validation::level(ledger, spec.level)?;
    validation::funds(ledger, cost)?;

    let new_amount = ledger.add_item(Holding::Boosters, &spec.name, 1)?;
    let points_remaining = ledger.debit_points(cost);
    let stats = ledger.stats_mut();
    stats.boosters_purchased = stats.boosters_purchased.saturating_add(1);
    stats.points_spent = stats.points_spent.saturating_add(cost);

    debug!(booster = %spec.name, cost, new_amount, "Booster purchased");
    let outcome = BoosterPurchase {
        booster_type: spec.name.clone(),
        cost,
        new_amount,
        points_remaining,
    };
    let event = GameEvent::BoosterPurchased(outcome.clone());
    Ok(Applied::new(outcome, event))
}

/// Buy a grid cell: `cell_index`, or the lowest unowned cell when `None`.
///
/// Checks run in the order funds, allowance, target.
pub fn purchase_cell(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    cell_index: Option<usize>,
) -> Result<Applied<CellPurchase>, EconomyError> {
    validation::funds(ledger, config.cell_cost)?;
    if ledger.owned_cells() >= ledger.max_cells() {
        return Err(EconomyError::MaxCellsReached {
            max_cells: ledger.max_cells(),
        });
    }
    let target = match cell_index {
        Some(index) => {
            if validation::cell(ledger, index)?.owned {
                return Err(EconomyError::CellAlreadyOwned { index });
            }
            index
        }
        None => ledger
            .first_unowned_cell()
            .ok_or(EconomyError::NoCellsAvailable)?,
    };

    ledger.claim_cell(target)?;
    let points_remaining = ledger.debit_points(config.cell_cost);
    let stats = ledger.stats_mut();
    stats.cells_purchased = stats.cells_purchased.saturating_add(1);
    stats.points_spent = stats.points_spent.saturating_add(config.cell_cost);
    let level_up = award_xp(config, ledger, config.cell_xp);

    debug!(cell = target, cost = config.cell_cost, "Cell purchased");
    let outcome = CellPurchase {
        cell_index: target,
        cost: config.cell_cost,
        xp_gained: config.cell_xp,
        points_remaining,
    };
    let event = GameEvent::CellPurchased(outcome.clone());
    Ok(Applied::new(outcome, event).with_event(level_up))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Deploy an expedition of `resource_type` onto an owned, idle cell.
///
/// The extraction runs for the resource's base time divided by the ledger's
/// speed multiplier.
pub fn deploy_expedition(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    now: i64,
    cell_index: usize,
    resource_type: &str,
) -> Result<Applied<Deployment>, EconomyError> {
    let spec = validation::resource(config, resource_type)?;
    if validation::owned_cell(ledger, cell_index)?.is_busy() {
        return Err(EconomyError::CellBusy { index: cell_index });
    }
    validation::expedition_held(ledger, &spec.name)?;
    validation::level(ledger, spec.level)?;

    let duration_ms = extraction_ms(spec, ledger.speed_multiplier());
    let end_time = now.saturating_add(duration_ms);

    ledger.remove_item(Holding::Expeditions, &spec.name, 1);
    ledger.start_extraction(cell_index, &spec.name, now, end_time)?;
    ledger.clear_boost(cell_index);
    let stats = ledger.stats_mut();
    stats.expeditions_deployed = stats.expeditions_deployed.saturating_add(1);
    let selection = release_selection(ledger, Holding::Expeditions, &spec.name);

    debug!(cell = cell_index, resource = %spec.name, end_time, "Expedition deployed");
    let outcome = Deployment {
        cell_index,
        resource_type: spec.name.clone(),
        start_time: now,
        end_time,
        duration_ms,
    };
    let event = GameEvent::ExpeditionDeployed(outcome.clone());
    Ok(Applied::new(outcome, event)
        .with_event(selection)
        .with_timer(TimerDirective::Schedule {
            cell: cell_index,
            deadline: end_time,
        }))
}

/// Collect the resource from a ready cell.
pub fn collect_resource(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    cell_index: usize,
) -> Result<Applied<Collection>, EconomyError> {
    let cell = validation::cell(ledger, cell_index)?;
    if !cell.is_ready {
        return Err(EconomyError::NotReady { index: cell_index });
    }
    let spec = validation::cell_resource(config, cell)?;

    let total_amount = ledger.add_item(Holding::Resources, &spec.name, 1)?;
    ledger.clear_extraction(cell_index)?;
    ledger.clear_boost(cell_index);
    record_collection(ledger, &spec.name);
    let level_up = award_xp(config, ledger, spec.xp);

    debug!(cell = cell_index, resource = %spec.name, total_amount, "Resource collected");
    let outcome = Collection {
        cell_index,
        resource_type: spec.name.clone(),
        xp_gained: spec.xp,
        total_amount,
    };
    let event = GameEvent::ResourceCollected(outcome.clone());
    Ok(Applied::new(outcome, event)
        .with_event(level_up)
        .with_timer(TimerDirective::Cancel { cell: cell_index }))
}

/// Flip an extracting cell to ready when its timer fires.
///
/// The cell's current state decides: a cell that was collected, reset, or
/// already completed since the timer was armed is left alone and `None` is
/// returned.
pub fn complete_extraction(ledger: &mut PlayerLedger, cell_index: usize) -> Option<GameEvent> {
    let cell = ledger.cell(cell_index)?;
    if !cell.is_extracting() {
        debug!(cell = cell_index, "Ignoring timer for idle cell");
        return None;
    }
    let resource_type = cell.resource_type.clone().unwrap_or_default();
    if let Err(err) = ledger.mark_ready(cell_index) {
        warn!(cell = cell_index, %err, "Failed to complete extraction");
        return None;
    }
    ledger.clear_boost(cell_index);
    debug!(cell = cell_index, resource = %resource_type, "Extraction complete");
    Some(GameEvent::ExtractionComplete {
        cell_index,
        resource_type,
    })
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// Sell resources for points and experience.
///
/// With a type, sells `amount` units (all held when `None`). Without a type,
/// sells every held resource in full and ignores `amount`.
pub fn sell_resources(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    resource_type: Option<&str>,
    amount: Option<u32>,
) -> Result<Applied<Sale>, EconomyError> {
    let plan: Vec<(&ResourceSpec, u32)> = match resource_type {
        Some(name) => {
            let spec = validation::resource(config, name)?;
            let held = ledger.count(Holding::Resources, &spec.name);
            let requested = amount.unwrap_or(held);
            if held == 0 || requested == 0 {
                return Err(EconomyError::NothingToSell);
            }
            if requested > held {
                return Err(EconomyError::InsufficientInventory {
                    resource: spec.name.clone(),
                    required: requested,
                    available: held,
                });
            }
            vec![(spec, requested)]
        }
        None => {
            let held = inventory::held(ledger.holding(Holding::Resources));
            if held.is_empty() {
                return Err(EconomyError::NothingToSell);
            }
            let plan: Vec<(&ResourceSpec, u32)> = held
                .into_iter()
                .filter_map(|(name, qty)| match config.resource(&name) {
                    Some(spec) => Some((spec, qty)),
                    None => {
                        warn!(resource = %name, qty, "Skipping resource the catalog does not list");
                        None
                    }
                })
                .collect();
            if plan.is_empty() {
                return Err(EconomyError::NothingToSell);
            }
            plan
        }
    };

    let mut lines = Vec::with_capacity(plan.len());
    let mut points_gained: u64 = 0;
    let mut xp_gained: u64 = 0;
    let mut units_sold: u32 = 0;
    for (spec, qty) in plan {
        ledger.remove_item(Holding::Resources, &spec.name, qty);
        let line = SaleLine {
            resource_type: spec.name.clone(),
            amount: qty,
            points_gained: u64::from(qty).saturating_mul(spec.value),
            xp_gained: u64::from(qty).saturating_mul(spec.sale_xp),
        };
        points_gained = points_gained.saturating_add(line.points_gained);
        xp_gained = xp_gained.saturating_add(line.xp_gained);
        units_sold = units_sold.saturating_add(qty);
        lines.push(line);
    }

    ledger.credit_points(points_gained);
    let stats = ledger.stats_mut();
    stats.resources_sold = stats.resources_sold.saturating_add(units_sold);
    let level_up = award_xp(config, ledger, xp_gained);

    debug!(units_sold, points_gained, xp_gained, "Resources sold");
    let outcome = Sale {
        lines,
        points_gained,
        xp_gained,
    };
    let event = GameEvent::ResourcesSold(outcome.clone());
    Ok(Applied::new(outcome, event).with_event(level_up))
}

// ---------------------------------------------------------------------------
// Boosters
// ---------------------------------------------------------------------------

/// Apply a booster to an extracting cell.
///
/// Instant-completion boosters finish the extraction at `now`. Speed boosters
/// divide the remaining time by their multiplier, never below the catalog's
/// floor, and open an effect window on the cell; a cell takes one speed
/// effect at a time and only for resources within the booster's tier.
pub fn apply_booster(
    config: &EconomyConfig,
    ledger: &mut PlayerLedger,
    now: i64,
    cell_index: usize,
    booster_type: &str,
) -> Result<Applied<BoosterApplication>, EconomyError> {
    let spec = validation::booster(config, booster_type)?;
    validation::booster_held(ledger, &spec.name)?;
    let cell = validation::owned_cell(ledger, cell_index)?;
    if !cell.is_extracting() {
        return Err(EconomyError::CellNotExtracting { index: cell_index });
    }
    let end_time = cell.extraction_end_time.unwrap_or(now);

    let (new_end_time, timer) = match spec.effect {
        BoosterEffect::InstantComplete => {
            ledger.remove_item(Holding::Boosters, &spec.name, 1);
            ledger.set_extraction_end(cell_index, now)?;
            ledger.mark_ready(cell_index)?;
            ledger.clear_boost(cell_index);
            (now, TimerDirective::Cancel { cell: cell_index })
        }
        BoosterEffect::Speed => {
            if let Some(active) = ledger.boost(cell_index).filter(|b| b.is_active(now)) {
                return Err(EconomyError::BoosterAlreadyActiveOnCell {
                    index: cell_index,
                    expires_at: active.expires_at,
                });
            }
            let resource = validation::cell_resource(config, cell)?;
            if resource.level > spec.tier_max {
                return Err(EconomyError::TierTooHigh {
                    booster: spec.name.clone(),
                    tier_max: spec.tier_max,
                    resource: resource.name.clone(),
                    resource_level: resource.level,
                });
            }

            let remaining = end_time.saturating_sub(now).max(0);
            let reduced = remaining
                .checked_div(i64::from(spec.multiplier))
                .unwrap_or(remaining)
                .max(config.min_boosted_remaining_ms);
            let new_end = now.saturating_add(reduced);
            let window_ms = i64::try_from(spec.duration_secs.saturating_mul(1000))
                .unwrap_or(i64::MAX);

            ledger.remove_item(Holding::Boosters, &spec.name, 1);
            ledger.set_extraction_end(cell_index, new_end)?;
            ledger.set_boost(
                cell_index,
                ActiveBoost {
                    booster_type: spec.name.clone(),
                    expires_at: now.saturating_add(window_ms),
                },
            )?;
            (
                new_end,
                TimerDirective::Schedule {
                    cell: cell_index,
                    deadline: new_end,
                },
            )
        }
    };

    let stats = ledger.stats_mut();
    stats.boosters_used = stats.boosters_used.saturating_add(1);
    let selection = release_selection(ledger, Holding::Boosters, &spec.name);
    let level_up = award_xp(config, ledger, spec.use_xp);

    debug!(cell = cell_index, booster = %spec.name, new_end_time, "Booster applied");
    let outcome = BoosterApplication {
        cell_index,
        booster_type: spec.name.clone(),
        effect: spec.effect,
        multiplier: spec.multiplier,
        new_end_time,
        xp_gained: spec.use_xp,
    };
    let event = match spec.effect {
        BoosterEffect::InstantComplete => GameEvent::InstantExtractApplied(outcome.clone()),
        BoosterEffect::Speed => GameEvent::BoosterApplied(outcome.clone()),
    };
    Ok(Applied::new(outcome, event)
        .with_event(selection)
        .with_event(level_up)
        .with_timer(timer))
}

// ---------------------------------------------------------------------------
// Level and selection
// ---------------------------------------------------------------------------

/// Grant experience and apply any resulting level-up.
pub fn award_xp(config: &EconomyConfig, ledger: &mut PlayerLedger, amount: u64) -> Option<GameEvent> {
    let old_level = ledger.level();
    let xp = ledger.grant_xp(amount);
    let new_level = level_for_xp(&config.level_thresholds, xp);
    if new_level <= old_level {
        return None;
    }
    let max_cells = max_cells_for_level(&config.cell_unlocks, config.default_max_cells, new_level);
    ledger.set_level(new_level, max_cells);
    info!(old_level, new_level, max_cells, xp, "Level up");
    Some(GameEvent::LevelUp {
        old_level,
        new_level,
        max_cells,
    })
}

/// Bring a restored ledger's level and cell allowance in line with the
/// catalog. The level never drops below the stored one.
pub fn sync_level(config: &EconomyConfig, ledger: &mut PlayerLedger) {
    let stored_level = ledger.level();
    let level = level_for_xp(&config.level_thresholds, ledger.xp()).max(stored_level);
    let max_cells = max_cells_for_level(&config.cell_unlocks, config.default_max_cells, level);
    if level != stored_level {
        warn!(stored_level, level, xp = ledger.xp(), "Raising restored level to match experience");
    }
    if max_cells != ledger.max_cells() {
        warn!(stored = ledger.max_cells(), max_cells, level, "Recomputing restored cell allowance");
    }
    ledger.set_level(level, max_cells);
}

/// Remove from a restored ledger everything the catalog does not know.
///
/// Inventory entries under unknown names are dropped, cells extracting or
/// holding an unknown resource go back to idle, and effects of unknown
/// boosters are cleared. Each removal is logged.
pub fn sync_catalog(config: &EconomyConfig, ledger: &mut PlayerLedger) {
    for holding in [Holding::Resources, Holding::Expeditions, Holding::Boosters] {
        let dropped = ledger.retain_items(holding, |name| match holding {
            Holding::Boosters => config.booster(name).is_some(),
            Holding::Resources | Holding::Expeditions => config.resource(name).is_some(),
        });
        for (name, count) in dropped {
            warn!(?holding, item = %name, count, "Dropping unknown item from restored state");
        }
    }

    let stale: Vec<usize> = ledger
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| {
            cell.resource_type
                .as_deref()
                .is_some_and(|name| config.resource(name).is_none())
        })
        .map(|(index, _)| index)
        .collect();
    for index in stale {
        ledger.clear_boost(index);
        match ledger.clear_extraction(index) {
            Ok(resource) => warn!(
                cell = index,
                resource = resource.as_deref().unwrap_or_default(),
                "Resetting cell with unknown resource to idle"
            ),
            Err(err) => warn!(cell = index, %err, "Failed to reset restored cell"),
        }
    }

    let unknown_boosts: Vec<usize> = ledger
        .boosted_cells()
        .iter()
        .filter(|(_, boost)| config.booster(&boost.booster_type).is_none())
        .map(|(index, _)| *index)
        .collect();
    for index in unknown_boosts {
        ledger.clear_boost(index);
        warn!(cell = index, "Dropping effect of unknown booster");
    }
}

/// The current selection as an event.
pub fn selection_event(ledger: &PlayerLedger) -> GameEvent {
    GameEvent::SelectionChanged {
        mode: ledger.mode(),
        selected_expedition: ledger.selected_expedition().map(str::to_owned),
        selected_booster: ledger.selected_booster().map(str::to_owned),
    }
}

fn release_selection(ledger: &mut PlayerLedger, holding: Holding, item: &str) -> Option<GameEvent> {
    let selected = match holding {
        Holding::Expeditions => ledger.selected_expedition(),
        Holding::Boosters => ledger.selected_booster(),
        Holding::Resources => None,
    };
    if selected != Some(item) || ledger.count(holding, item) > 0 {
        return None;
    }
    ledger.clear_selection();
    Some(selection_event(ledger))
}

fn record_collection(ledger: &mut PlayerLedger, resource: &str) {
    let stats = ledger.stats_mut();
    stats.resources_collected = stats.resources_collected.saturating_add(1);
    match resource {
        RARE_RESOURCE => {
            stats.rare_resources_collected = stats.rare_resources_collected.saturating_add(1);
        }
        PLATINUM_RESOURCE => {
            stats.platinum_resources_collected =
                stats.platinum_resources_collected.saturating_add(1);
        }
        HELIUM_RESOURCE => {
            stats.helium_resources_collected = stats.helium_resources_collected.saturating_add(1);
        }
        _ => {}
    }
}

fn extraction_ms(spec: &ResourceSpec, speed_multiplier: u32) -> i64 {
    let base_ms = spec.extraction_secs.saturating_mul(1000);
    let scaled = base_ms
        .checked_div(u64::from(speed_multiplier))
        .unwrap_or(base_ms);
    i64::try_from(scaled).unwrap_or(i64::MAX)
}
