//! One player's running game.
//!
//! A [`GameSession`] owns everything a player needs: the economy engine, the
//! ledger, the extraction timers, the event bus, and the clock. Callers hold
//! sessions by value or behind their own lock; there is no global instance.
//!
//! Every action follows the same path: fire any timers that are already due,
//! run the economy handler, reprogram the affected timers, then publish the
//! handler's events followed by [`GameEvent::StateChanged`]. A rejected
//! action publishes no events of its own.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use farpost_economy::handlers::selection_event;
use farpost_economy::{Applied, CatalogError, EconomyConfig, EconomyEngine, EconomyError, validation};
use farpost_ledger::{PlayerLedger, SnapshotError};
use farpost_types::{
    BoosterApplication, BoosterPurchase, CellPurchase, Collection, Deployment, EventKind,
    ExpeditionPurchase, ExtractionProgress, GameEvent, LoadSource, PlayerSnapshot, Sale,
};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::notifier::{EventBus, EventListener, SubscriptionId};
use crate::scheduler::ExtractionScheduler;

/// A single player's economy, timers, and listeners.
#[derive(Debug)]
pub struct GameSession {
    engine: EconomyEngine,
    ledger: PlayerLedger,
    scheduler: ExtractionScheduler,
    bus: EventBus,
    clock: Arc<dyn Clock>,
    speed_multiplier: u32,
}

impl GameSession {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Start a fresh game.
    pub fn new(engine: EconomyEngine, clock: Arc<dyn Clock>) -> Self {
        let ledger = engine.new_ledger();
        Self::with_ledger(engine, ledger, clock)
    }

    /// Resume a game from an existing ledger.
    ///
    /// Timers are rebuilt from the stored end times. Cells already past
    /// their end time become ready immediately.
    pub fn with_ledger(engine: EconomyEngine, ledger: PlayerLedger, clock: Arc<dyn Clock>) -> Self {
        let mut session = Self {
            engine,
            ledger,
            scheduler: ExtractionScheduler::new(),
            bus: EventBus::new(),
            clock,
            speed_multiplier: 1,
        };
        session.ledger.set_speed_multiplier(session.speed_multiplier);
        let now = session.clock.now_ms();
        let completed = session.scheduler.rearm_from(&mut session.ledger, now);
        if !completed.is_empty() {
            debug!(count = completed.len(), "Resolved overdue extractions on resume");
        }
        session
    }

    /// Start a fresh game from a loaded [`GameConfig`].
    pub fn from_config(config: &GameConfig, clock: Arc<dyn Clock>) -> Result<Self, CatalogError> {
        let engine = EconomyEngine::new(config.economy.clone())?;
        let mut session = Self::new(engine, clock);
        session.set_speed_multiplier(config.session.speed_multiplier);
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The player's ledger.
    pub const fn ledger(&self) -> &PlayerLedger {
        &self.ledger
    }

    /// The economy engine.
    pub const fn engine(&self) -> &EconomyEngine {
        &self.engine
    }

    /// The economy catalog.
    pub fn config(&self) -> &EconomyConfig {
        self.engine.config()
    }

    /// The session's current time.
    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Divisor applied to extraction times of new deployments.
    pub const fn speed_multiplier(&self) -> u32 {
        self.speed_multiplier
    }

    /// Change the deployment speed multiplier. Zero is treated as one.
    /// Extractions already running keep their end times.
    pub fn set_speed_multiplier(&mut self, multiplier: u32) {
        self.speed_multiplier = multiplier.max(1);
        self.ledger.set_speed_multiplier(self.speed_multiplier);
        if self.speed_multiplier > 1 {
            info!(multiplier = self.speed_multiplier, "Extraction speed multiplier enabled");
        }
    }

    /// The earliest pending extraction completion.
    pub fn next_deadline(&self) -> Option<i64> {
        self.scheduler.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register a listener for one event kind, or all events when `filter`
    /// is `None`.
    pub fn subscribe(
        &mut self,
        filter: Option<EventKind>,
        listener: Box<dyn EventListener>,
    ) -> SubscriptionId {
        self.bus.subscribe(filter, listener)
    }

    /// Remove a listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Complete every extraction whose end time has passed and drop expired
    /// booster effects. Returns the number of extractions completed.
    pub fn poll_timers(&mut self) -> usize {
        let now = self.clock.now_ms();
        let completed = self.scheduler.fire_due(&mut self.ledger, now);
        let expired = self.ledger.prune_expired_boosts(now);
        if !expired.is_empty() {
            debug!(cells = ?expired, "Booster effects expired");
        }
        if completed.is_empty() && expired.is_empty() {
            return 0;
        }
        self.publish_all(&completed);
        completed.len()
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Buy one expedition.
    pub fn purchase_expedition(
        &mut self,
        resource_type: &str,
    ) -> Result<ExpeditionPurchase, EconomyError> {
        self.run("purchase_expedition", |engine, ledger, _| {
            engine.purchase_expedition(ledger, resource_type)
        })
    }

    /// Buy one booster.
    pub fn purchase_booster(&mut self, booster_type: &str) -> Result<BoosterPurchase, EconomyError> {
        self.run("purchase_booster", |engine, ledger, _| {
            engine.purchase_booster(ledger, booster_type)
        })
    }

    /// Buy `cell_index`, or the lowest unowned cell.
    pub fn purchase_cell(&mut self, cell_index: Option<usize>) -> Result<CellPurchase, EconomyError> {
        self.run("purchase_cell", |engine, ledger, _| {
            engine.purchase_cell(ledger, cell_index)
        })
    }

    /// Start an extraction on an owned, idle cell. Without a type the
    /// selected expedition is deployed.
    pub fn deploy_expedition(
        &mut self,
        cell_index: usize,
        resource_type: Option<&str>,
    ) -> Result<Deployment, EconomyError> {
        self.run("deploy_expedition", |engine, ledger, now| {
            let resource_type = chosen(
                resource_type,
                ledger.selected_expedition(),
                EconomyError::NoExpeditionSelected,
            )?;
            engine.deploy_expedition(ledger, now, cell_index, &resource_type)
        })
    }

    /// Collect a ready cell.
    pub fn collect_resource(&mut self, cell_index: usize) -> Result<Collection, EconomyError> {
        self.run("collect_resource", |engine, ledger, _| {
            engine.collect_resource(ledger, cell_index)
        })
    }

    /// Sell resources of one type, or everything held.
    pub fn sell_resources(
        &mut self,
        resource_type: Option<&str>,
        amount: Option<u32>,
    ) -> Result<Sale, EconomyError> {
        self.run("sell_resources", |engine, ledger, _| {
            engine.sell_resources(ledger, resource_type, amount)
        })
    }

    /// Apply a booster to an extracting cell. Without a type the selected
    /// booster is applied.
    pub fn apply_booster(
        &mut self,
        cell_index: usize,
        booster_type: Option<&str>,
    ) -> Result<BoosterApplication, EconomyError> {
        self.run("apply_booster", |engine, ledger, now| {
            let booster_type = chosen(
                booster_type,
                ledger.selected_booster(),
                EconomyError::NoBoosterSelected,
            )?;
            engine.apply_booster(ledger, now, cell_index, &booster_type)
        })
    }

    fn run<T>(
        &mut self,
        action: &'static str,
        op: impl FnOnce(&EconomyEngine, &mut PlayerLedger, i64) -> Result<Applied<T>, EconomyError>,
    ) -> Result<T, EconomyError> {
        self.poll_timers();
        let now = self.clock.now_ms();
        match op(&self.engine, &mut self.ledger, now) {
            Ok(applied) => {
                self.scheduler.apply(&applied.timers);
                self.publish_all(&applied.events);
                Ok(applied.outcome)
            }
            Err(err) => {
                debug!(action, kind = ?err.kind(), %err, "Action rejected");
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select a held expedition and switch to deploy mode. Selecting the
    /// expedition that is already selected deselects it.
    pub fn select_expedition(&mut self, resource_type: &str) -> Result<(), EconomyError> {
        let spec = validation::resource(self.engine.config(), resource_type)?;
        validation::expedition_held(&self.ledger, &spec.name)?;
        if self.ledger.selected_expedition() == Some(spec.name.as_str()) {
            self.ledger.clear_selection();
        } else {
            let name = spec.name.clone();
            self.ledger.select_expedition(&name);
        }
        self.publish_selection();
        Ok(())
    }

    /// Select a held booster and switch to booster mode. Selecting the
    /// booster that is already selected deselects it.
    pub fn select_booster(&mut self, booster_type: &str) -> Result<(), EconomyError> {
        let spec = validation::booster(self.engine.config(), booster_type)?;
        validation::booster_held(&self.ledger, &spec.name)?;
        if self.ledger.selected_booster() == Some(spec.name.as_str()) {
            self.ledger.clear_selection();
        } else {
            let name = spec.name.clone();
            self.ledger.select_booster(&name);
        }
        self.publish_selection();
        Ok(())
    }

    /// Drop the selection and return to select mode.
    pub fn clear_selection(&mut self) {
        self.ledger.clear_selection();
        self.publish_selection();
    }

    fn publish_selection(&mut self) {
        let event = selection_event(&self.ledger);
        self.bus.publish(&event);
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Progress of the extraction running on `cell_index`, or `None` when the
    /// cell is idle, ready, or out of range.
    pub fn extraction_progress(&self, cell_index: usize) -> Option<ExtractionProgress> {
        let cell = self.ledger.cell(cell_index)?;
        if !cell.is_extracting() {
            return None;
        }
        let start = cell.extraction_start_time?;
        let end = cell.extraction_end_time.unwrap_or(start);
        let now = self.clock.now_ms();

        let total = end.saturating_sub(start).max(0);
        let elapsed = now.saturating_sub(start).clamp(0, total);
        let pct = elapsed
            .saturating_mul(100)
            .checked_div(total)
            .unwrap_or(100);
        Some(ExtractionProgress {
            cell_index,
            resource_type: cell.resource_type.clone().unwrap_or_default(),
            progress_pct: u8::try_from(pct).unwrap_or(100),
            time_remaining_ms: end.saturating_sub(now).max(0),
            total_time_ms: total,
        })
    }

    /// Progress of every running extraction, in cell order.
    pub fn active_extractions(&self) -> Vec<ExtractionProgress> {
        (0..self.ledger.cells().len())
            .filter_map(|index| self.extraction_progress(index))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// The persisted form of the ledger.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.ledger.snapshot()
    }

    /// Replace the ledger with a snapshot and rebuild its timers.
    pub fn restore(&mut self, snapshot: PlayerSnapshot) -> Result<(), SnapshotError> {
        let ledger = self.engine.restore(snapshot)?;
        self.install(ledger, LoadSource::Primary);
        Ok(())
    }

    /// Validate untrusted JSON and [`restore`](Self::restore) it.
    pub fn restore_json(&mut self, value: &Value) -> Result<(), SnapshotError> {
        let ledger = self.engine.restore_json(value)?;
        self.install(ledger, LoadSource::Primary);
        Ok(())
    }

    /// Load the first usable state among `primary` and `backup`, or start
    /// fresh. Returns where the state came from.
    pub fn load_or_fallback(&mut self, primary: Option<&Value>, backup: Option<&Value>) -> LoadSource {
        let candidates = [(LoadSource::Primary, primary), (LoadSource::Backup, backup)];
        for (source, value) in candidates {
            let Some(value) = value else {
                continue;
            };
            match self.engine.restore_json(value) {
                Ok(ledger) => {
                    self.install(ledger, source);
                    return source;
                }
                Err(err) => warn!(?source, %err, "Rejected stored state"),
            }
        }
        let ledger = self.engine.new_ledger();
        self.install(ledger, LoadSource::Fresh);
        LoadSource::Fresh
    }

    /// Discard all progress and start over from the starting state.
    pub fn reset(&mut self) {
        self.scheduler.clear();
        self.ledger = self.engine.new_ledger();
        self.ledger.set_speed_multiplier(self.speed_multiplier);
        info!("Game state reset");
        self.publish_all(&[GameEvent::StateReset]);
    }

    fn install(&mut self, mut ledger: PlayerLedger, source: LoadSource) {
        ledger.set_speed_multiplier(self.speed_multiplier);
        self.ledger = ledger;
        let now = self.clock.now_ms();
        let mut events = self.scheduler.rearm_from(&mut self.ledger, now);
        events.push(GameEvent::StateLoaded { source });
        info!(
            ?source,
            level = self.ledger.level(),
            pending = self.scheduler.armed_count(),
            "Game state loaded"
        );
        self.publish_all(&events);
    }

    /// Publish `events` in order, then a single `StateChanged`.
    fn publish_all(&mut self, events: &[GameEvent]) {
        for event in events {
            self.bus.publish(event);
        }
        self.bus.publish(&GameEvent::StateChanged);
    }
}

/// The item an action names, or the selected one.
fn chosen(
    explicit: Option<&str>,
    selected: Option<&str>,
    missing: EconomyError,
) -> Result<String, EconomyError> {
    explicit.or(selected).map(str::to_owned).ok_or(missing)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farpost_ledger::Holding;
    use farpost_types::InteractionMode;

    use super::*;
    use crate::clock::ManualClock;

    const START: i64 = 1_700_000_000_000;

    fn session() -> (Arc<ManualClock>, GameSession) {
        let clock = Arc::new(ManualClock::new(START));
        let engine = EconomyEngine::new(EconomyConfig::default()).unwrap();
        let session = GameSession::new(engine, clock.clone());
        (clock, session)
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let (clock, mut session) = session();
        assert!(session.purchase_expedition("Iron Ore").is_ok());
        assert!(session.deploy_expedition(7, Some("Iron Ore")).is_ok());
        clock.advance(15_000);

        let progress = session.extraction_progress(7);
        assert_eq!(progress.as_ref().map(|p| p.progress_pct), Some(25));
        assert_eq!(progress.as_ref().map(|p| p.time_remaining_ms), Some(45_000));
        assert_eq!(progress.map(|p| p.total_time_ms), Some(60_000));
        assert_eq!(session.active_extractions().len(), 1);
        assert!(session.extraction_progress(8).is_none());
    }

    #[test]
    fn polling_completes_due_extractions() {
        let (clock, mut session) = session();
        assert!(session.purchase_expedition("Lunar Regolith").is_ok());
        assert!(session.deploy_expedition(7, Some("Lunar Regolith")).is_ok());
        assert_eq!(session.next_deadline(), Some(START + 30_000));

        clock.advance(29_999);
        assert_eq!(session.poll_timers(), 0);
        clock.advance(1);
        assert_eq!(session.poll_timers(), 1);
        assert!(session.ledger().cell(7).is_some_and(|c| c.is_ready));
        assert!(session.active_extractions().is_empty());
    }

    #[test]
    fn actions_fire_overdue_timers_first() {
        let (clock, mut session) = session();
        assert!(session.purchase_expedition("Lunar Regolith").is_ok());
        assert!(session.deploy_expedition(7, Some("Lunar Regolith")).is_ok());
        clock.advance(60_000);
        // No explicit poll: collecting sees the cell as ready.
        assert!(session.collect_resource(7).is_ok());
    }

    #[test]
    fn selection_requires_held_item() {
        let (_, mut session) = session();
        assert!(matches!(
            session.select_expedition("Iron Ore"),
            Err(EconomyError::NoExpeditionInInventory { .. })
        ));
        assert!(session.purchase_expedition("Iron Ore").is_ok());
        assert!(session.select_expedition("Iron Ore").is_ok());
        assert_eq!(session.ledger().selected_expedition(), Some("Iron Ore"));
        session.clear_selection();
        assert!(session.ledger().selected_expedition().is_none());
    }

    #[test]
    fn reselecting_toggles_off() {
        let (_, mut session) = session();
        session.purchase_booster("Basic Booster").unwrap();
        session.select_booster("Basic Booster").unwrap();
        assert_eq!(session.ledger().mode(), InteractionMode::ApplyBooster);
        session.select_booster("Basic Booster").unwrap();
        assert!(session.ledger().selected_booster().is_none());
        assert_eq!(session.ledger().mode(), InteractionMode::Select);
    }

    #[test]
    fn selected_booster_is_applied_when_none_is_named() {
        let (_, mut session) = session();
        session.purchase_expedition("Iron Ore").unwrap();
        session.purchase_booster("Basic Booster").unwrap();
        session.deploy_expedition(7, Some("Iron Ore")).unwrap();
        assert_eq!(
            session.apply_booster(7, None).err(),
            Some(EconomyError::NoBoosterSelected)
        );

        session.select_booster("Basic Booster").unwrap();
        let applied = session.apply_booster(7, None).unwrap();
        assert_eq!(applied.booster_type, "Basic Booster");
        // The last unit was used, so the selection is released.
        assert!(session.ledger().selected_booster().is_none());
    }

    #[test]
    fn speed_multiplier_shortens_new_deployments() {
        let (_, mut session) = session();
        session.set_speed_multiplier(60);
        assert!(session.purchase_expedition("Iron Ore").is_ok());
        let deployment = session.deploy_expedition(7, Some("Iron Ore"));
        assert_eq!(deployment.map(|d| d.duration_ms).ok(), Some(1_000));
    }

    #[test]
    fn speed_multiplier_survives_reset() {
        let (_, mut session) = session();
        session.set_speed_multiplier(4);
        session.reset();
        assert_eq!(session.ledger().speed_multiplier(), 4);
    }

    #[test]
    fn fallback_uses_backup_then_fresh() {
        let (_, mut session) = session();
        assert!(session.purchase_expedition("Iron Ore").is_ok());
        let backup = serde_json::to_value(session.snapshot()).unwrap_or_default();
        let broken = serde_json::json!({ "level": 1 });

        assert_eq!(
            session.load_or_fallback(Some(&broken), Some(&backup)),
            LoadSource::Backup
        );
        assert_eq!(session.ledger().count(Holding::Expeditions, "Iron Ore"), 1);

        assert_eq!(session.load_or_fallback(Some(&broken), None), LoadSource::Fresh);
        assert_eq!(session.ledger().points(), 1000);
    }
}
