//! The economy engine: a shared catalog plus the action handlers.
//!
//! [`EconomyEngine`] is cheap to clone and holds no player state. Every
//! operation takes the ledger it acts on, so one engine serves any number of
//! sessions.

use std::sync::Arc;

use farpost_ledger::{PlayerLedger, SnapshotError};
use farpost_types::{
    BoosterApplication, BoosterPurchase, CellPurchase, Collection, Deployment, ExpeditionPurchase,
    PlayerSnapshot, Sale,
};

use crate::config::EconomyConfig;
use crate::error::{CatalogError, EconomyError};
use crate::handlers::{self, Applied};

/// Validation and mutation rules for every player action.
#[derive(Debug, Clone)]
pub struct EconomyEngine {
    config: Arc<EconomyConfig>,
}

impl EconomyEngine {
    /// Build an engine over a validated catalog.
    pub fn new(config: EconomyConfig) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Build an engine over an already shared catalog.
    pub fn from_shared(config: Arc<EconomyConfig>) -> Result<Self, CatalogError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The catalog.
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// A shared handle to the catalog.
    pub fn shared_config(&self) -> Arc<EconomyConfig> {
        Arc::clone(&self.config)
    }

    /// A brand-new player ledger in the catalog's starting state.
    pub fn new_ledger(&self) -> PlayerLedger {
        let starting = &self.config.starting;
        let max_cells = crate::level::max_cells_for_level(
            &self.config.cell_unlocks,
            self.config.default_max_cells,
            1,
        );
        PlayerLedger::fresh(starting.points, &starting.cells, max_cells)
    }

    /// Rebuild a ledger from a persisted snapshot and align it with the
    /// catalog: level and cell allowance are recomputed, and names the
    /// catalog does not list are dropped (see [`handlers::sync_catalog`]).
    pub fn restore(&self, snapshot: PlayerSnapshot) -> Result<PlayerLedger, SnapshotError> {
        let mut ledger = PlayerLedger::from_snapshot(snapshot)?;
        handlers::sync_level(&self.config, &mut ledger);
        handlers::sync_catalog(&self.config, &mut ledger);
        Ok(ledger)
    }

    /// Validate untrusted JSON, then [`restore`](Self::restore) it.
    pub fn restore_json(&self, value: &serde_json::Value) -> Result<PlayerLedger, SnapshotError> {
        self.restore(farpost_ledger::parse_snapshot(value)?)
    }

    /// See [`handlers::purchase_expedition`].
    pub fn purchase_expedition(
        &self,
        ledger: &mut PlayerLedger,
        resource_type: &str,
    ) -> Result<Applied<ExpeditionPurchase>, EconomyError> {
        handlers::purchase_expedition(&self.config, ledger, resource_type)
    }

    /// See [`handlers::purchase_booster`].
    pub fn purchase_booster(
        &self,
        ledger: &mut PlayerLedger,
        booster_type: &str,
    ) -> Result<Applied<BoosterPurchase>, EconomyError> {
        handlers::purchase_booster(&self.config, ledger, booster_type)
    }

    /// See [`handlers::purchase_cell`].
    pub fn purchase_cell(
        &self,
        ledger: &mut PlayerLedger,
        cell_index: Option<usize>,
    ) -> Result<Applied<CellPurchase>, EconomyError> {
        handlers::purchase_cell(&self.config, ledger, cell_index)
    }

    /// See [`handlers::deploy_expedition`].
    pub fn deploy_expedition(
        &self,
        ledger: &mut PlayerLedger,
        now: i64,
        cell_index: usize,
        resource_type: &str,
    ) -> Result<Applied<Deployment>, EconomyError> {
        handlers::deploy_expedition(&self.config, ledger, now, cell_index, resource_type)
    }

    /// See [`handlers::collect_resource`].
    pub fn collect_resource(
        &self,
        ledger: &mut PlayerLedger,
        cell_index: usize,
    ) -> Result<Applied<Collection>, EconomyError> {
        handlers::collect_resource(&self.config, ledger, cell_index)
    }

    /// See [`handlers::sell_resources`].
    pub fn sell_resources(
        &self,
        ledger: &mut PlayerLedger,
        resource_type: Option<&str>,
        amount: Option<u32>,
    ) -> Result<Applied<Sale>, EconomyError> {
        handlers::sell_resources(&self.config, ledger, resource_type, amount)
    }

    /// See [`handlers::apply_booster`].
    pub fn apply_booster(
        &self,
        ledger: &mut PlayerLedger,
        now: i64,
        cell_index: usize,
        booster_type: &str,
    ) -> Result<Applied<BoosterApplication>, EconomyError> {
        handlers::apply_booster(&self.config, ledger, now, cell_index, booster_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EconomyEngine {
        EconomyEngine::new(EconomyConfig::default())
            .ok()
            .unwrap_or_else(|| EconomyEngine {
                config: Arc::new(EconomyConfig::default()),
            })
    }

    #[test]
    fn new_ledger_matches_starting_state() {
        let ledger = engine().new_ledger();
        assert_eq!(ledger.level(), 1);
        assert_eq!(ledger.xp(), 0);
        assert_eq!(ledger.points(), 1000);
        assert_eq!(ledger.max_cells(), 3);
        let owned: Vec<usize> = ledger
            .cells()
            .iter()
            .filter(|c| c.owned)
            .map(|c| c.id)
            .collect();
        assert_eq!(owned, vec![7, 8, 9]);
    }

    #[test]
    fn invalid_catalog_is_refused() {
        let config = EconomyConfig {
            level_thresholds: Vec::new(),
            ..EconomyConfig::default()
        };
        assert!(matches!(
            EconomyEngine::new(config),
            Err(CatalogError::EmptyThresholds)
        ));
    }

    #[test]
    fn restore_recomputes_allowance_from_level() {
        let engine = engine();
        let mut snapshot = engine.new_ledger().snapshot();
        snapshot.level = 3;
        snapshot.xp = 1250;
        snapshot.max_cells = 40;
        let restored = engine.restore(snapshot).ok();
        assert_eq!(restored.as_ref().map(PlayerLedger::max_cells), Some(5));
        assert_eq!(restored.map(|l| l.level()), Some(3));
    }
}
