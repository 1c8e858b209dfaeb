//! Shared type definitions for the Farpost mining economy.
//!
//! This crate is the single source of truth for the data exchanged between
//! the economy engine, the game session, and remote callers. Types flow to
//! `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for player sessions
//! - [`enums`] -- Closed sets (interaction modes, event kinds, error kinds)
//! - [`structs`] -- Grid cells, player snapshot, statistics, progress
//! - [`actions`] -- Action request/outcome types for remote dispatch
//! - [`events`] -- Notifications published by a game session

pub mod actions;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{
    ActionFailure, ActionOutcome, ActionRequest, ActionResponse, ApplyBoosterPayload,
    BoosterApplication, BoosterPurchase, CellPurchase, Collection, CollectResourcePayload,
    DeployExpeditionPayload, Deployment, ExpeditionPurchase, PurchaseBoosterPayload,
    PurchaseCellPayload, PurchaseExpeditionPayload, Sale, SaleLine, SellResourcesPayload,
};
pub use enums::{BoosterEffect, ErrorKind, EventKind, InteractionMode, LoadSource};
pub use events::GameEvent;
pub use ids::PlayerId;
pub use structs::{ActiveBoost, Cell, ExtractionProgress, GRID_SIZE, PlayerSnapshot, PlayerStats};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::PlayerId::export_all();

        let _ = crate::enums::InteractionMode::export_all();
        let _ = crate::enums::BoosterEffect::export_all();
        let _ = crate::enums::EventKind::export_all();
        let _ = crate::enums::ErrorKind::export_all();
        let _ = crate::enums::LoadSource::export_all();

        let _ = crate::structs::Cell::export_all();
        let _ = crate::structs::ActiveBoost::export_all();
        let _ = crate::structs::PlayerStats::export_all();
        let _ = crate::structs::PlayerSnapshot::export_all();
        let _ = crate::structs::ExtractionProgress::export_all();

        let _ = crate::actions::ActionRequest::export_all();
        let _ = crate::actions::ActionOutcome::export_all();
        let _ = crate::actions::ActionResponse::export_all();

        let _ = crate::events::GameEvent::export_all();
    }
}
