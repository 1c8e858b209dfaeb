//! Action request and result types for remote action dispatch.
//!
//! A remote caller sends `{ "action": <name>, "payload": { ... } }` with one
//! action name per economy operation. The response is either the operation's
//! success payload or a structured failure carrying an [`ErrorKind`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BoosterEffect, ErrorKind};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Payload for `purchase_expedition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseExpeditionPayload {
    /// Resource type of the expedition to buy.
    pub resource_type: String,
}

/// Payload for `purchase_booster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseBoosterPayload {
    /// Booster type to buy.
    pub booster_type: String,
}

/// Payload for `purchase_cell`. Without an index the first unowned cell is
/// bought.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseCellPayload {
    /// Specific cell to buy.
    #[serde(default)]
    pub cell_index: Option<usize>,
}

/// Payload for `deploy_expedition`. Without a type the selected expedition
/// is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DeployExpeditionPayload {
    /// Target cell.
    pub cell_index: usize,
    /// Resource type of the expedition to deploy.
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Payload for `collect_resource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CollectResourcePayload {
    /// Cell to collect from.
    pub cell_index: usize,
}

/// Payload for `sell_resources`. Without a type every holding is sold;
/// without an amount everything of the type is sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SellResourcesPayload {
    /// Resource type to sell.
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Units to sell.
    #[serde(default)]
    pub amount: Option<u32>,
}

/// Payload for `apply_booster`. Without a type the selected booster is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ApplyBoosterPayload {
    /// Target cell.
    pub cell_index: usize,
    /// Booster type to apply.
    #[serde(default)]
    pub booster_type: Option<String>,
}

// ---------------------------------------------------------------------------
// ActionRequest
// ---------------------------------------------------------------------------

/// One remotely dispatched economy action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionRequest {
    /// Buy one expedition.
    PurchaseExpedition(PurchaseExpeditionPayload),
    /// Buy one booster.
    PurchaseBooster(PurchaseBoosterPayload),
    /// Buy a grid cell.
    PurchaseCell(PurchaseCellPayload),
    /// Start an extraction on a cell.
    DeployExpedition(DeployExpeditionPayload),
    /// Collect a ready cell.
    CollectResource(CollectResourcePayload),
    /// Sell held resources.
    SellResources(SellResourcesPayload),
    /// Apply a booster to an extracting cell.
    ApplyBooster(ApplyBoosterPayload),
}

impl ActionRequest {
    /// The wire name of this action.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PurchaseExpedition(_) => "purchase_expedition",
            Self::PurchaseBooster(_) => "purchase_booster",
            Self::PurchaseCell(_) => "purchase_cell",
            Self::DeployExpedition(_) => "deploy_expedition",
            Self::CollectResource(_) => "collect_resource",
            Self::SellResources(_) => "sell_resources",
            Self::ApplyBooster(_) => "apply_booster",
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of buying an expedition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ExpeditionPurchase {
    /// Resource type bought.
    pub resource_type: String,
    /// Points paid.
    #[ts(type = "number")]
    pub cost: u64,
    /// Expeditions of this type now held.
    pub new_amount: u32,
    /// Points left after the purchase.
    #[ts(type = "number")]
    pub points_remaining: u64,
}

/// Result of buying a booster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BoosterPurchase {
    /// Booster type bought.
    pub booster_type: String,
    /// Points paid.
    #[ts(type = "number")]
    pub cost: u64,
    /// Boosters of this type now held.
    pub new_amount: u32,
    /// Points left after the purchase.
    #[ts(type = "number")]
    pub points_remaining: u64,
}

/// Result of buying a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CellPurchase {
    /// The cell now owned.
    pub cell_index: usize,
    /// Points paid.
    #[ts(type = "number")]
    pub cost: u64,
    /// Experience granted.
    #[ts(type = "number")]
    pub xp_gained: u64,
    /// Points left after the purchase.
    #[ts(type = "number")]
    pub points_remaining: u64,
}

/// Result of deploying an expedition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Deployment {
    /// The extracting cell.
    pub cell_index: usize,
    /// Resource being extracted.
    pub resource_type: String,
    /// Extraction start.
    #[ts(type = "number")]
    pub start_time: i64,
    /// Extraction end.
    #[ts(type = "number")]
    pub end_time: i64,
    /// Extraction length after the global speed multiplier.
    #[ts(type = "number")]
    pub duration_ms: i64,
}

/// Result of collecting a ready cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Collection {
    /// The collected cell.
    pub cell_index: usize,
    /// Resource collected.
    pub resource_type: String,
    /// Experience granted.
    #[ts(type = "number")]
    pub xp_gained: u64,
    /// Units of this resource now held.
    pub total_amount: u32,
}

/// One resource type's share of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SaleLine {
    /// Resource sold.
    pub resource_type: String,
    /// Units sold.
    pub amount: u32,
    /// Points earned for this line.
    #[ts(type = "number")]
    pub points_gained: u64,
    /// Experience earned for this line.
    #[ts(type = "number")]
    pub xp_gained: u64,
}

/// Result of selling resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Sale {
    /// Per-type breakdown.
    pub lines: Vec<SaleLine>,
    /// Total points earned.
    #[ts(type = "number")]
    pub points_gained: u64,
    /// Total experience earned.
    #[ts(type = "number")]
    pub xp_gained: u64,
}

/// Result of applying a booster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BoosterApplication {
    /// The boosted cell.
    pub cell_index: usize,
    /// Booster consumed.
    pub booster_type: String,
    /// How the booster acted.
    pub effect: BoosterEffect,
    /// Speed multiplier of the booster.
    pub multiplier: u32,
    /// The cell's extraction end after boosting.
    #[ts(type = "number")]
    pub new_end_time: i64,
    /// Experience granted.
    #[ts(type = "number")]
    pub xp_gained: u64,
}

/// The success payload of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "result", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionOutcome {
    /// See [`ExpeditionPurchase`].
    PurchaseExpedition(ExpeditionPurchase),
    /// See [`BoosterPurchase`].
    PurchaseBooster(BoosterPurchase),
    /// See [`CellPurchase`].
    PurchaseCell(CellPurchase),
    /// See [`Deployment`].
    DeployExpedition(Deployment),
    /// See [`Collection`].
    CollectResource(Collection),
    /// See [`Sale`].
    SellResources(Sale),
    /// See [`BoosterApplication`].
    ApplyBooster(BoosterApplication),
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Structured description of a rejected action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ActionFailure {
    /// Machine-readable classification.
    pub kind: ErrorKind,
    /// Human-readable explanation.
    pub message: String,
    /// The threshold that was not met (level, points, or units), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub required: Option<u64>,
    /// What the player actually had, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub available: Option<u64>,
}

/// Response envelope of a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionResponse {
    /// The action was applied.
    Ok {
        /// What the action produced.
        outcome: ActionOutcome,
    },
    /// The action was rejected and the state is unchanged.
    Rejected {
        /// Why the action was rejected.
        error: ActionFailure,
    },
}

impl ActionResponse {
    /// Whether the action was applied.
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
