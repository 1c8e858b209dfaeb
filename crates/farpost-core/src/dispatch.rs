//! Remote action dispatch.
//!
//! Maps a wire-level [`ActionRequest`] onto the matching [`GameSession`]
//! method and wraps the result in an [`ActionResponse`]. Dispatch is a thin
//! mirror of the session API: the same validation, the same events.

use tracing::debug;

use farpost_economy::EconomyError;
use farpost_types::{ActionOutcome, ActionRequest, ActionResponse};

use crate::session::GameSession;

/// Run one remote action against `session`.
pub fn dispatch(session: &mut GameSession, request: ActionRequest) -> ActionResponse {
    let action = request.name();
    let result: Result<ActionOutcome, EconomyError> = match request {
        ActionRequest::PurchaseExpedition(p) => session
            .purchase_expedition(&p.resource_type)
            .map(ActionOutcome::PurchaseExpedition),
        ActionRequest::PurchaseBooster(p) => session
            .purchase_booster(&p.booster_type)
            .map(ActionOutcome::PurchaseBooster),
        ActionRequest::PurchaseCell(p) => session
            .purchase_cell(p.cell_index)
            .map(ActionOutcome::PurchaseCell),
        ActionRequest::DeployExpedition(p) => session
            .deploy_expedition(p.cell_index, p.resource_type.as_deref())
            .map(ActionOutcome::DeployExpedition),
        ActionRequest::CollectResource(p) => session
            .collect_resource(p.cell_index)
            .map(ActionOutcome::CollectResource),
        ActionRequest::SellResources(p) => session
            .sell_resources(p.resource_type.as_deref(), p.amount)
            .map(ActionOutcome::SellResources),
        ActionRequest::ApplyBooster(p) => session
            .apply_booster(p.cell_index, p.booster_type.as_deref())
            .map(ActionOutcome::ApplyBooster),
    };

    match result {
        Ok(outcome) => {
            debug!(action, "Dispatched action applied");
            ActionResponse::Ok { outcome }
        }
        Err(err) => ActionResponse::Rejected {
            error: err.to_failure(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use farpost_economy::{EconomyConfig, EconomyEngine};
    use farpost_types::{ErrorKind, PurchaseCellPayload, PurchaseExpeditionPayload};

    use super::*;
    use crate::clock::ManualClock;

    fn session() -> GameSession {
        let engine = EconomyEngine::new(EconomyConfig::default()).unwrap();
        GameSession::new(engine, Arc::new(ManualClock::new(0)))
    }

    #[test]
    fn applied_action_returns_outcome() {
        let mut session = session();
        let response = dispatch(
            &mut session,
            ActionRequest::PurchaseExpedition(PurchaseExpeditionPayload {
                resource_type: "Lunar Regolith".to_owned(),
            }),
        );
        assert!(matches!(
            response,
            ActionResponse::Ok {
                outcome: ActionOutcome::PurchaseExpedition(ref purchase)
            } if purchase.points_remaining == 980
        ));
    }

    #[test]
    fn rejected_action_leaves_state_alone() {
        let mut session = session();
        let response = dispatch(
            &mut session,
            ActionRequest::PurchaseCell(PurchaseCellPayload::default()),
        );
        // The cell allowance is already full at level 1.
        assert!(matches!(
            response,
            ActionResponse::Rejected { ref error } if error.kind == ErrorKind::MaxCellsReached
        ));
        assert_eq!(session.ledger().points(), 1000);
    }

    #[test]
    fn deploy_without_type_uses_the_selection() {
        let mut session = session();
        let deploy = serde_json::json!({
            "action": "deploy_expedition",
            "payload": { "cellIndex": 7 }
        });

        let response = dispatch(&mut session, serde_json::from_value(deploy.clone()).unwrap());
        assert!(matches!(
            response,
            ActionResponse::Rejected { ref error } if error.kind == ErrorKind::NothingSelected
        ));

        session.purchase_expedition("Iron Ore").unwrap();
        session.select_expedition("Iron Ore").unwrap();
        let response = dispatch(&mut session, serde_json::from_value(deploy).unwrap());
        assert!(matches!(
            response,
            ActionResponse::Ok {
                outcome: ActionOutcome::DeployExpedition(ref deployment)
            } if deployment.resource_type == "Iron Ore" && deployment.cell_index == 7
        ));
    }

    #[test]
    fn wire_request_dispatches() {
        let mut session = session();
        let raw = serde_json::json!({
            "action": "sell_resources",
            "payload": {}
        });
        let request: ActionRequest = serde_json::from_value(raw).unwrap();
        let response = dispatch(&mut session, request);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("rejected"));
        assert_eq!(
            json.pointer("/error/kind").and_then(|v| v.as_str()),
            Some("nothing_to_sell")
        );
    }
}
