//! REST endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness and session count |
//! | `GET` | `/api/config` | The economy catalog |
//! | `POST` | `/api/players` | Open a session, optionally from saved state |
//! | `GET` | `/api/players/{id}/state` | Current state and running extractions |
//! | `PUT` | `/api/players/{id}/state` | Replace the state after validation |
//! | `POST` | `/api/players/{id}/actions` | Dispatch one economy action |
//! | `POST` | `/api/players/{id}/selection` | Select or deselect an item |
//! | `POST` | `/api/players/{id}/reset` | Start the player over |
//! | `DELETE` | `/api/players/{id}` | Close the session |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use farpost_core::{GameSession, dispatch};
use farpost_types::{
    ActionRequest, ActionResponse, ExtractionProgress, InteractionMode, LoadSource, PlayerId,
    PlayerSnapshot,
};

use crate::error::ApiError;
use crate::state::{AppState, SharedSession};

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/players`. Both fields are optional; an empty body
/// starts a fresh game.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerRequest {
    /// Saved state to resume.
    #[serde(default)]
    pub state: Option<Value>,
    /// Fallback state used when `state` is missing or invalid.
    #[serde(default)]
    pub backup: Option<Value>,
}

/// Body of `POST /api/players/{id}/selection`. Naming an expedition or a
/// booster selects it, or deselects it when it is already selected. An
/// empty body clears the selection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    /// Expedition resource type to select.
    #[serde(default)]
    pub expedition: Option<String>,
    /// Booster type to select.
    #[serde(default)]
    pub booster: Option<String>,
}

/// A player's state as served by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    /// The session handle.
    pub player_id: PlayerId,
    /// The persisted form of the ledger.
    pub state: PlayerSnapshot,
    /// Current interaction mode.
    pub mode: InteractionMode,
    /// Selected expedition, if any.
    pub selected_expedition: Option<String>,
    /// Selected booster, if any.
    pub selected_booster: Option<String>,
    /// Progress of every running extraction.
    pub active_extractions: Vec<ExtractionProgress>,
    /// The earliest pending completion, epoch milliseconds.
    pub next_deadline: Option<i64>,
}

impl StateView {
    fn of(player_id: PlayerId, session: &GameSession) -> Self {
        let ledger = session.ledger();
        Self {
            player_id,
            state: session.snapshot(),
            mode: ledger.mode(),
            selected_expedition: ledger.selected_expedition().map(str::to_owned),
            selected_booster: ledger.selected_booster().map(str::to_owned),
            active_extractions: session.active_extractions(),
            next_deadline: session.next_deadline(),
        }
    }
}

/// Response of `POST /api/players`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerResponse {
    /// Where the starting state came from.
    pub source: LoadSource,
    /// The new session's state.
    #[serde(flatten)]
    pub view: StateView,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report liveness.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.config.version,
        "sessions": state.session_count().await,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/config
// ---------------------------------------------------------------------------

/// Serve the economy catalog the engine runs on.
#[allow(clippy::unused_async)]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(serde_json::to_value(&state.config.economy)?))
}

// ---------------------------------------------------------------------------
// POST /api/players
// ---------------------------------------------------------------------------

/// Open a new player session.
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: CreatePlayerRequest = if body.is_empty() {
        CreatePlayerRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let (id, source, session) = state
        .create_session(request.state.as_ref(), request.backup.as_ref())
        .await;
    let view = StateView::of(id, &*session.lock().await);
    Ok((StatusCode::CREATED, Json(CreatePlayerResponse { source, view })))
}

// ---------------------------------------------------------------------------
// GET /api/players/{id}/state
// ---------------------------------------------------------------------------

/// Return a player's current state.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (id, session) = find_session(&state, &id_str).await?;
    let mut session = session.lock().await;
    session.poll_timers();
    Ok(Json(StateView::of(id, &session)))
}

// ---------------------------------------------------------------------------
// PUT /api/players/{id}/state
// ---------------------------------------------------------------------------

/// Replace a player's state.
///
/// The body is validated in full before anything changes; an invalid body is
/// answered with `422` and the current state stays in place.
pub async fn put_state(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let (id, session) = find_session(&state, &id_str).await?;
    let mut session = session.lock().await;
    if let Err(err) = session.restore_json(&body) {
        warn!(player = %id, %err, "Rejected submitted state, keeping current state");
        return Err(ApiError::InvalidState(err));
    }
    Ok(Json(StateView::of(id, &session)))
}

// ---------------------------------------------------------------------------
// POST /api/players/{id}/actions
// ---------------------------------------------------------------------------

/// Dispatch one action. Applied actions answer `200`, rejected ones `422`;
/// both carry an [`ActionResponse`] body.
pub async fn post_action(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: ActionRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let (id, session) = find_session(&state, &id_str).await?;
    let action = request.name();

    let response = dispatch(&mut *session.lock().await, request);
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    if let ActionResponse::Rejected { error } = &response {
        debug!(player = %id, action, kind = ?error.kind, "Action rejected");
    }
    Ok((status, Json(response)))
}

// ---------------------------------------------------------------------------
// POST /api/players/{id}/selection
// ---------------------------------------------------------------------------

/// Change the selection that typeless deploy and booster actions use.
pub async fn select_item(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: SelectionRequest = if body.is_empty() {
        SelectionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };
    let (id, session) = find_session(&state, &id_str).await?;
    let mut session = session.lock().await;
    match (request.expedition.as_deref(), request.booster.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(ApiError::BadRequest(
                "select an expedition or a booster, not both".to_owned(),
            ));
        }
        (Some(expedition), None) => session.select_expedition(expedition)?,
        (None, Some(booster)) => session.select_booster(booster)?,
        (None, None) => session.clear_selection(),
    }
    Ok(Json(StateView::of(id, &session)))
}

// ---------------------------------------------------------------------------
// POST /api/players/{id}/reset
// ---------------------------------------------------------------------------

/// Discard a player's progress.
pub async fn reset_player(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (id, session) = find_session(&state, &id_str).await?;
    let mut session = session.lock().await;
    session.reset();
    Ok(Json(StateView::of(id, &session)))
}

// ---------------------------------------------------------------------------
// DELETE /api/players/{id}
// ---------------------------------------------------------------------------

/// Close a player's session. Its state is gone unless the client saved it.
pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = PlayerId::from(parse_uuid(&id_str)?);
    if state.remove_session(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("player {id}")))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_session(state: &AppState, id_str: &str) -> Result<(PlayerId, SharedSession), ApiError> {
    let id = PlayerId::from(parse_uuid(id_str)?);
    let session = state
        .session(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("player {id}")))?;
    Ok((id, session))
}

fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
