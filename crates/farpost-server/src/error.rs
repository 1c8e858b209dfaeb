//! Error types for the Farpost HTTP API.
//!
//! [`ApiError`] unifies all request failure modes into a single enum that
//! converts into an Axum HTTP response with a JSON `{ error, status }` body.
//! Rejected game actions are not API errors: they are answered with a
//! structured [`ActionResponse`](farpost_types::ActionResponse).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use farpost_economy::EconomyError;
use farpost_ledger::SnapshotError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session exists for the requested player.
    #[error("not found: {0}")]
    NotFound(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The request body could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A submitted player state failed validation. The session keeps its
    /// current state.
    #[error("invalid player state: {0}")]
    InvalidState(#[from] SnapshotError),

    /// A selection named an unknown or unheld item.
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] EconomyError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidUuid(msg) | Self::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::InvalidState(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::InvalidSelection(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
