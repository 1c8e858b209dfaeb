//! HTTP action-dispatch server for the Farpost mining game.
//!
//! A thin remote surface over [`farpost_core::GameSession`]: every endpoint
//! maps one-to-one onto a session operation, and the wire types are the ones
//! defined in `farpost-types`.
//!
//! # Architecture
//!
//! [`AppState`] keeps one session per player, each behind its own async
//! mutex. A background task started by [`spawn_timer_poller`] fires due
//! extraction timers across all sessions at the configured interval, and
//! every request also fires any overdue timers of the session it touches
//! before acting.
//!
//! # Modules
//!
//! - [`error`] -- [`ApiError`] and its JSON response mapping
//! - [`handlers`] -- Endpoint handlers and their request/response bodies
//! - [`router`] -- Route table and middleware
//! - [`server`] -- Listener and timer poller lifecycle
//! - [`state`] -- Shared session table

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, spawn_timer_poller, start_server};
pub use state::AppState;
