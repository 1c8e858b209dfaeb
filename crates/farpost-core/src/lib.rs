//! Game sessions for the Farpost mining economy.
//!
//! This crate ties the economy engine to time and to observers. A
//! [`GameSession`] owns one player's ledger, the per-cell extraction timers,
//! an event bus, and an injected clock; every action runs synchronously to
//! completion and publishes its events only after the ledger is updated.
//!
//! # Modules
//!
//! - [`clock`] -- The [`Clock`] trait, wall-clock and manual implementations
//! - [`config`] -- YAML game configuration with environment overrides
//! - [`scheduler`] -- Cancelable per-cell completion timers
//! - [`notifier`] -- Typed publish/subscribe over [`farpost_types::EventKind`]
//! - [`session`] -- The [`GameSession`] itself
//! - [`dispatch`] -- Wire-level action dispatch onto a session

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod notifier;
pub mod scheduler;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use dispatch::dispatch;
pub use notifier::{EventBus, EventListener, SubscriptionId};
pub use scheduler::{DeadlineQueue, ExtractionScheduler, TimerQueue, TimerToken};
pub use session::GameSession;
