//! Economy rules engine for the Farpost mining game.
//!
//! This crate decides whether a player action is allowed and what it does to
//! the [`PlayerLedger`](farpost_ledger::PlayerLedger). It never reads a clock
//! or arms a timer itself: handlers take the current time as an argument and
//! return the timer changes for the caller to carry out.
//!
//! # Modules
//!
//! - [`config`] -- The catalog: resources, boosters, level curve, cell pricing
//! - [`level`] -- Level and cell-allowance lookups
//! - [`validation`] -- Read-only precondition checks
//! - [`handlers`] -- Action execution and level-up handling
//! - [`engine`] -- [`EconomyEngine`], the catalog-owning entry point
//! - [`error`] -- [`EconomyError`] and [`CatalogError`]

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod level;
pub mod validation;

pub use config::{BoosterSpec, EconomyConfig, ResourceSpec, StartingConfig};
pub use engine::EconomyEngine;
pub use error::{CatalogError, EconomyError};
pub use handlers::{Applied, TimerDirective};
