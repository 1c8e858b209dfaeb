//! End-to-end game scenarios driven through [`GameSession`].
//!
//! Time is controlled with a [`ManualClock`], so extraction timers fire
//! exactly when the test advances the clock.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use farpost_core::{GameConfig, GameSession, ManualClock};
use farpost_economy::EconomyError;
use farpost_ledger::Holding;
use farpost_types::{EventKind, GameEvent, LoadSource};

const START: i64 = 1_700_000_000_000;

fn new_session() -> (Arc<ManualClock>, GameSession) {
    let clock = Arc::new(ManualClock::new(START));
    let session = GameSession::from_config(&GameConfig::default(), clock.clone()).unwrap();
    (clock, session)
}

fn record(session: &mut GameSession, filter: Option<EventKind>) -> Arc<Mutex<Vec<GameEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    session.subscribe(
        filter,
        Box::new(move |event: &GameEvent| sink.lock().unwrap().push(event.clone())),
    );
    log
}

fn kinds(log: &Arc<Mutex<Vec<GameEvent>>>) -> Vec<EventKind> {
    log.lock().unwrap().iter().map(GameEvent::kind).collect()
}

#[test]
fn buy_deploy_collect_sell() {
    let (clock, mut session) = new_session();
    assert_eq!(session.ledger().points(), 1000);

    let purchase = session.purchase_expedition("Lunar Regolith").unwrap();
    assert_eq!(purchase.points_remaining, 980);

    let deployment = session.deploy_expedition(7, Some("Lunar Regolith")).unwrap();
    assert_eq!(deployment.start_time, START);
    assert_eq!(deployment.end_time, START + 30_000);

    clock.advance(30_000);
    assert_eq!(session.poll_timers(), 1);
    assert!(session.ledger().cell(7).unwrap().is_ready);

    let collection = session.collect_resource(7).unwrap();
    assert_eq!(collection.total_amount, 1);
    assert_eq!(session.ledger().xp(), 10);
    assert!(!session.ledger().cell(7).unwrap().is_busy());

    let sale = session.sell_resources(Some("Lunar Regolith"), None).unwrap();
    assert_eq!(sale.points_gained, 50);
    assert_eq!(session.ledger().points(), 1030);
    assert_eq!(session.ledger().count(Holding::Resources, "Lunar Regolith"), 0);
    assert_eq!(session.ledger().xp(), 12);
}

#[test]
fn events_follow_the_mutation_in_order() {
    let (_, mut session) = new_session();
    let log = record(&mut session, None);

    session.purchase_expedition("Iron Ore").unwrap();
    session.select_expedition("Iron Ore").unwrap();
    session.deploy_expedition(8, Some("Iron Ore")).unwrap();

    assert_eq!(
        kinds(&log),
        vec![
            EventKind::ExpeditionPurchased,
            EventKind::StateChanged,
            EventKind::SelectionChanged,
            EventKind::ExpeditionDeployed,
            EventKind::SelectionChanged,
            EventKind::StateChanged,
        ]
    );
}

#[test]
fn rejected_actions_publish_nothing_and_change_nothing() {
    let (_, mut session) = new_session();
    let log = record(&mut session, None);
    let before = session.snapshot();

    assert!(matches!(
        session.collect_resource(7),
        Err(EconomyError::NotReady { index: 7 })
    ));
    assert!(matches!(
        session.deploy_expedition(7, Some("Iron Ore")),
        Err(EconomyError::NoExpeditionInInventory { .. })
    ));
    assert!(matches!(
        session.purchase_cell(None),
        Err(EconomyError::MaxCellsReached { max_cells: 3 })
    ));
    assert!(matches!(
        session.purchase_expedition("Kryptonite"),
        Err(EconomyError::UnknownResource { .. })
    ));

    assert!(kinds(&log).is_empty());
    assert_eq!(session.snapshot(), before);
}

#[test]
fn sales_can_cascade_level_ups() {
    let (_, mut session) = new_session();
    let mut snapshot = session.snapshot();
    snapshot.resources.insert("Helium-3".to_owned(), 5);
    session.restore(snapshot).unwrap();
    let log = record(&mut session, None);

    session.sell_resources(None, None).unwrap();

    assert_eq!(session.ledger().xp(), 1250);
    assert_eq!(session.ledger().level(), 3);
    assert_eq!(session.ledger().max_cells(), 5);
    assert_eq!(
        kinds(&log),
        vec![EventKind::ResourcesSold, EventKind::LevelUp, EventKind::StateChanged]
    );
    let level_up = log.lock().unwrap().get(1).cloned();
    assert_eq!(
        level_up,
        Some(GameEvent::LevelUp {
            old_level: 1,
            new_level: 3,
            max_cells: 5
        })
    );

    // The new allowance is immediately usable.
    session.purchase_cell(None).unwrap();
    assert_eq!(session.ledger().owned_cells(), 4);
}

#[test]
fn speed_booster_moves_the_completion_timer() {
    let (clock, mut session) = new_session();
    session.purchase_booster("Basic Booster").unwrap();
    session.purchase_expedition("Iron Ore").unwrap();
    session.deploy_expedition(7, Some("Iron Ore")).unwrap();

    clock.advance(20_000);
    let applied = session.apply_booster(7, Some("Basic Booster")).unwrap();
    assert_eq!(applied.new_end_time, START + 40_000);
    assert_eq!(session.next_deadline(), Some(START + 40_000));

    clock.set(START + 40_000);
    assert_eq!(session.poll_timers(), 1);
    assert!(session.ledger().cell(7).unwrap().is_ready);
    // The effect ends with the extraction.
    assert!(session.ledger().boost(7).is_none());
}

#[test]
fn instant_extract_cancels_the_pending_timer() {
    let (clock, mut session) = new_session();
    let mut snapshot = session.snapshot();
    snapshot.boosters.insert("Instant Extract".to_owned(), 1);
    session.restore(snapshot).unwrap();

    session.purchase_expedition("Water Ice").unwrap();
    session.deploy_expedition(9, Some("Water Ice")).unwrap();
    let log = record(&mut session, Some(EventKind::ExtractionComplete));

    clock.advance(1_000);
    session.apply_booster(9, Some("Instant Extract")).unwrap();
    assert!(session.ledger().cell(9).unwrap().is_ready);
    assert_eq!(session.next_deadline(), None);

    clock.advance(240_000);
    assert_eq!(session.poll_timers(), 0);
    assert!(kinds(&log).is_empty());
    session.collect_resource(9).unwrap();
}

#[test]
fn restore_keeps_absolute_end_times() {
    let (clock, mut session) = new_session();
    session.purchase_expedition("Iron Ore").unwrap();
    session.purchase_expedition("Lunar Regolith").unwrap();
    session.deploy_expedition(7, Some("Iron Ore")).unwrap();
    session.deploy_expedition(8, Some("Lunar Regolith")).unwrap();
    let saved = serde_json::to_value(session.snapshot()).unwrap();

    // A new session picks the save up 45 seconds later.
    clock.advance(45_000);
    let mut resumed = GameSession::from_config(&GameConfig::default(), clock.clone()).unwrap();
    let log = record(&mut resumed, None);
    assert_eq!(resumed.load_or_fallback(Some(&saved), None), LoadSource::Primary);

    // Lunar Regolith (30 s) finished while away; Iron Ore (60 s) did not.
    assert!(resumed.ledger().cell(8).unwrap().is_ready);
    let iron = resumed.ledger().cell(7).unwrap();
    assert!(!iron.is_ready);
    assert_eq!(iron.extraction_end_time, Some(START + 60_000));
    assert_eq!(resumed.next_deadline(), Some(START + 60_000));
    assert_eq!(
        kinds(&log),
        vec![
            EventKind::ExtractionComplete,
            EventKind::StateLoaded,
            EventKind::StateChanged,
        ]
    );

    clock.set(START + 60_000);
    assert_eq!(resumed.poll_timers(), 1);
}

#[test]
fn invalid_state_falls_back() {
    let (_, mut session) = new_session();
    let mut bad_cells = serde_json::to_value(session.snapshot()).unwrap();
    if let Some(cells) = bad_cells.get_mut("cells").and_then(|c| c.as_array_mut()) {
        cells.truncate(17);
    }
    let negative = serde_json::json!({
        "level": 1, "xp": -5, "points": 10, "ownedCells": 3, "maxCells": 3,
        "resources": {}, "expeditions": {}, "boosters": {}, "cells": []
    });

    assert!(session.restore_json(&bad_cells).is_err());
    assert_eq!(
        session.load_or_fallback(Some(&negative), Some(&bad_cells)),
        LoadSource::Fresh
    );
    assert_eq!(session.ledger().points(), 1000);
}

#[test]
fn reset_discards_progress_and_timers() {
    let (clock, mut session) = new_session();
    session.purchase_expedition("Lunar Regolith").unwrap();
    session.deploy_expedition(7, Some("Lunar Regolith")).unwrap();
    let log = record(&mut session, None);

    session.reset();
    assert_eq!(kinds(&log), vec![EventKind::StateReset, EventKind::StateChanged]);
    assert_eq!(session.ledger().points(), 1000);
    assert_eq!(session.next_deadline(), None);
    assert!(!session.ledger().cell(7).unwrap().is_busy());

    clock.advance(30_000);
    assert_eq!(session.poll_timers(), 0);
}

#[test]
fn cell_purchase_and_allowance() {
    let (_, mut session) = new_session();
    let mut snapshot = session.snapshot();
    snapshot.xp = 300;
    snapshot.level = 2;
    session.restore(snapshot).unwrap();
    assert_eq!(session.ledger().max_cells(), 4);

    let cell = session.purchase_cell(Some(0)).unwrap();
    assert_eq!(cell.cell_index, 0);
    assert_eq!(cell.points_remaining, 500);
    assert!(matches!(
        session.purchase_cell(None),
        Err(EconomyError::MaxCellsReached { max_cells: 4 })
    ));
    assert_eq!(session.ledger().stats().cells_purchased, 1);
}

#[test]
fn restored_names_outside_the_catalog_are_dropped() {
    let (_, mut session) = new_session();
    let mut saved = serde_json::to_value(session.snapshot()).unwrap();
    saved["resources"] = serde_json::json!({ "Gold": 1, "Iron Ore": 3 });
    saved["expeditions"] = serde_json::json!({ "Iron Ore": 1 });
    saved["cells"][7] = serde_json::json!({
        "id": 7,
        "owned": true,
        "resourceType": "Gold",
        "extractionStartTime": START - 60_000,
        "extractionEndTime": START - 1_000,
        "isReady": true
    });
    session.restore_json(&saved).unwrap();

    assert_eq!(session.ledger().count(Holding::Resources, "Gold"), 0);
    let cell = session.ledger().cell(7).unwrap();
    assert!(cell.owned);
    assert!(!cell.is_busy());

    // Neither leftover blocks the economy.
    let sale = session.sell_resources(None, None).unwrap();
    assert_eq!(sale.points_gained, 300);
    assert!(matches!(
        session.collect_resource(7),
        Err(EconomyError::NotReady { index: 7 })
    ));
    session.deploy_expedition(7, Some("Iron Ore")).unwrap();
}

#[test]
fn speed_booster_reapplies_after_its_window() {
    let clock = Arc::new(ManualClock::new(START));
    let mut config = GameConfig::default();
    for booster in &mut config.economy.boosters {
        if booster.name == "Basic Booster" {
            booster.duration_secs = 10;
        }
    }
    let mut session = GameSession::from_config(&config, clock.clone()).unwrap();
    session.purchase_booster("Basic Booster").unwrap();
    session.purchase_booster("Basic Booster").unwrap();
    session.purchase_expedition("Water Ice").unwrap();
    session.deploy_expedition(7, Some("Water Ice")).unwrap();

    session.apply_booster(7, Some("Basic Booster")).unwrap();
    assert_eq!(session.next_deadline(), Some(START + 120_000));
    assert!(matches!(
        session.apply_booster(7, Some("Basic Booster")),
        Err(EconomyError::BoosterAlreadyActiveOnCell { .. })
    ));

    clock.advance(10_000);
    session.poll_timers();
    assert!(session.ledger().boost(7).is_none());

    // 110 s remain; halved to 55 s.
    let applied = session.apply_booster(7, Some("Basic Booster")).unwrap();
    assert_eq!(applied.new_end_time, START + 65_000);
    assert_eq!(session.next_deadline(), Some(START + 65_000));

    clock.set(START + 65_000);
    assert_eq!(session.poll_timers(), 1);
    assert!(session.ledger().cell(7).unwrap().is_ready);
}

#[test]
fn selection_drives_typeless_actions() {
    let (_, mut session) = new_session();
    session.purchase_expedition("Iron Ore").unwrap();
    session.purchase_expedition("Iron Ore").unwrap();

    assert!(matches!(
        session.deploy_expedition(7, None),
        Err(EconomyError::NoExpeditionSelected)
    ));
    session.select_expedition("Iron Ore").unwrap();
    session.select_expedition("Iron Ore").unwrap();
    assert!(session.ledger().selected_expedition().is_none());

    session.select_expedition("Iron Ore").unwrap();
    let deployment = session.deploy_expedition(7, None).unwrap();
    assert_eq!(deployment.resource_type, "Iron Ore");
    // One expedition is left, so the selection stays for the next cell.
    assert_eq!(session.ledger().selected_expedition(), Some("Iron Ore"));
    session.deploy_expedition(8, None).unwrap();
    assert!(session.ledger().selected_expedition().is_none());
}
