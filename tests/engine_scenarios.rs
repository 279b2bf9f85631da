//! End-to-end scenarios through the public engine API: a storage-backed
//! engine is driven the way the front end drives it, then reloaded.

use rebirth_clicker::save::{self, STORAGE_KEY};
use rebirth_clicker::{
    BuyOutcome, Engine, FixedClock, GameState, MemoryStorage, RebirthOutcome, RedeemOutcome,
    Storage, UpgradeKind,
};

fn fresh(clock: &FixedClock) -> Engine<MemoryStorage, &FixedClock> {
    Engine::load(MemoryStorage::new(), clock)
}

#[test]
fn fresh_click_scores_one() {
    let clock = FixedClock::new(0.0);
    let mut engine = fresh(&clock);
    engine.click();
    assert_eq!(engine.state().score, 1.0);
}

#[test]
fn first_power_upgrade_costs_ten() {
    let clock = FixedClock::new(0.0);
    let mut engine = fresh(&clock);
    for _ in 0..10 {
        engine.click();
    }
    assert_eq!(engine.state().score, 10.0);
    assert_eq!(
        engine.buy_upgrade(UpgradeKind::Power),
        BuyOutcome::Purchased {
            kind: UpgradeKind::Power,
            level: 1,
            cost: 10.0
        }
    );
    assert_eq!(engine.state().score, 0.0);
    assert_eq!(engine.state().upgrades[&UpgradeKind::Power].level, 1);
    // Clicks are now worth 2.
    engine.click();
    assert_eq!(engine.state().score, 2.0);
}

#[test]
fn mixed_case_code_is_redeemed_once() {
    let clock = FixedClock::new(0.0);
    let mut engine = fresh(&clock);
    assert!(engine.redeem_code("RXCHH").is_success());
    assert_eq!(engine.state().permanent_click_boost, 50.0);
    assert_eq!(
        engine.redeem_code("rxchh"),
        RedeemOutcome::AlreadyRedeemed {
            code: "rxchh".into()
        }
    );
    assert_eq!(engine.state().permanent_click_boost, 50.0);
}

#[test]
fn rebirth_at_ten_thousand() {
    let clock = FixedClock::new(0.0);
    let mut state = GameState::new(0.0);
    state.score = 10_000.0;
    let mut engine = Engine::from_parts(state, MemoryStorage::new(), &clock);
    assert!(matches!(engine.rebirth(), RebirthOutcome::Reborn { rebirths: 1, .. }));
    assert_eq!(engine.rebirth_requirement(), 20_000.0);
    assert_eq!(engine.total_per_click(), 2.0);
}

#[test]
fn progress_survives_reload() {
    let clock = FixedClock::new(1_000.0);
    let mut engine = fresh(&clock);
    for _ in 0..120 {
        engine.click();
    }
    engine.buy_upgrade(UpgradeKind::Auto);
    engine.redeem_code("booty");
    clock.advance_secs(1.0);
    engine.tick(1.0);
    let before = engine.state().clone();

    let reloaded = Engine::load(engine.storage().clone(), &clock);
    assert_eq!(reloaded.state(), &before);
    assert_eq!(reloaded.auto_rate_per_second(), 5_000_000.0);
}

#[test]
fn time_away_is_paid_out() {
    let clock = FixedClock::new(0.0);
    let mut state = GameState::new(0.0);
    state.upgrades.get_mut(&UpgradeKind::Auto).unwrap().level = 2;
    let mut engine = Engine::from_parts(state, MemoryStorage::new(), &clock);
    engine.click();
    let storage = engine.storage().clone();

    clock.advance_secs(3_600.0);
    let mut reloaded = Engine::load(storage, &clock);
    let offline = reloaded.catch_up();
    assert_eq!(offline.seconds, 3_600.0);
    assert_eq!(offline.earned, 36_000.0);
    assert_eq!(reloaded.state().score, 36_001.0);
}

#[test]
fn save_from_original_format_loads() {
    let legacy = r#"{"score":2500.5,"rebirths":1,"multiplier":2,
        "upgrades":{"power":{"level":3,"cost":10,"costMul":1.15,"add":1},
                    "auto":{"level":2,"cost":100,"costMul":1.18,"add":5}},
        "lastTick":0}"#;
    let clock = FixedClock::new(0.0);
    let engine = Engine::load(MemoryStorage::with_entry(STORAGE_KEY, legacy), &clock);
    assert_eq!(engine.state().score, 2500.5);
    assert_eq!(engine.total_per_click(), 8.0);
    assert_eq!(engine.auto_rate_per_second(), 10.0);
    assert_eq!(engine.state().permanent_click_boost, 1.0);
}

#[test]
fn corrupt_save_starts_fresh() {
    let clock = FixedClock::new(7.0);
    let engine = Engine::load(MemoryStorage::with_entry(STORAGE_KEY, "}{"), &clock);
    assert_eq!(engine.state(), &GameState::new(7.0));
}

#[test]
fn partial_save_is_healed() {
    let clock = FixedClock::new(0.0);
    let engine = Engine::load(MemoryStorage::with_entry(STORAGE_KEY, r#"{"score":50}"#), &clock);
    let state = engine.state();
    assert_eq!(state.score, 50.0);
    assert_eq!(state.upgrades.len(), 2);
    assert_eq!(engine.upgrade_cost(UpgradeKind::Power), 10.0);
    assert_eq!(engine.upgrade_cost(UpgradeKind::Auto), 100.0);
}

#[test]
fn unwritable_storage_keeps_game_running() {
    let clock = FixedClock::new(0.0);
    let mut storage = MemoryStorage::new();
    storage.fail_writes = true;
    let mut engine = Engine::load(storage, &clock);
    engine.click();
    assert!(engine.redeem_code("rxchh").is_success());
    engine.click();
    assert_eq!(engine.state().score, 51.0);
    assert!(engine.storage().get(STORAGE_KEY).is_none());
}

#[test]
fn stacked_codes_and_rebirths_stay_finite() {
    let clock = FixedClock::new(0.0);
    let mut engine = fresh(&clock);
    assert!(engine.redeem_code("ascend").is_success());
    assert!(engine.redeem_code("rxchh").is_success());
    for _ in 0..2_000 {
        engine.click();
        engine.rebirth();
    }
    let state = engine.state();
    assert!(state.multiplier.is_finite());
    assert!(state.score.is_finite());
    assert!(engine.total_per_click().is_finite());

    // Saturated values survive a save/load cycle.
    let json = save::serialize(state).unwrap();
    assert_eq!(&save::load(&GameState::default(), Some(&json)), state);
}
