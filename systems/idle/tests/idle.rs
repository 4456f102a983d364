use std::time::Duration;

use rail_tycoon_core::{Command, Event};
use rail_tycoon_system_idle::{compute_offline_earnings, IdleConfig, IdleTicker};
use rail_tycoon_world::{self as world, query, World};

fn tick(world: &mut World, ticker: &mut IdleTicker, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let money_per_second = query::economy(world).money_per_second();
    let mut commands = Vec::new();
    ticker.handle(&events, money_per_second, &mut commands);
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn set_yield(world: &mut World, money_per_second: f64) {
    let mut events = Vec::new();
    world::apply(world, Command::SetYield { money_per_second }, &mut events);
}

#[test]
fn ten_minutes_away_at_one_per_second_earns_three_hundred() {
    let config = IdleConfig::default();
    assert_eq!(compute_offline_earnings(600.0, 1.0, &config), 300.0);
}

#[test]
fn five_days_away_is_capped_at_one_day() {
    let config = IdleConfig::default();
    assert_eq!(compute_offline_earnings(432_000.0, 10.0, &config), 432_000.0);
}

#[test]
fn one_accrual_per_full_interval() {
    let mut world = World::new();
    let mut ticker = IdleTicker::default();
    set_yield(&mut world, 25.0);
    let start = query::economy(&world).money();

    let mut credited = 0;
    for _ in 0..10 {
        let events = tick(&mut world, &mut ticker, Duration::from_millis(250));
        credited += events
            .iter()
            .filter(|event| matches!(event, Event::MoneyAdded { .. }))
            .count();
    }

    assert_eq!(credited, 2, "2.5 seconds should produce two accruals");
    assert_eq!(query::economy(&world).money(), start + 50.0);
}

#[test]
fn large_frames_catch_up_every_interval() {
    let mut world = World::new();
    let mut ticker = IdleTicker::default();
    set_yield(&mut world, 10.0);
    let start = query::economy(&world).money();

    let _ = tick(&mut world, &mut ticker, Duration::from_secs(3));

    assert_eq!(query::economy(&world).money(), start + 30.0);
}

#[test]
fn zero_yield_accrues_nothing() {
    let mut world = World::new();
    let mut ticker = IdleTicker::default();
    let start = query::economy(&world).money();

    let events = tick(&mut world, &mut ticker, Duration::from_secs(5));

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::MoneyAdded { .. })));
    assert_eq!(query::economy(&world).money(), start);
}

#[test]
fn stopped_ticker_never_accrues() {
    let mut world = World::new();
    let mut ticker = IdleTicker::default();
    set_yield(&mut world, 10.0);
    let start = query::economy(&world).money();

    ticker.stop();
    assert!(!ticker.is_running());
    for _ in 0..5 {
        let _ = tick(&mut world, &mut ticker, Duration::from_secs(1));
    }

    assert_eq!(query::economy(&world).money(), start);
}

#[test]
fn resume_credits_offline_earnings_once() {
    let mut world = World::new();
    let mut ticker = IdleTicker::default();
    set_yield(&mut world, 2.0);
    let start = query::economy(&world).money();

    ticker.stop();
    let mut commands = Vec::new();
    let first = ticker.resume(Duration::from_secs(100), 2.0, &mut commands);
    let second = ticker.resume(Duration::from_secs(100), 2.0, &mut commands);

    assert_eq!(first, 100.0);
    assert_eq!(second, 0.0, "resuming a running ticker credits nothing");
    assert_eq!(commands.len(), 1);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(
        events,
        vec![Event::OfflineEarningsCredited { amount: 100.0 }]
    );
    assert_eq!(query::economy(&world).money(), start + 100.0);
}

#[test]
fn config_reads_from_toml_with_defaults() {
    let config: IdleConfig = toml::from_str("offline_efficiency = 0.25\ntick_interval = 500\n")
        .expect("valid idle config");

    assert_eq!(config.tick_interval, Duration::from_millis(500));
    assert_eq!(config.offline_cap, Duration::from_secs(86_400));
    assert_eq!(config.offline_efficiency, 0.25);
}
