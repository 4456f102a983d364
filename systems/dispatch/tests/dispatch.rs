use rail_tycoon_core::{CellCoord, Command, Event, TileTypeId, UpgradeKind};
use rail_tycoon_system_dispatch::{Dispatch, TrackSnapshot};
use rail_tycoon_world::{self as world, query, World, WorldConfig};

/// Applies `commands` and lets dispatch react until the world settles.
fn run(world: &mut World, dispatch: &mut Dispatch, commands: Vec<Command>) -> Vec<Event> {
    let mut pending = commands;
    let mut all_events = Vec::new();

    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }

        let economy = query::economy(world);
        let snapshot = TrackSnapshot {
            grid: query::placed_grid(world),
            catalog: query::catalog(world),
            depot: query::depot(world),
            grid_size: query::grid_size(world),
            multiplier: economy.multiplier(),
        };
        dispatch.handle(&events, snapshot, &mut pending);
        all_events.extend(events);
    }

    all_events
}

fn place(column: u32, row: u32, tile: &str) -> Command {
    Command::PlaceTile {
        cell: CellCoord::new(column, row),
        tile: TileTypeId::new(tile),
    }
}

fn ring_commands() -> Vec<Command> {
    vec![
        place(1, 0, "station"),
        place(2, 0, "curve_bl"),
        place(2, 1, "straight_v"),
        place(2, 2, "curve_tl"),
        place(1, 2, "station"),
        place(0, 2, "curve_tr"),
        place(0, 1, "straight_v"),
    ]
}

fn rich_world() -> World {
    World::with_config(WorldConfig {
        grid_size: 4,
        starting_money: 10_000.0,
        ..WorldConfig::default()
    })
}

#[test]
fn closing_the_ring_starts_the_train_and_sets_yield() {
    let mut world = rich_world();
    let mut dispatch = Dispatch::default();

    let events = run(&mut world, &mut dispatch, ring_commands());

    assert!(events.contains(&Event::TrainStateChanged { running: true }));
    assert!(query::train(&world).running());
    assert_eq!(query::economy(&world).money_per_second(), 200.0);

    let result = dispatch.loop_result().expect("loop recomputed");
    assert!(result.is_valid());
    assert_eq!(result.station_count(), 2);
    assert_eq!(dispatch.dense_path().len(), result.ordered_path().len() + 1);
}

#[test]
fn breaking_the_ring_stops_the_train_and_zeroes_yield() {
    let mut world = rich_world();
    let mut dispatch = Dispatch::default();
    let _ = run(&mut world, &mut dispatch, ring_commands());

    let events = run(
        &mut world,
        &mut dispatch,
        vec![Command::RemoveTile {
            cell: CellCoord::new(2, 1),
        }],
    );

    assert!(events.contains(&Event::TrainStateChanged { running: false }));
    assert!(events.contains(&Event::YieldChanged {
        money_per_second: 0.0
    }));
    assert!(!query::train(&world).running());
    assert!(dispatch.dense_path().is_empty());
}

#[test]
fn multiplier_upgrade_recomputes_yield() {
    let mut world = rich_world();
    let mut dispatch = Dispatch::default();
    let _ = run(&mut world, &mut dispatch, ring_commands());

    let _ = run(
        &mut world,
        &mut dispatch,
        vec![Command::PurchaseUpgrade {
            kind: UpgradeKind::Multiplier,
        }],
    );

    assert_eq!(query::economy(&world).multiplier(), 1.5);
    assert_eq!(query::economy(&world).money_per_second(), 300.0);
}

#[test]
fn rejected_placements_do_not_trigger_recomputation() {
    let mut world = rich_world();
    let mut dispatch = Dispatch::default();

    let events = run(&mut world, &mut dispatch, vec![place(9, 9, "station")]);

    assert!(matches!(
        events.as_slice(),
        [Event::TilePlacementRejected { .. }]
    ));
    assert!(dispatch.loop_result().is_none());
}
