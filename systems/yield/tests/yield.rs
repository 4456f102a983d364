use rail_tycoon_core::{
    standard_types, CellCoord, Direction, LoopResult, PlacedGrid, TileCatalog, TileType,
    TileTypeId, DEPOT_CELL,
};
use rail_tycoon_system_loop_validation::validate;
use rail_tycoon_system_path::{densify, DensePath};
use rail_tycoon_system_yield::{YieldCalculator, YieldConfig, YieldMode};

const TILE: f32 = 64.0;

fn grid_of(tiles: &[(u32, u32, &str)]) -> PlacedGrid {
    tiles
        .iter()
        .map(|&(column, row, tile)| (CellCoord::new(column, row), TileTypeId::new(tile)))
        .collect()
}

fn corner_loop() -> (LoopResult, DensePath) {
    let mut types = standard_types();
    types.push(
        TileType::track(
            "station_tl",
            "Corner station",
            &[Direction::Up, Direction::Left],
            200.0,
        )
        .into_station(),
    );
    let catalog = TileCatalog::new(types).expect("valid catalog");
    let grid = grid_of(&[
        (0, 0, "depot"),
        (1, 0, "curve_bl"),
        (1, 1, "station_tl"),
        (0, 1, "curve_tr"),
    ]);
    let result = validate(&catalog, &grid, DEPOT_CELL, 3);
    let path = densify(&result, TILE);
    (result, path)
}

fn square_ring_loop() -> (LoopResult, DensePath) {
    let catalog = TileCatalog::standard();
    let grid = grid_of(&[
        (0, 0, "depot"),
        (1, 0, "station"),
        (2, 0, "curve_bl"),
        (2, 1, "straight_v"),
        (2, 2, "curve_tl"),
        (1, 2, "station"),
        (0, 2, "curve_tr"),
        (0, 1, "straight_v"),
    ]);
    let result = validate(&catalog, &grid, DEPOT_CELL, 4);
    let path = densify(&result, TILE);
    (result, path)
}

#[test]
fn single_station_loop_pays_base_rate_times_multiplier() {
    let (result, path) = corner_loop();
    assert!(result.is_valid(), "{:?}", result.fault());
    assert_eq!(result.station_count(), 1);

    let calculator = YieldCalculator::default();
    for multiplier in [1.0, 1.5, 4.0] {
        let income = calculator.compute_yield(&result, &path, multiplier);
        assert_eq!(
            income.money_per_second,
            100.0 * multiplier,
            "station-based yield should be 1 * 100 * multiplier",
        );
    }
}

#[test]
fn distance_mode_adds_floored_length() {
    let (result, path) = square_ring_loop();
    assert!(result.is_valid(), "{:?}", result.fault());

    let calculator = YieldCalculator::new(YieldConfig {
        mode: YieldMode::DistanceAugmented,
        ..YieldConfig::default()
    });
    let income = calculator.compute_yield(&result, &path, 1.0);

    // Two stations plus eight 64px segments.
    assert_eq!(income.money_per_second, 2.0 * 100.0 + 512.0 * 10.0);
}

#[test]
fn yield_scales_linearly_with_multiplier() {
    let (result, path) = square_ring_loop();

    for mode in [YieldMode::StationBased, YieldMode::DistanceAugmented] {
        let calculator = YieldCalculator::new(YieldConfig {
            mode,
            ..YieldConfig::default()
        });
        for multiplier in [0.5, 1.0, 1.5, 3.25] {
            let single = calculator.compute_yield(&result, &path, multiplier);
            let double = calculator.compute_yield(&result, &path, 2.0 * multiplier);
            assert_eq!(
                double.money_per_second,
                2.0 * single.money_per_second,
                "doubling the multiplier must double the yield in {mode:?}",
            );
        }
    }
}
