#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dispatch system wiring loop validation, densification and yield.
//!
//! Whenever the world reports a layout, grid or multiplier change, the system
//! revalidates the track against an immutable snapshot and answers with the
//! yield and train-state commands that keep the world consistent with it.

use rail_tycoon_core::{
    CellCoord, Command, Event, FaultClass, LoopResult, PlacedGrid, TileCatalog,
};
use rail_tycoon_system_loop_validation::LoopValidator;
use rail_tycoon_system_path::{densify, DensePath};
use rail_tycoon_system_yield::{Yield, YieldCalculator, YieldConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

const DEFAULT_TILE_PIXEL_SIZE: f32 = 64.0;

/// Pixel geometry used when densifying loops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Edge length of a grid cell in pixels.
    pub tile_pixel_size: f32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tile_pixel_size: DEFAULT_TILE_PIXEL_SIZE,
        }
    }
}

/// Immutable view of the world state the dispatch system reads.
#[derive(Clone, Copy, Debug)]
pub struct TrackSnapshot<'a> {
    /// Tiles currently placed.
    pub grid: &'a PlacedGrid,
    /// Catalog used to resolve tile identifiers.
    pub catalog: &'a TileCatalog,
    /// Depot cell the loop must start and end at.
    pub depot: CellCoord,
    /// Edge length of the square grid.
    pub grid_size: u32,
    /// Upgrade multiplier applied to yield.
    pub multiplier: f64,
}

/// Validates the loop for a changed grid.
#[must_use]
pub fn on_grid_changed(
    catalog: &TileCatalog,
    grid: &PlacedGrid,
    depot: CellCoord,
    grid_size: u32,
) -> LoopResult {
    LoopValidator::new(catalog).validate(grid, depot, grid_size)
}

/// Densifies a freshly resolved loop.
#[must_use]
pub fn on_loop_resolved(result: &LoopResult, tile_pixel_size: f32) -> DensePath {
    densify(result, tile_pixel_size)
}

/// Recomputes yield for the current loop.
#[must_use]
pub fn on_yield_recompute(
    calculator: &YieldCalculator,
    result: &LoopResult,
    path: &DensePath,
    multiplier: f64,
) -> Yield {
    calculator.compute_yield(result, path, multiplier)
}

/// Keeps yield and train state in step with the placed track.
#[derive(Debug)]
pub struct Dispatch {
    calculator: YieldCalculator,
    tile_pixel_size: f32,
    last: Option<LoopResult>,
    path: DensePath,
}

impl Dispatch {
    /// Creates the system with the provided geometry and yield rates.
    #[must_use]
    pub fn new(config: DispatchConfig, yield_config: YieldConfig) -> Self {
        Self {
            calculator: YieldCalculator::new(yield_config),
            tile_pixel_size: config.tile_pixel_size,
            last: None,
            path: DensePath::empty(),
        }
    }

    /// Loop computed by the latest recomputation, if any happened.
    #[must_use]
    pub fn loop_result(&self) -> Option<&LoopResult> {
        self.last.as_ref()
    }

    /// Dense path of the latest loop. Empty while the loop is invalid.
    #[must_use]
    pub fn dense_path(&self) -> &DensePath {
        &self.path
    }

    /// Consumes world events and emits yield and train commands on changes.
    pub fn handle(
        &mut self,
        events: &[Event],
        snapshot: TrackSnapshot<'_>,
        out: &mut Vec<Command>,
    ) {
        let changed = events.iter().any(|event| {
            matches!(
                event,
                Event::TrackLayoutChanged
                    | Event::GridConfigured { .. }
                    | Event::MultiplierChanged { .. }
            )
        });
        if !changed {
            return;
        }

        let result = on_grid_changed(
            snapshot.catalog,
            snapshot.grid,
            snapshot.depot,
            snapshot.grid_size,
        );
        log_outcome(&result);

        let path = on_loop_resolved(&result, self.tile_pixel_size);
        let income = on_yield_recompute(&self.calculator, &result, &path, snapshot.multiplier);

        out.push(Command::SetYield {
            money_per_second: income.money_per_second,
        });
        out.push(Command::SetTrainRunning {
            running: result.is_valid(),
        });

        self.path = path;
        self.last = Some(result);
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::new(DispatchConfig::default(), YieldConfig::default())
    }
}

fn log_outcome(result: &LoopResult) {
    let Some(fault) = result.fault() else {
        info!(
            cells = result.ordered_path().len(),
            stations = result.station_count(),
            "loop closed"
        );
        return;
    };

    match fault.class() {
        FaultClass::StructuralInvalid => debug!(?fault, "track does not form a loop"),
        FaultClass::BoundsExceeded => error!(?fault, "loop walk exceeded its step bound"),
        FaultClass::ConfigInconsistency => warn!(?fault, "track references unknown tile data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_tycoon_core::{TileTypeId, DEPOT_CELL};

    fn depot_only() -> PlacedGrid {
        std::iter::once((DEPOT_CELL, TileTypeId::new("depot"))).collect()
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let catalog = TileCatalog::standard();
        let grid = depot_only();
        let mut dispatch = Dispatch::default();
        let mut commands = Vec::new();

        dispatch.handle(
            &[Event::TrainStateChanged { running: true }],
            TrackSnapshot {
                grid: &grid,
                catalog: &catalog,
                depot: DEPOT_CELL,
                grid_size: 4,
                multiplier: 1.0,
            },
            &mut commands,
        );

        assert!(commands.is_empty());
        assert!(dispatch.loop_result().is_none());
    }

    #[test]
    fn invalid_layout_halts_the_train() {
        let catalog = TileCatalog::standard();
        let grid = depot_only();
        let mut dispatch = Dispatch::default();
        let mut commands = Vec::new();

        dispatch.handle(
            &[Event::TrackLayoutChanged],
            TrackSnapshot {
                grid: &grid,
                catalog: &catalog,
                depot: DEPOT_CELL,
                grid_size: 4,
                multiplier: 1.0,
            },
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![
                Command::SetYield {
                    money_per_second: 0.0
                },
                Command::SetTrainRunning { running: false },
            ]
        );
        assert!(dispatch.dense_path().is_empty());
    }
}
