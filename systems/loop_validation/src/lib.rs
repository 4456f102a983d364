#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure loop validation system that walks the track from the depot.
//!
//! The walk leaves the depot through the first connected side, in
//! [`Direction::ALL`] order, whose neighbour holds a tile. Every following tile
//! must offer exactly one exit besides the side the walk entered through. The
//! track is a loop when the walk re-enters the depot after at least three
//! steps without visiting any cell twice. Nothing is cached between calls.

use std::collections::HashSet;

use rail_tycoon_core::{
    CellCoord, Direction, LoopFault, LoopResult, PlacedGrid, TileCatalog, TileType,
};

/// Minimum number of non-depot tiles able to close a loop.
const MIN_LOOP_TILES: usize = 2;

/// Steps the walk must take before returning to the depot counts as closing.
const MIN_LOOP_STEPS: u32 = 3;

/// Walks placed track and reports whether it closes through the depot.
#[derive(Clone, Copy, Debug)]
pub struct LoopValidator<'catalog> {
    catalog: &'catalog TileCatalog,
}

impl<'catalog> LoopValidator<'catalog> {
    /// Creates a validator resolving tile types through `catalog`.
    #[must_use]
    pub const fn new(catalog: &'catalog TileCatalog) -> Self {
        Self { catalog }
    }

    /// Validates the loop starting at `depot` on a square grid of `grid_size`.
    ///
    /// Failures never panic; they produce an invalid [`LoopResult`] whose
    /// [`LoopFault`] explains what stopped the walk.
    #[must_use]
    pub fn validate(&self, grid: &PlacedGrid, depot: CellCoord, grid_size: u32) -> LoopResult {
        match self.walk(grid, depot, grid_size) {
            Ok(result) => result,
            Err(fault) => LoopResult::broken(fault),
        }
    }

    fn walk(
        &self,
        grid: &PlacedGrid,
        depot: CellCoord,
        grid_size: u32,
    ) -> Result<LoopResult, LoopFault> {
        let placed = grid.occupied_excluding(depot);
        if placed < MIN_LOOP_TILES {
            return Err(LoopFault::TooFewTiles { placed });
        }

        let depot_tile = grid
            .tile_at(depot)
            .and_then(|id| self.catalog.get(id))
            .filter(|tile| tile.is_depot())
            .ok_or(LoopFault::MissingDepot { cell: depot })?;
        let departure = departure_direction(depot_tile, grid, depot, grid_size)
            .ok_or(LoopFault::NoDeparture)?;

        let step_bound = grid_size.saturating_mul(grid_size);
        let mut visited = HashSet::with_capacity(placed + 1);
        let mut path = Vec::with_capacity(placed + 1);
        let mut stations = 0_u32;

        let mut current = depot;
        let mut arrived: Option<Direction> = None;
        let mut steps = 0_u32;

        loop {
            if current == depot && steps >= MIN_LOOP_STEPS {
                return Ok(LoopResult::closed(path, stations));
            }

            if !visited.insert(current) {
                return Err(LoopFault::SelfIntersection { cell: current });
            }
            path.push(current);

            let Some(id) = grid.tile_at(current) else {
                return Err(LoopFault::DanglingEdge { cell: current });
            };
            let Some(tile) = self.catalog.get(id) else {
                return Err(LoopFault::UnknownTileType {
                    cell: current,
                    tile: id.clone(),
                });
            };
            if tile.is_station() {
                stations += 1;
            }

            let exit = match arrived {
                None => departure,
                Some(heading) => exit_direction(current, tile, heading)?,
            };

            current = current
                .neighbor(exit, grid_size)
                .ok_or(LoopFault::LeavesGrid {
                    cell: current,
                    direction: exit,
                })?;
            arrived = Some(exit);
            steps += 1;

            if steps > step_bound {
                return Err(LoopFault::StepBoundExceeded { steps });
            }
        }
    }
}

/// Validates the loop with a one-off [`LoopValidator`].
#[must_use]
pub fn validate(
    catalog: &TileCatalog,
    grid: &PlacedGrid,
    depot: CellCoord,
    grid_size: u32,
) -> LoopResult {
    LoopValidator::new(catalog).validate(grid, depot, grid_size)
}

fn departure_direction(
    depot_tile: &TileType,
    grid: &PlacedGrid,
    depot: CellCoord,
    grid_size: u32,
) -> Option<Direction> {
    depot_tile.connections().iter().find(|direction| {
        depot
            .neighbor(*direction, grid_size)
            .is_some_and(|neighbor| grid.is_occupied(neighbor))
    })
}

fn exit_direction(
    cell: CellCoord,
    tile: &TileType,
    heading: Direction,
) -> Result<Direction, LoopFault> {
    let entry = heading.opposite();
    let connections = tile.connections();
    if !connections.contains(entry) {
        return Err(LoopFault::Disconnected { cell, entry });
    }

    let exits = connections.without(entry);
    let mut candidates = exits.iter();
    match (candidates.next(), candidates.next()) {
        (Some(exit), None) => Ok(exit),
        _ => Err(LoopFault::AmbiguousExit {
            cell,
            exits: exits.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_tycoon_core::TileTypeId;

    #[test]
    fn curve_exit_is_the_side_opposite_the_entry() {
        let catalog = TileCatalog::standard();
        let curve = catalog
            .get(&TileTypeId::new("curve_bl"))
            .expect("stock curve");
        let cell = CellCoord::new(1, 0);
        assert_eq!(
            exit_direction(cell, curve, Direction::Right),
            Ok(Direction::Down)
        );
        assert_eq!(
            exit_direction(cell, curve, Direction::Up),
            Ok(Direction::Left)
        );
    }

    #[test]
    fn entering_a_tile_from_an_unconnected_side_is_reported() {
        let catalog = TileCatalog::standard();
        let vertical = catalog
            .get(&TileTypeId::new("straight_v"))
            .expect("stock straight");
        let cell = CellCoord::new(1, 0);
        assert_eq!(
            exit_direction(cell, vertical, Direction::Right),
            Err(LoopFault::Disconnected {
                cell,
                entry: Direction::Left,
            })
        );
    }

    #[test]
    fn four_way_tiles_are_ambiguous_mid_walk() {
        let catalog = TileCatalog::standard();
        let depot = catalog.get(catalog.depot_id()).expect("stock depot");
        let cell = CellCoord::new(2, 0);
        assert_eq!(
            exit_direction(cell, depot, Direction::Right),
            Err(LoopFault::AmbiguousExit { cell, exits: 3 })
        );
    }

    #[test]
    fn departure_prefers_up_then_right() {
        let catalog = TileCatalog::standard();
        let depot_tile = catalog.get(catalog.depot_id()).expect("stock depot");
        let depot = CellCoord::new(1, 1);
        let grid: PlacedGrid = [
            (CellCoord::new(1, 0), TileTypeId::new("straight_v")),
            (CellCoord::new(2, 1), TileTypeId::new("straight_h")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            departure_direction(depot_tile, &grid, depot, 3),
            Some(Direction::Up)
        );
        assert_eq!(
            departure_direction(depot_tile, &PlacedGrid::new(), depot, 3),
            None
        );
    }
}
