//! Placement and removal rules enforced by the world.

use std::collections::BTreeSet;

use rail_tycoon_core::{CellCoord, PlacementError, RemovalError, TileTypeId};

use crate::World;

/// Campaign constraints layered on top of the plain placement rules.
#[derive(Clone, Debug, Default)]
pub(crate) struct LevelConstraints {
    pub(crate) obstacles: BTreeSet<CellCoord>,
    pub(crate) max_tiles: Option<usize>,
}

impl LevelConstraints {
    pub(crate) fn clear(&mut self) {
        self.obstacles.clear();
        self.max_tiles = None;
    }
}

/// Checks the structural rules shared by purchases and layout restores.
///
/// Returns the catalog cost of the tile when the cell can receive it.
pub(crate) fn check_structure(
    world: &World,
    cell: CellCoord,
    tile: &TileTypeId,
) -> Result<f64, PlacementError> {
    if !cell.within(world.grid_size) {
        return Err(PlacementError::OutOfBounds);
    }
    if cell == world.depot {
        return Err(PlacementError::DepotCell);
    }
    if world.constraints.obstacles.contains(&cell) {
        return Err(PlacementError::Obstructed);
    }
    if world.grid.is_occupied(cell) {
        return Err(PlacementError::Occupied);
    }
    let Some(tile_type) = world.catalog.get(tile) else {
        return Err(PlacementError::UnknownTile);
    };
    if tile_type.is_depot() {
        return Err(PlacementError::DepotTile);
    }
    Ok(tile_type.cost())
}

/// Checks the rules a purchased placement must satisfy before it is paid for.
///
/// Affordability is settled by the economy when the cost is debited.
pub(crate) fn check_purchase(
    world: &World,
    cell: CellCoord,
    tile: &TileTypeId,
) -> Result<f64, PlacementError> {
    let cost = check_structure(world, cell, tile)?;

    if let Some(limit) = world.constraints.max_tiles {
        if world.grid.occupied_excluding(world.depot) >= limit {
            return Err(PlacementError::TileLimitReached);
        }
    }

    Ok(cost)
}

/// Checks that `cell` holds a removable tile.
pub(crate) fn check_removal(world: &World, cell: CellCoord) -> Result<(), RemovalError> {
    if cell == world.depot {
        return Err(RemovalError::DepotCell);
    }
    if !world.grid.is_occupied(cell) {
        return Err(RemovalError::Unoccupied);
    }
    Ok(())
}
