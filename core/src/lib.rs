#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rail Tycoon engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`PlacedGrid`], and respond exclusively with new command
//! batches.

mod campaign;
mod catalog;
mod economy;

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

pub use campaign::{CampaignLevel, LevelGoal, LevelReward, Obstacle, ObstacleKind};
pub use catalog::{
    standard_types, CatalogError, ConnectionSet, TileCatalog, TileType, TileTypeId,
};
pub use economy::{EconomyError, EconomyState};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Rail Tycoon.";

/// Cell permanently occupied by the depot.
pub const DEPOT_CELL: CellCoord = CellCoord::new(0, 0);

/// Cardinal sides of a tile, listed in the order the loop walk tries them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in probing order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    pub(crate) const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Right => 0b0010,
            Self::Down => 0b0100,
            Self::Left => 0b1000,
        }
    }
}

/// Location of a single grid cell expressed as column (x) and row (y).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the cell lies inside a square grid of side `grid_size`.
    #[must_use]
    pub const fn within(&self, grid_size: u32) -> bool {
        self.column < grid_size && self.row < grid_size
    }

    /// Adjacent cell in `direction`, or `None` when it falls off the grid.
    #[must_use]
    pub fn neighbor(self, direction: Direction, grid_size: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::Up => (self.column, self.row.checked_sub(1)?),
            Direction::Right => (self.column.checked_add(1)?, self.row),
            Direction::Down => (self.column, self.row.checked_add(1)?),
            Direction::Left => (self.column.checked_sub(1)?, self.row),
        };
        let cell = CellCoord::new(column, row);
        cell.within(grid_size).then_some(cell)
    }
}

/// Snapshot of the placed tiles keyed by cell.
///
/// The world owns the authoritative copy; systems only ever read it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacedGrid {
    tiles: BTreeMap<CellCoord, TileTypeId>,
}

impl PlacedGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tile type placed at `cell`, if any.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<&TileTypeId> {
        self.tiles.get(&cell)
    }

    /// Reports whether `cell` holds a tile.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.tiles.contains_key(&cell)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether no tile is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of occupied cells other than `excluded`.
    #[must_use]
    pub fn occupied_excluding(&self, excluded: CellCoord) -> usize {
        self.tiles.len() - usize::from(self.is_occupied(excluded))
    }

    /// Iterates placed tiles in column-major cell order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &TileTypeId)> {
        self.tiles.iter().map(|(cell, tile)| (*cell, tile))
    }

    /// Places `tile` at `cell`, returning the tile it replaced.
    pub fn insert(&mut self, cell: CellCoord, tile: TileTypeId) -> Option<TileTypeId> {
        self.tiles.insert(cell, tile)
    }

    /// Clears `cell`, returning the tile that was there.
    pub fn remove(&mut self, cell: CellCoord) -> Option<TileTypeId> {
        self.tiles.remove(&cell)
    }
}

impl FromIterator<(CellCoord, TileTypeId)> for PlacedGrid {
    fn from_iter<I: IntoIterator<Item = (CellCoord, TileTypeId)>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

/// Broad classification of loop faults used to pick a reaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultClass {
    /// The track simply does not form a loop yet.
    StructuralInvalid,
    /// The walk hit its step bound, which indicates malformed data.
    BoundsExceeded,
    /// The grid references data the catalog does not describe.
    ConfigInconsistency,
}

/// Reason a loop walk failed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopFault {
    /// Fewer than two tiles besides the depot are placed.
    TooFewTiles {
        /// Occupied cells other than the depot.
        placed: usize,
    },
    /// The depot cell is empty or holds a non-depot tile.
    MissingDepot {
        /// Cell expected to host the depot.
        cell: CellCoord,
    },
    /// No connected depot side leads to an occupied cell.
    NoDeparture,
    /// The walk entered an empty cell.
    DanglingEdge {
        /// Empty cell the track points into.
        cell: CellCoord,
    },
    /// A tile exit points off the grid.
    LeavesGrid {
        /// Cell whose exit leaves the grid.
        cell: CellCoord,
        /// Side pointing off the grid.
        direction: Direction,
    },
    /// The walk reached a cell it already passed through.
    SelfIntersection {
        /// Cell visited twice.
        cell: CellCoord,
    },
    /// The tile has no track on the side the walk entered from.
    Disconnected {
        /// Cell holding the mismatched tile.
        cell: CellCoord,
        /// Side the walk entered through.
        entry: Direction,
    },
    /// The tile offers zero or several exits besides the entry side.
    AmbiguousExit {
        /// Cell holding the ambiguous tile.
        cell: CellCoord,
        /// Number of candidate exits found.
        exits: usize,
    },
    /// A placed tile names a type missing from the catalog.
    UnknownTileType {
        /// Cell holding the unknown tile.
        cell: CellCoord,
        /// Identifier that failed to resolve.
        tile: TileTypeId,
    },
    /// The walk exceeded `grid_size²` steps.
    StepBoundExceeded {
        /// Steps taken before the walk was aborted.
        steps: u32,
    },
}

impl LoopFault {
    /// Maps the fault onto its [`FaultClass`].
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::StepBoundExceeded { .. } => FaultClass::BoundsExceeded,
            Self::UnknownTileType { .. } | Self::MissingDepot { .. } => {
                FaultClass::ConfigInconsistency
            }
            _ => FaultClass::StructuralInvalid,
        }
    }
}

/// Outcome of a loop walk. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopResult {
    valid: bool,
    ordered_path: Vec<CellCoord>,
    station_count: u32,
    fault: Option<LoopFault>,
}

impl LoopResult {
    /// Builds a valid result from the walked cells.
    #[must_use]
    pub fn closed(ordered_path: Vec<CellCoord>, station_count: u32) -> Self {
        Self {
            valid: true,
            ordered_path,
            station_count,
            fault: None,
        }
    }

    /// Builds an invalid result carrying the reason.
    #[must_use]
    pub fn broken(fault: LoopFault) -> Self {
        Self {
            valid: false,
            ordered_path: Vec::new(),
            station_count: 0,
            fault: Some(fault),
        }
    }

    /// Reports whether the track forms a closed loop through the depot.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Cells along the loop, starting at the depot. Empty when invalid.
    #[must_use]
    pub fn ordered_path(&self) -> &[CellCoord] {
        &self.ordered_path
    }

    /// Stations on the loop. Zero when invalid.
    #[must_use]
    pub const fn station_count(&self) -> u32 {
        self.station_count
    }

    /// Reason the walk failed, if it did.
    #[must_use]
    pub fn fault(&self) -> Option<&LoopFault> {
        self.fault.as_ref()
    }
}

/// Reasons a tile placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlacementError {
    /// The cell lies outside the configured grid.
    OutOfBounds,
    /// The cell is reserved for the depot.
    DepotCell,
    /// The cell already holds a tile.
    Occupied,
    /// The tile type is missing from the catalog.
    UnknownTile,
    /// The depot tile type cannot be placed by players.
    DepotTile,
    /// A campaign obstacle blocks the cell.
    Obstructed,
    /// The campaign tile limit has been reached.
    TileLimitReached,
    /// The balance cannot cover the tile cost.
    InsufficientFunds {
        /// Cost of the requested tile.
        required: f64,
        /// Balance at the time of the request.
        available: f64,
    },
}

/// Reasons a tile removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// The depot can never be removed.
    DepotCell,
    /// The cell holds no tile.
    Unoccupied,
}

/// Upgrades sold by the shop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Raises train speed by half a unit.
    TrainSpeed,
    /// Raises the earnings multiplier by half a unit.
    Multiplier,
}

impl UpgradeKind {
    /// Price of the next purchase given the current train level and multiplier.
    ///
    /// Train speed costs `100 * 1.5^level`; the multiplier costs
    /// `500 * 2^floor(multiplier)`.
    #[must_use]
    pub fn cost(self, train_level: u32, multiplier: f64) -> f64 {
        match self {
            Self::TrainSpeed => 100.0 * 1.5_f64.powi(saturating_i32(train_level)),
            Self::Multiplier => 500.0 * 2.0_f64.powf(multiplier.floor()),
        }
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resizes the square grid and clears every tile except the depot.
    ConfigureGrid {
        /// Side length of the grid in cells.
        size: u32,
    },
    /// Buys and places a tile.
    PlaceTile {
        /// Target cell.
        cell: CellCoord,
        /// Tile type to place.
        tile: TileTypeId,
    },
    /// Removes a tile without refund.
    RemoveTile {
        /// Cell to clear.
        cell: CellCoord,
    },
    /// Restores saved tiles without charging for them.
    RestoreLayout {
        /// Tiles to place, keyed by cell.
        tiles: Vec<(CellCoord, TileTypeId)>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Credits money earned by the running loop.
    AddMoney {
        /// Amount to credit; the multiplier has already been applied.
        amount: f64,
    },
    /// Replaces the passive income derived from the current loop.
    SetYield {
        /// New income per second.
        money_per_second: f64,
    },
    /// Starts or halts the train.
    SetTrainRunning {
        /// Whether the train should run.
        running: bool,
    },
    /// Buys an upgrade from the shop.
    PurchaseUpgrade {
        /// Upgrade to buy.
        kind: UpgradeKind,
    },
    /// Credits catch-up earnings accrued while the session was away.
    CreditOfflineEarnings {
        /// Wall-clock time the session was away, after clamping.
        away: Duration,
        /// Amount to credit.
        amount: f64,
    },
    /// Loads a campaign level: grid size, balance, obstacles and tile limit.
    StartLevel {
        /// Level to load.
        level: CampaignLevel,
    },
    /// Applies the reward of a completed level.
    GrantReward {
        /// Completed level number.
        level: u32,
        /// Reward to apply.
        reward: LevelReward,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The grid was resized and cleared.
    GridConfigured {
        /// New side length.
        size: u32,
    },
    /// A tile was bought and placed.
    TilePlaced {
        /// Cell that received the tile.
        cell: CellCoord,
        /// Placed tile type.
        tile: TileTypeId,
        /// Amount charged.
        cost: f64,
    },
    /// A placement request was rejected.
    TilePlacementRejected {
        /// Requested cell.
        cell: CellCoord,
        /// Requested tile type.
        tile: TileTypeId,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// A tile was removed.
    TileRemoved {
        /// Cleared cell.
        cell: CellCoord,
        /// Tile type that was removed.
        tile: TileTypeId,
    },
    /// A removal request was rejected.
    TileRemovalRejected {
        /// Requested cell.
        cell: CellCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// The set of placed tiles changed; any previous loop result is stale.
    TrackLayoutChanged,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Money was credited.
    MoneyAdded {
        /// Credited amount.
        amount: f64,
        /// Balance after the credit.
        balance: f64,
    },
    /// Passive income changed.
    YieldChanged {
        /// New income per second.
        money_per_second: f64,
    },
    /// The train started or stopped.
    TrainStateChanged {
        /// Whether the train now runs.
        running: bool,
    },
    /// An upgrade was bought.
    UpgradePurchased {
        /// Purchased upgrade.
        kind: UpgradeKind,
        /// Amount charged.
        cost: f64,
    },
    /// An upgrade purchase was rejected.
    UpgradeRejected {
        /// Requested upgrade.
        kind: UpgradeKind,
        /// Reason the purchase failed.
        reason: EconomyError,
    },
    /// The earnings multiplier changed; yield must be recomputed.
    MultiplierChanged {
        /// New multiplier.
        multiplier: f64,
    },
    /// Offline catch-up earnings were credited.
    OfflineEarningsCredited {
        /// Credited amount.
        amount: f64,
    },
    /// A campaign level was loaded.
    LevelStarted {
        /// Loaded level number.
        level: u32,
    },
    /// A level reward was applied.
    RewardGranted {
        /// Completed level number.
        level: u32,
        /// Applied reward.
        reward: LevelReward,
    },
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, FaultClass, LoopFault, LoopResult, TileTypeId, UpgradeKind};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn neighbor_respects_grid_edges() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.neighbor(Direction::Up, 3), None);
        assert_eq!(corner.neighbor(Direction::Left, 3), None);
        assert_eq!(
            corner.neighbor(Direction::Right, 3),
            Some(CellCoord::new(1, 0))
        );

        let far = CellCoord::new(2, 2);
        assert_eq!(far.neighbor(Direction::Down, 3), None);
        assert_eq!(far.neighbor(Direction::Right, 3), None);
        assert_eq!(far.neighbor(Direction::Up, 3), Some(CellCoord::new(2, 1)));
    }

    #[test]
    fn opposite_is_an_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn fault_classes_distinguish_configuration_problems() {
        let unknown = LoopFault::UnknownTileType {
            cell: CellCoord::new(1, 0),
            tile: TileTypeId::new("bridge"),
        };
        assert_eq!(unknown.class(), FaultClass::ConfigInconsistency);
        assert_eq!(
            LoopFault::StepBoundExceeded { steps: 10 }.class(),
            FaultClass::BoundsExceeded
        );
        assert_eq!(
            LoopFault::DanglingEdge {
                cell: CellCoord::new(0, 1)
            }
            .class(),
            FaultClass::StructuralInvalid
        );
    }

    #[test]
    fn broken_result_has_no_path_or_stations() {
        let result = LoopResult::broken(LoopFault::NoDeparture);
        assert!(!result.is_valid());
        assert!(result.ordered_path().is_empty());
        assert_eq!(result.station_count(), 0);
    }

    #[test]
    fn loop_result_round_trips_through_bincode() {
        let result = LoopResult::closed(vec![CellCoord::new(0, 0), CellCoord::new(1, 0)], 1);
        assert_round_trip(&result);
        assert_round_trip(&LoopResult::broken(LoopFault::AmbiguousExit {
            cell: CellCoord::new(2, 3),
            exits: 2,
        }));
    }

    #[test]
    fn upgrade_costs_follow_price_curves() {
        assert!((UpgradeKind::TrainSpeed.cost(1, 1.0) - 150.0).abs() < f64::EPSILON);
        assert!((UpgradeKind::TrainSpeed.cost(2, 1.0) - 225.0).abs() < f64::EPSILON);
        assert!((UpgradeKind::Multiplier.cost(1, 1.0) - 1_000.0).abs() < f64::EPSILON);
        assert!((UpgradeKind::Multiplier.cost(1, 2.5) - 2_000.0).abs() < f64::EPSILON);
    }
}
