//! Static registry of track tile types.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Direction;

/// Identifier naming a tile type inside a [`TileCatalog`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileTypeId(String);

impl TileTypeId {
    /// Creates a new identifier from the provided name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TileTypeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TileTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of tile sides that carry track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Direction>", into = "Vec<Direction>")]
pub struct ConnectionSet(u8);

impl ConnectionSet {
    /// Connection set with no sides.
    pub const EMPTY: Self = Self(0);

    /// Connection set covering all four sides.
    pub const ALL: Self = Self(0b1111);

    /// Builds a connection set from the provided sides.
    #[must_use]
    pub fn from_directions(directions: &[Direction]) -> Self {
        directions
            .iter()
            .fold(Self::EMPTY, |set, &direction| set.with(direction))
    }

    /// Returns a copy of the set that also contains `direction`.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Returns a copy of the set without `direction`.
    #[must_use]
    pub const fn without(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }

    /// Reports whether the set carries track on the provided side.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Number of connected sides.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Reports whether no side is connected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the connected sides in canonical direction order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl From<Vec<Direction>> for ConnectionSet {
    fn from(value: Vec<Direction>) -> Self {
        Self::from_directions(&value)
    }
}

impl From<ConnectionSet> for Vec<Direction> {
    fn from(value: ConnectionSet) -> Self {
        value.iter().collect()
    }
}

/// Immutable description of a placeable tile type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileType {
    id: TileTypeId,
    name: String,
    connections: ConnectionSet,
    cost: f64,
    #[serde(default)]
    station: bool,
    #[serde(default)]
    depot: bool,
}

impl TileType {
    /// Creates a plain track tile.
    #[must_use]
    pub fn track(
        id: impl Into<String>,
        name: impl Into<String>,
        connections: &[Direction],
        cost: f64,
    ) -> Self {
        Self {
            id: TileTypeId::new(id),
            name: name.into(),
            connections: ConnectionSet::from_directions(connections),
            cost,
            station: false,
            depot: false,
        }
    }

    /// Marks the tile type as a station.
    #[must_use]
    pub fn into_station(mut self) -> Self {
        self.station = true;
        self
    }

    /// Marks the tile type as the depot.
    #[must_use]
    pub fn into_depot(mut self) -> Self {
        self.depot = true;
        self
    }

    /// Identifier of the tile type.
    #[must_use]
    pub fn id(&self) -> &TileTypeId {
        &self.id
    }

    /// Human readable name shown by adapters.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sides that carry track.
    #[must_use]
    pub const fn connections(&self) -> ConnectionSet {
        self.connections
    }

    /// Placement cost charged by the world.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Reports whether the tile counts as a station.
    #[must_use]
    pub const fn is_station(&self) -> bool {
        self.station
    }

    /// Reports whether the tile is the depot.
    #[must_use]
    pub const fn is_depot(&self) -> bool {
        self.depot
    }
}

/// Reasons a set of tile definitions cannot form a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two definitions share an identifier.
    #[error("tile type `{0}` is defined more than once")]
    DuplicateId(TileTypeId),
    /// No definition is flagged as the depot.
    #[error("catalog does not define a depot tile")]
    MissingDepot,
    /// More than one definition is flagged as the depot.
    #[error("catalog defines a second depot tile `{0}`")]
    DuplicateDepot(TileTypeId),
    /// The depot does not connect on all four sides.
    #[error("depot tile `{id}` connects {connections} sides, expected 4")]
    DepotArity {
        /// Offending tile type.
        id: TileTypeId,
        /// Number of connected sides found.
        connections: usize,
    },
    /// A track tile does not connect exactly two sides.
    #[error("track tile `{id}` connects {connections} sides, expected 2")]
    TrackArity {
        /// Offending tile type.
        id: TileTypeId,
        /// Number of connected sides found.
        connections: usize,
    },
    /// The depot is also flagged as a station.
    #[error("depot tile `{0}` cannot also be a station")]
    StationDepot(TileTypeId),
    /// A definition carries a negative or non-finite cost.
    #[error("tile type `{0}` has an invalid cost")]
    InvalidCost(TileTypeId),
}

/// Registry mapping tile identifiers to their definitions.
///
/// Construction enforces the arity invariant once so the loop walk can rely
/// on every non-depot tile exposing exactly two sides.
#[derive(Clone, Debug, PartialEq)]
pub struct TileCatalog {
    entries: BTreeMap<TileTypeId, TileType>,
    order: Vec<TileTypeId>,
    depot: TileTypeId,
}

impl TileCatalog {
    /// Validates the provided definitions and builds a catalog.
    pub fn new(types: Vec<TileType>) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        let mut order = Vec::with_capacity(types.len());
        let mut depot: Option<TileTypeId> = None;

        for tile in types {
            if !tile.cost.is_finite() || tile.cost < 0.0 {
                return Err(CatalogError::InvalidCost(tile.id));
            }

            let connections = tile.connections.len();
            if tile.depot {
                if let Some(existing) = &depot {
                    if *existing != tile.id {
                        return Err(CatalogError::DuplicateDepot(tile.id));
                    }
                }
                if connections != 4 {
                    return Err(CatalogError::DepotArity {
                        id: tile.id,
                        connections,
                    });
                }
                if tile.station {
                    return Err(CatalogError::StationDepot(tile.id));
                }
                depot = Some(tile.id.clone());
            } else if connections != 2 {
                return Err(CatalogError::TrackArity {
                    id: tile.id,
                    connections,
                });
            }

            if entries.contains_key(&tile.id) {
                return Err(CatalogError::DuplicateId(tile.id));
            }
            order.push(tile.id.clone());
            let _ = entries.insert(tile.id.clone(), tile);
        }

        let depot = depot.ok_or(CatalogError::MissingDepot)?;
        Ok(Self {
            entries,
            order,
            depot,
        })
    }

    /// Catalog containing the stock railway pieces.
    #[must_use]
    pub fn standard() -> Self {
        let types = standard_types();
        let order = types.iter().map(|tile| tile.id.clone()).collect();
        let entries = types
            .into_iter()
            .map(|tile| (tile.id.clone(), tile))
            .collect();
        Self {
            entries,
            order,
            depot: TileTypeId::new(DEPOT_ID),
        }
    }

    /// Looks up a tile type by identifier.
    #[must_use]
    pub fn get(&self, id: &TileTypeId) -> Option<&TileType> {
        self.entries.get(id)
    }

    /// Reports whether the catalog defines the identifier.
    #[must_use]
    pub fn contains(&self, id: &TileTypeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Identifier of the depot tile type.
    #[must_use]
    pub fn depot_id(&self) -> &TileTypeId {
        &self.depot
    }

    /// Iterates the tile types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &TileType> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Number of tile types in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog is empty. A valid catalog never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const DEPOT_ID: &str = "depot";

/// Definitions backing [`TileCatalog::standard`].
#[must_use]
pub fn standard_types() -> Vec<TileType> {
    use Direction::{Down, Left, Right, Up};

    vec![
        TileType::track("straight_h", "Horizontal track", &[Left, Right], 50.0),
        TileType::track("straight_v", "Vertical track", &[Up, Down], 50.0),
        TileType::track("curve_tr", "Curve up-right", &[Up, Right], 75.0),
        TileType::track("curve_tl", "Curve up-left", &[Up, Left], 75.0),
        TileType::track("curve_br", "Curve down-right", &[Down, Right], 75.0),
        TileType::track("curve_bl", "Curve down-left", &[Down, Left], 75.0),
        TileType::track("station", "Station", &[Left, Right], 200.0).into_station(),
        TileType::track(DEPOT_ID, "Depot", &[Up, Right, Down, Left], 0.0).into_depot(),
    ]
}
