use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rail_tycoon_core::{CellCoord, Command, PlacedGrid, TileTypeId, DEPOT_CELL};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "track";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "track:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the track placed on the grid, depot excluded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrackLayoutSnapshot {
    /// Edge length of the square grid.
    pub(crate) size: u32,
    /// Tiles composing the layout captured by the snapshot.
    pub(crate) tiles: Vec<TrackLayoutTile>,
}

impl TrackLayoutSnapshot {
    /// Captures every placed tile except the depot.
    #[must_use]
    pub(crate) fn capture(grid: &PlacedGrid, depot: CellCoord, size: u32) -> Self {
        let tiles = grid
            .iter()
            .filter(|(cell, _)| *cell != depot)
            .map(|(cell, tile)| TrackLayoutTile {
                cell,
                tile: tile.clone(),
            })
            .collect();
        Self { size, tiles }
    }

    /// Rectangular ring along the grid border through the depot.
    ///
    /// Up to `stations` horizontal straights are swapped for stations, top
    /// row first. Sizes below two are raised to two.
    #[must_use]
    pub(crate) fn perimeter_ring(size: u32, stations: u32) -> Self {
        let size = size.max(2);
        let last = size - 1;
        let mut remaining = stations;
        let mut horizontal = |tiles: &mut Vec<TrackLayoutTile>, cell: CellCoord| {
            let id = if remaining > 0 {
                remaining -= 1;
                "station"
            } else {
                "straight_h"
            };
            tiles.push(TrackLayoutTile::new(cell, id));
        };

        let mut tiles = Vec::new();
        for column in 1..last {
            horizontal(&mut tiles, CellCoord::new(column, 0));
        }
        tiles.push(TrackLayoutTile::new(CellCoord::new(last, 0), "curve_bl"));
        for row in 1..last {
            tiles.push(TrackLayoutTile::new(CellCoord::new(last, row), "straight_v"));
        }
        tiles.push(TrackLayoutTile::new(CellCoord::new(last, last), "curve_tl"));
        for column in (1..last).rev() {
            horizontal(&mut tiles, CellCoord::new(column, last));
        }
        tiles.push(TrackLayoutTile::new(CellCoord::new(0, last), "curve_tr"));
        for row in (1..last).rev() {
            tiles.push(TrackLayoutTile::new(CellCoord::new(0, row), "straight_v"));
        }

        tiles.retain(|tile| tile.cell != DEPOT_CELL);
        Self { size, tiles }
    }

    /// Commands that recreate the layout on a fresh grid without charging.
    #[must_use]
    pub(crate) fn restore_commands(&self) -> Vec<Command> {
        vec![
            Command::ConfigureGrid { size: self.size },
            Command::RestoreLayout {
                tiles: self
                    .tiles
                    .iter()
                    .map(|tile| (tile.cell, tile.tile.clone()))
                    .collect(),
            },
        ]
    }

    /// Commands that buy the layout tile by tile on the current grid.
    #[must_use]
    pub(crate) fn purchase_commands(&self) -> Vec<Command> {
        self.tiles
            .iter()
            .map(|tile| Command::PlaceTile {
                cell: tile.cell,
                tile: tile.tile.clone(),
            })
            .collect()
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            tiles: self.tiles.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{SNAPSHOT_HEADER}:{0}x{0}:{encoded}", self.size))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            size,
            tiles: decoded.tiles,
        })
    }
}

/// Tile captured within a layout snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrackLayoutTile {
    /// Cell holding the tile.
    pub(crate) cell: CellCoord,
    /// Type of the placed tile.
    pub(crate) tile: TileTypeId,
}

impl TrackLayoutTile {
    fn new(cell: CellCoord, tile: &str) -> Self {
        Self {
            cell,
            tile: TileTypeId::new(tile),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    tiles: Vec<TrackLayoutTile>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions were malformed or not square.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingDimensions => write!(f, "layout string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse square grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not process layout payload: {error}")
            }
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<u32, LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || columns != rows {
        return Err(invalid());
    }

    Ok(columns)
}
