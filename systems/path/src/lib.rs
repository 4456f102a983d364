#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Converts validated loops into closed pixel-space polylines.

use glam::Vec2;
use rail_tycoon_core::{CellCoord, LoopResult};

/// Closed polyline through the cell centres of a loop.
///
/// The first point is repeated as the last one so consumers can animate
/// along the loop without special-casing the wrap-around segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DensePath {
    points: Vec<Vec2>,
}

impl DensePath {
    /// Path with no points, used for invalid loops.
    #[must_use]
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Points in traversal order.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of points, closing point included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the path holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consumes the path, yielding the underlying points.
    #[must_use]
    pub fn into_vec(self) -> Vec<Vec2> {
        self.points
    }
}

impl From<Vec<Vec2>> for DensePath {
    fn from(points: Vec<Vec2>) -> Self {
        Self { points }
    }
}

/// Pixel position of the centre of `cell`.
#[must_use]
pub fn cell_center(cell: CellCoord, tile_pixel_size: f32) -> Vec2 {
    let half = tile_pixel_size / 2.0;
    Vec2::new(
        cell.column() as f32 * tile_pixel_size + half,
        cell.row() as f32 * tile_pixel_size + half,
    )
}

/// Maps every loop cell to its centre and closes the polyline.
///
/// Invalid results and paths shorter than two cells produce an empty path.
#[must_use]
pub fn densify(result: &LoopResult, tile_pixel_size: f32) -> DensePath {
    let cells = result.ordered_path();
    if !result.is_valid() || cells.len() < 2 {
        return DensePath::empty();
    }

    let mut points: Vec<Vec2> = cells
        .iter()
        .map(|cell| cell_center(*cell, tile_pixel_size))
        .collect();
    points.push(points[0]);
    DensePath { points }
}

/// Sum of the Euclidean lengths of consecutive segments.
#[must_use]
pub fn path_length(path: &DensePath) -> f32 {
    path.points
        .windows(2)
        .map(|segment| segment[0].distance(segment[1]))
        .sum()
}
