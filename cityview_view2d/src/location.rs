// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Integer cell address on the tile grid.
///
/// Locations produced by [`TileTransform::to_grid`](crate::TileTransform::to_grid)
/// are signed: a pixel outside the map maps to a cell outside the grid. Use
/// [`GridLocation::is_within`] before handing a location to code that indexes
/// the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridLocation {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridLocation {
    /// The origin cell, also used as the fallback for a degenerate transform.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Creates a location from column and row indices.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if `0 <= x < width` and `0 <= y < height`.
    #[must_use]
    pub fn is_within(self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && i64::from(self.x) < i64::from(width)
            && i64::from(self.y) < i64::from(height)
    }
}

impl fmt::Display for GridLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
