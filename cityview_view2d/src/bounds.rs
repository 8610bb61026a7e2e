// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

use crate::tiers::TileSize;

/// Legal range of the view origin for a grid drawn at a given tile size.
///
/// The origin is the map-pixel point that sits under the viewport center, so
/// the legal range is the whole map: `[0, tile_size * width] x [0, tile_size *
/// height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportBounds {
    rect: Rect,
}

impl ViewportBounds {
    /// Computes the bounds for a `width` x `height` grid at `tile_size`.
    #[must_use]
    pub fn new(grid_width: u32, grid_height: u32, tile_size: TileSize) -> Self {
        let ts = f64::from(tile_size.get());
        Self {
            rect: Rect::new(
                0.0,
                0.0,
                ts * f64::from(grid_width),
                ts * f64::from(grid_height),
            ),
        }
    }

    /// Returns the bounds as a map-pixel rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Right edge (`tile_size * grid_width`).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.rect.x1
    }

    /// Bottom edge (`tile_size * grid_height`).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.rect.y1
    }

    /// Center of the map in map pixels.
    #[must_use]
    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Clamps `origin` component-wise into the bounds.
    #[must_use]
    pub fn clamp(&self, origin: Point) -> Point {
        Point::new(
            origin.x.clamp(self.rect.x0, self.rect.x1),
            origin.y.clamp(self.rect.y0, self.rect.y1),
        )
    }

    /// Returns `true` if `origin` lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, origin: Point) -> bool {
        origin.x >= self.rect.x0
            && origin.x <= self.rect.x1
            && origin.y >= self.rect.y0
            && origin.y <= self.rect.y1
    }
}
