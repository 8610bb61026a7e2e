// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cityview View 2D: tile-map view primitives.
//!
//! This crate provides the pure-math half of a tile-map viewport:
//! - [`TileTransform`]: the affine map between grid cells (via map pixels) and
//!   view pixels, with a pinch pivot and a pixel-rounded origin.
//! - [`ViewportBounds`]: the legal range of the view origin for a grid at a
//!   given tile size.
//! - [`ZoomTier`] and [`TileSize`]: the snapping policy that turns a continuous
//!   scale factor into one of three canonical tiers and steps the tile size.
//! - [`GridLocation`]: signed cell addresses produced by hit testing.
//!
//! It owns no timers, grid, or renderer. Animation and gesture handling live
//! in `cityview_controller`, which drives these types.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use cityview_view2d::{TileSize, TileTransform, ViewportBounds, ZoomTier};
//!
//! let tile_size = TileSize::MAX;
//! let bounds = ViewportBounds::new(120, 100, tile_size);
//!
//! let mut view = TileTransform::new(Size::new(480.0, 320.0), tile_size);
//! view.set_origin(bounds.center());
//!
//! // Hit test the viewport center.
//! let loc = view.to_grid(Point::new(240.0, 160.0));
//! assert_eq!((loc.x, loc.y), (60, 50));
//!
//! // A pinch that ends at 1.9x settles on the double tier.
//! assert_eq!(ZoomTier::for_scale(1.9), ZoomTier::Double);
//! ```
//!
//! ## Coordinate spaces
//!
//! - **Grid**: integer cells, `(0, 0)` top-left.
//! - **Map pixels**: grid cells times the tile size. The origin and the
//!   bounds live here.
//! - **View pixels**: the window, `(0, 0)` top-left. The scale focus is stored
//!   relative to the window center.
//!
//! This crate is `no_std`.

#![no_std]

mod bounds;
mod location;
mod tiers;
mod transform;

pub use bounds::ViewportBounds;
pub use location::GridLocation;
pub use tiers::{MAX_SCALE, MIN_SCALE, TileSize, ZoomTier, clamp_scale};
pub use transform::{CellRange, SingularTransform, TileTransform};
