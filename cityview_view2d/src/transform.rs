// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::location::GridLocation;
use crate::tiers::TileSize;

/// Error returned when the map → view transform cannot be inverted.
///
/// This only happens when the scale factor is (effectively) zero, which the
/// controller never produces on its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SingularTransform {
    /// Scale factor that made the transform singular.
    pub scale: f64,
}

impl fmt::Display for SingularTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view transform is singular at scale factor {}", self.scale)
    }
}

impl core::error::Error for SingularTransform {}

/// Affine mapping between map pixels and view (screen) pixels.
///
/// The forward map is
///
/// ```text
/// translate(window_center) · scale(scale, about scale_focus) · translate(-round(origin))
/// ```
///
/// so the map-pixel point `origin` lands on the viewport center when the
/// scale is `1.0`. Map pixels are grid cells multiplied by the current
/// [`TileSize`]. The forward and inverse maps are rebuilt eagerly whenever an
/// input changes; nothing is cached across stale state.
///
/// ```rust
/// use kurbo::{Point, Size};
/// use cityview_view2d::{GridLocation, TileSize, TileTransform};
///
/// let mut t = TileTransform::new(Size::new(480.0, 320.0), TileSize::MAX);
/// t.set_origin(Point::new(1920.0, 1600.0));
///
/// // The viewport center sits on the origin's cell.
/// assert_eq!(t.to_grid(Point::new(240.0, 160.0)), GridLocation::new(60, 50));
/// ```
#[derive(Clone, Debug)]
pub struct TileTransform {
    window: Size,
    origin: Point,
    scale: f64,
    scale_focus: Vec2,
    tile_size: TileSize,
    map_to_view: Affine,
    view_to_map: Option<Affine>,
}

impl TileTransform {
    /// Creates a transform for a window of `window` pixels at scale `1.0`,
    /// origin `(0, 0)` and no scale focus offset.
    #[must_use]
    pub fn new(window: Size, tile_size: TileSize) -> Self {
        let mut t = Self {
            window,
            origin: Point::ZERO,
            scale: 1.0,
            scale_focus: Vec2::ZERO,
            tile_size,
            map_to_view: Affine::IDENTITY,
            view_to_map: Some(Affine::IDENTITY),
        };
        t.rebuild();
        t
    }

    /// Window size in view pixels.
    #[must_use]
    pub fn window(&self) -> Size {
        self.window
    }

    /// Map-pixel point under the viewport center (before scaling).
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Current continuous scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Pinch pivot, in view pixels relative to the viewport center.
    #[must_use]
    pub fn scale_focus(&self) -> Vec2 {
        self.scale_focus
    }

    /// Current tile size.
    #[must_use]
    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Sets the window size.
    pub fn set_window(&mut self, window: Size) {
        if self.window == window {
            return;
        }
        self.window = window;
        self.rebuild();
    }

    /// Sets the origin. No clamping is applied here.
    pub fn set_origin(&mut self, origin: Point) {
        if self.origin == origin {
            return;
        }
        self.origin = origin;
        self.rebuild();
    }

    /// Sets the scale factor. No clamping is applied here.
    pub fn set_scale(&mut self, scale: f64) {
        if self.scale == scale {
            return;
        }
        self.scale = scale;
        self.rebuild();
    }

    /// Sets the pinch pivot, relative to the viewport center.
    pub fn set_scale_focus(&mut self, focus: Vec2) {
        if self.scale_focus == focus {
            return;
        }
        self.scale_focus = focus;
        self.rebuild();
    }

    /// Switches to a new tile size without moving anything on screen.
    ///
    /// With `f = new / old`, the scale factor is divided by `f` and the origin
    /// becomes `f * origin + (f - 1) * scale_focus`, which leaves the forward
    /// map unchanged for every grid cell (up to the origin's pixel rounding).
    pub fn retile(&mut self, tile_size: TileSize) {
        if self.tile_size == tile_size {
            return;
        }
        let f = f64::from(tile_size.get()) / f64::from(self.tile_size.get());
        self.scale /= f;
        self.origin = (self.origin.to_vec2() * f + self.scale_focus * (f - 1.0)).to_point();
        self.tile_size = tile_size;
        self.rebuild();
    }

    /// The forward affine map (map pixels → view pixels).
    #[must_use]
    pub fn affine(&self) -> Affine {
        self.map_to_view
    }

    /// The inverse affine map (view pixels → map pixels).
    pub fn try_inverse(&self) -> Result<Affine, SingularTransform> {
        self.view_to_map.ok_or(SingularTransform { scale: self.scale })
    }

    /// View-pixel rectangle covered by `loc`, rounded outward to whole pixels.
    #[must_use]
    pub fn tile_rect(&self, loc: GridLocation) -> Rect {
        let ts = f64::from(self.tile_size.get());
        let (x, y) = (f64::from(loc.x), f64::from(loc.y));
        let map = Rect::new(x * ts, y * ts, (x + 1.0) * ts, (y + 1.0) * ts);
        self.map_to_view.transform_rect_bbox(map).expand()
    }

    /// Maps a view-pixel point to the grid cell under it.
    ///
    /// The inverse-mapped coordinate is truncated toward zero before the
    /// integer division by the tile size.
    pub fn try_to_grid(&self, view_pt: Point) -> Result<GridLocation, SingularTransform> {
        let map_pt = self.try_inverse()? * view_pt;
        let ts = self.tile_size.get_i32();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Truncation toward zero is the cell rounding rule; saturates on overflow"
        )]
        let (px, py) = (map_pt.x as i32, map_pt.y as i32);
        Ok(GridLocation::new(px / ts, py / ts))
    }

    /// Like [`TileTransform::try_to_grid`], but recovers a singular transform
    /// by returning [`GridLocation::ORIGIN`].
    #[must_use]
    pub fn to_grid(&self, view_pt: Point) -> GridLocation {
        self.try_to_grid(view_pt).unwrap_or_else(|err| {
            log::warn!("{err}; mapping {view_pt:?} to the origin cell");
            GridLocation::ORIGIN
        })
    }

    /// Cells whose rectangles may intersect the window, clamped to a
    /// `grid_width` x `grid_height` grid.
    ///
    /// The range is padded by one cell on the far edges so partially visible
    /// tiles are included. A singular transform yields an empty range.
    #[must_use]
    pub fn visible_cells(&self, grid_width: u32, grid_height: u32) -> CellRange {
        let Ok(inverse) = self.try_inverse() else {
            return CellRange::EMPTY;
        };
        let clip = inverse
            .transform_rect_bbox(Rect::from_origin_size(Point::ZERO, self.window))
            .expand();
        let ts = f64::from(self.tile_size.get());
        let min = (Vec2::new(clip.x0, clip.y0) / ts).floor();
        let max = (Vec2::new(clip.x1, clip.y1) / ts).floor();
        let clamp = |v: f64, limit: u32| -> u32 {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "Value is clamped into [0, limit] first"
            )]
            {
                v.clamp(0.0, f64::from(limit)) as u32
            }
        };
        CellRange {
            x0: clamp(min.x, grid_width),
            y0: clamp(min.y, grid_height),
            x1: clamp(max.x + 1.0, grid_width),
            y1: clamp(max.y + 1.0, grid_height),
        }
    }

    fn rebuild(&mut self) {
        // Integer halves, like the window center a platform view reports.
        let center = (self.window / 2.0).trunc().to_vec2();
        let mut affine = Affine::translate(center);
        if self.scale != 1.0 {
            affine *= Affine::scale_about(self.scale, self.scale_focus.to_point());
        }
        affine *= Affine::translate(-self.origin.to_vec2().round());
        self.map_to_view = affine;
        self.view_to_map = if affine.determinant().abs() > f64::EPSILON {
            Some(affine.inverse())
        } else {
            None
        };
    }
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Half-open rectangle of grid cells, `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    /// First column.
    pub x0: u32,
    /// First row.
    pub y0: u32,
    /// One past the last column.
    pub x1: u32,
    /// One past the last row.
    pub y1: u32,
}

impl CellRange {
    /// A range containing no cells.
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    /// Returns `true` if the range contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Iterates the cells row by row.
    pub fn iter(&self) -> impl Iterator<Item = GridLocation> + '_ {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| {
            (x0..x1).map(move |x| GridLocation::new(to_i32(x), to_i32(y)))
        })
    }
}
