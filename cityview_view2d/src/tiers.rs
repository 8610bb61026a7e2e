// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom tiers and the discrete tile-size ladder they drive.
//!
//! The continuous scale factor is only ever a transient state: once a gesture
//! ends, the view settles on one of three [`ZoomTier`]s. Reaching the half or
//! double tier steps the [`TileSize`] down or up by one factor of two, which
//! in turn rescales the continuous factor back towards `1.0`.

use core::f64::consts::{FRAC_1_SQRT_2, SQRT_2};

/// Smallest scale factor a pinch may reach.
pub const MIN_SCALE: f64 = 0.5;

/// Largest scale factor a pinch may reach.
pub const MAX_SCALE: f64 = 2.0;

/// Clamps a continuous scale factor into `[MIN_SCALE, MAX_SCALE]`.
#[must_use]
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// One of the three canonical zoom states the view settles to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomTier {
    /// Scale factor `0.5`.
    Half,
    /// Scale factor `1.0`.
    Normal,
    /// Scale factor `2.0`.
    Double,
}

impl ZoomTier {
    /// Picks the tier nearest to `scale` on a logarithmic scale.
    ///
    /// The cut points are `sqrt(2)` and `1/sqrt(2)`; values exactly on a cut
    /// point resolve to [`ZoomTier::Normal`].
    #[must_use]
    pub fn for_scale(scale: f64) -> Self {
        if scale > SQRT_2 {
            Self::Double
        } else if scale < FRAC_1_SQRT_2 {
            Self::Half
        } else {
            Self::Normal
        }
    }

    /// The scale factor this tier settles to.
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Double => 2.0,
        }
    }
}

/// Edge length of one tile in map pixels: 8, 16 or 32.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileSize(u32);

impl TileSize {
    /// Smallest tile size.
    pub const MIN: Self = Self(8);
    /// Largest tile size, also the size tiles are authored at.
    pub const MAX: Self = Self(32);
    /// Tile size a fresh view starts with.
    pub const BASE: Self = Self::MAX;

    /// Returns a tile size for `px` if it is one of the supported steps.
    #[must_use]
    pub fn new(px: u32) -> Option<Self> {
        match px {
            8 | 16 | 32 => Some(Self(px)),
            _ => None,
        }
    }

    /// Edge length in pixels.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Edge length as a signed integer, for cell arithmetic.
    #[must_use]
    pub const fn get_i32(self) -> i32 {
        // At most 32, always representable.
        self.0 as i32
    }

    /// The tile size a settle onto `tier` switches to, if any.
    ///
    /// [`ZoomTier::Half`] halves the size unless already at [`TileSize::MIN`];
    /// [`ZoomTier::Double`] doubles it unless already at [`TileSize::MAX`];
    /// [`ZoomTier::Normal`] never changes it.
    #[must_use]
    pub fn settle(self, tier: ZoomTier) -> Option<Self> {
        match tier {
            ZoomTier::Half if self > Self::MIN => Some(Self(self.0 / 2)),
            ZoomTier::Double if self < Self::MAX => Some(Self(self.0 * 2)),
            _ => None,
        }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::BASE
    }
}
