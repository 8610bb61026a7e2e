// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

/// Shortest delay accepted between two firings of the same timer.
///
/// A zero period would reschedule a tick at the deadline it fires on, so
/// time could never move past it.
pub const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

/// Zoom settle ratio used when none, or an unusable one, is configured.
pub(crate) const DEFAULT_ZOOM_STEP: f64 = 0.9;

/// Returns `true` if `step` is a usable zoom settle ratio.
pub(crate) fn zoom_step_in_range(step: f64) -> bool {
    step > 0.0 && step < 1.0
}

/// Policy constants for a [`ViewportController`](crate::ViewportController).
///
/// The defaults are the values the map view has always used; hosts rarely
/// need to change them outside of tests.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewConfig {
    /// Delay between momentum ticks (fling and zoom settle).
    pub tick_period: Duration,
    /// Per-tick ratio applied to the scale factor while settling a zoom.
    ///
    /// Must be in `(0, 1)`. Shrinking multiplies by it, growing divides by it.
    /// Other values are replaced by [`validated`](Self::validated).
    pub zoom_step: f64,
    /// Delay between blink toggles.
    pub blink_interval: Duration,
    /// Fling overscroll slack, in tiles, past each edge of the map.
    pub overscroll_tiles: u32,
    /// Whether unpowered tiles blink at all.
    pub blink_unpowered: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(100),
            zoom_step: DEFAULT_ZOOM_STEP,
            blink_interval: Duration::from_millis(500),
            overscroll_tiles: 4,
            blink_unpowered: true,
        }
    }
}

impl ViewConfig {
    /// Returns a copy with every out-of-range value replaced.
    ///
    /// A `zoom_step` outside `(0, 1)` falls back to the default, and a
    /// `tick_period` or `blink_interval` shorter than [`MIN_TIMER_PERIOD`] is
    /// raised to it. [`ViewportController::new`](crate::ViewportController::new)
    /// applies this to the configuration it is given.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if !zoom_step_in_range(self.zoom_step) {
            log::warn!(
                "zoom step {} is outside (0, 1), using {DEFAULT_ZOOM_STEP}",
                self.zoom_step
            );
            self.zoom_step = DEFAULT_ZOOM_STEP;
        }
        if self.tick_period < MIN_TIMER_PERIOD {
            log::warn!(
                "tick period {:?} is too short, using {MIN_TIMER_PERIOD:?}",
                self.tick_period
            );
            self.tick_period = MIN_TIMER_PERIOD;
        }
        if self.blink_interval < MIN_TIMER_PERIOD {
            log::warn!(
                "blink interval {:?} is too short, using {MIN_TIMER_PERIOD:?}",
                self.blink_interval
            );
            self.blink_interval = MIN_TIMER_PERIOD;
        }
        self
    }

    /// Returns a copy with a different momentum tick period.
    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Returns a copy with a different zoom settle ratio.
    #[must_use]
    pub fn with_zoom_step(mut self, step: f64) -> Self {
        self.zoom_step = step;
        self
    }

    /// Returns a copy with a different blink interval.
    #[must_use]
    pub fn with_blink_interval(mut self, interval: Duration) -> Self {
        self.blink_interval = interval;
        self
    }

    /// Returns a copy with a different overscroll slack.
    #[must_use]
    pub fn with_overscroll_tiles(mut self, tiles: u32) -> Self {
        self.overscroll_tiles = tiles;
        self
    }

    /// Returns a copy with blinking switched on or off.
    #[must_use]
    pub fn with_blink_unpowered(mut self, blink: bool) -> Self {
        self.blink_unpowered = blink;
        self
    }
}
