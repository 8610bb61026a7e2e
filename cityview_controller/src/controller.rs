// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The viewport controller aggregate.

use alloc::vec::Vec;
use core::time::Duration;

use cityview_timing::TimerQueue;
use cityview_view2d::{
    GridLocation, MAX_SCALE, MIN_SCALE, TileSize, TileTransform, ViewportBounds, ZoomTier,
    clamp_scale,
};
use kurbo::{Affine, Point, Size, Vec2};

use crate::blink::BlinkScheduler;
use crate::config::ViewConfig;
use crate::fling::FlingScroller;
use crate::host::{TileGlyph, TileGrid, TileSink};
use crate::momentum::{MomentumScheduler, MomentumStep, MomentumTask, TaskId};
use crate::persist::ViewState;
use crate::redraw::{Redraw, RedrawQueue};

/// Payload of a timer queued by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewTimer {
    /// Next tick of momentum task `TaskId`.
    Momentum(TaskId),
    /// Next blink toggle.
    Blink,
}

/// Notable state changes reported to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    /// A zoom settle completed on `tier`; `tile_size` is the size now in use.
    ZoomSettled {
        /// Tier the scale factor landed on.
        tier: ZoomTier,
        /// Tile size after the settle.
        tile_size: TileSize,
    },
    /// The tile size changed; tile images at the old size can be dropped.
    TileSizeChanged(TileSize),
}

/// Owns the view state of one tile-map viewport and everything that moves it.
///
/// The controller is driven from outside:
/// - input arrives as method calls (or through a
///   [`GestureRouter`](crate::GestureRouter)),
/// - time arrives through [`advance_to`](Self::advance_to), which fires due
///   timers; [`next_deadline`](Self::next_deadline) says when to call it next,
/// - drawing happens in [`draw`](Self::draw), and the renderer drains
///   [`take_redraws`](Self::take_redraws) to learn what to repaint.
///
/// Outside of a fling in progress, the origin is always inside
/// [`bounds`](Self::bounds).
#[derive(Debug)]
pub struct ViewportController {
    config: ViewConfig,
    view: TileTransform,
    grid_width: u32,
    grid_height: u32,
    bounds: ViewportBounds,
    momentum: MomentumScheduler,
    blink: BlinkScheduler,
    timers: TimerQueue<ViewTimer>,
    redraws: RedrawQueue,
    events: Vec<ViewEvent>,
    now: Duration,
}

impl ViewportController {
    /// Creates a controller for a `window`-sized viewport with no grid
    /// attached (a `0 x 0` grid) at the base tile size.
    ///
    /// Out-of-range values in `config` are replaced as described in
    /// [`ViewConfig::validated`].
    #[must_use]
    pub fn new(config: ViewConfig, window: Size) -> Self {
        let config = config.validated();
        let tile_size = TileSize::BASE;
        Self {
            momentum: MomentumScheduler::new(config.zoom_step),
            config,
            view: TileTransform::new(window, tile_size),
            grid_width: 0,
            grid_height: 0,
            bounds: ViewportBounds::new(0, 0, tile_size),
            blink: BlinkScheduler::new(),
            timers: TimerQueue::new(),
            redraws: RedrawQueue::new(),
            events: Vec::new(),
            now: Duration::ZERO,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// The current view transform.
    #[must_use]
    pub fn transform(&self) -> &TileTransform {
        &self.view
    }

    /// Map-pixel to view-pixel transform the renderer should draw under.
    #[must_use]
    pub fn render_transform(&self) -> Affine {
        self.view.affine()
    }

    /// Legal range of the origin.
    #[must_use]
    pub fn bounds(&self) -> ViewportBounds {
        self.bounds
    }

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub fn grid_size(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }

    /// Current tile size.
    #[must_use]
    pub fn tile_size(&self) -> TileSize {
        self.view.tile_size()
    }

    /// Current scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.view.scale()
    }

    /// Current origin, in map pixels.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.view.origin()
    }

    /// Current blink phase.
    #[must_use]
    pub fn blink_phase(&self) -> bool {
        self.blink.phase()
    }

    /// Returns `true` while a blink toggle is pending.
    #[must_use]
    pub fn blink_scheduled(&self) -> bool {
        self.blink.is_scheduled()
    }

    /// The momentum task in progress, if any.
    #[must_use]
    pub fn momentum(&self) -> &MomentumTask {
        self.momentum.active()
    }

    /// The controller's notion of the current time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Attaches a grid of the given size and centers the view on it.
    pub fn set_grid_size(&mut self, width: u32, height: u32) {
        self.grid_width = width;
        self.grid_height = height;
        self.bounds = ViewportBounds::new(width, height, self.view.tile_size());
        self.view.set_origin(self.bounds.center());
        log::debug!(
            "grid is {width}x{height}, centered at {:?}",
            self.view.origin()
        );
        self.redraws.push_full();
    }

    /// Resizes the viewport.
    pub fn set_window_size(&mut self, window: Size) {
        self.view.set_window(window);
        self.redraws.push_full();
    }

    /// Scrolls by `delta` view pixels and clamps the origin into bounds.
    ///
    /// `delta` is the scroll distance: positive values move the view right
    /// and down over the map, which is what a finger dragging left and up
    /// produces.
    pub fn pan_by(&mut self, delta: Vec2) {
        let origin = self.view.origin() + delta / self.view.scale();
        self.view.set_origin(self.bounds.clamp(origin));
        self.redraws.push_full();
    }

    /// Applies one pinch update.
    ///
    /// `focus` is the pinch center in view pixels; `factor` multiplies the
    /// scale factor, which stays within [`MIN_SCALE`]..=[`MAX_SCALE`].
    pub fn pinch_by(&mut self, focus: Point, factor: f64) {
        let center = (self.view.window() / 2.0).trunc().to_vec2();
        self.view.set_scale_focus(focus.to_vec2() - center);
        self.view.set_scale(clamp_scale(self.view.scale() * factor));
        self.redraws.push_full();
    }

    /// Ends a pinch gesture and settles onto the nearest zoom tier.
    pub fn end_pinch(&mut self) {
        self.settle_zoom_tier();
    }

    /// Starts a fling with `velocity` in view pixels per second, measured in
    /// the direction the finger moved.
    ///
    /// Any task in progress is cancelled first, so a zoom settle completes
    /// before the fling begins.
    pub fn start_fling(&mut self, velocity: Vec2) {
        self.cancel_momentum();
        let velocity = -velocity / self.view.scale();
        let overscroll = f64::from(
            self.config
                .overscroll_tiles
                .saturating_mul(self.view.tile_size().get()),
        );
        let scroller = FlingScroller::new(
            self.view.origin(),
            velocity,
            self.bounds.rect(),
            overscroll,
            self.now,
        );
        let id = self.momentum.start_fling(velocity, scroller);
        log::debug!("fling {id:?} started at {velocity:?} map px/s");
        self.schedule_tick(id, self.config.tick_period);
    }

    /// Stops the task in progress.
    ///
    /// A fling stops where it is. A zoom settle snaps to its target and
    /// completes immediately.
    pub fn cancel_momentum(&mut self) {
        self.timers
            .cancel_where(|t| matches!(t, ViewTimer::Momentum(_)));
        match self.momentum.cancel() {
            MomentumTask::Idle => {}
            MomentumTask::ScrollFling { id, .. } => {
                log::debug!("fling {id:?} cancelled at {:?}", self.view.origin());
            }
            MomentumTask::ZoomSettle { id, target } => {
                log::debug!("zoom settle {id:?} cancelled, snapping to {target:?}");
                self.view.set_scale(target.factor());
                self.redraws.push_full();
                self.complete_zoom(target);
            }
        }
    }

    /// Settles onto the zoom tier nearest the current scale factor.
    pub fn settle_zoom_tier(&mut self) {
        self.start_zoom_settle(ZoomTier::for_scale(self.view.scale()));
    }

    /// Starts animating the scale factor toward `tier`.
    ///
    /// When the scale factor is already there, the settle completes
    /// immediately and no task is created.
    pub fn start_zoom_settle(&mut self, tier: ZoomTier) {
        if self.view.scale() == tier.factor() {
            self.complete_zoom(tier);
            return;
        }
        let id = self.momentum.start_zoom(tier);
        log::debug!(
            "zoom settle {id:?} from {} toward {tier:?}",
            self.view.scale()
        );
        self.schedule_tick(id, Duration::ZERO);
    }

    /// Applies the tile-size effect of landing on `tier`.
    fn complete_zoom(&mut self, tier: ZoomTier) {
        if let Some(tile_size) = self.view.tile_size().settle(tier) {
            self.set_tile_size(tile_size);
        }
        let tile_size = self.view.tile_size();
        log::debug!("zoom settled on {tier:?} at tile size {}", tile_size.get());
        self.events.push(ViewEvent::ZoomSettled { tier, tile_size });
    }

    /// Switches tile size without moving anything on screen, then clamps the
    /// origin into the new bounds.
    ///
    /// The scale factor is divided by the size ratio. A jump of more than one
    /// step can push it out of [`MIN_SCALE`]..=[`MAX_SCALE`], in which case it
    /// is clamped and the picture does move.
    pub fn set_tile_size(&mut self, tile_size: TileSize) {
        if tile_size == self.view.tile_size() {
            return;
        }
        self.view.retile(tile_size);
        self.view.set_scale(clamp_scale(self.view.scale()));
        self.bounds = ViewportBounds::new(self.grid_width, self.grid_height, tile_size);
        self.view.set_origin(self.bounds.clamp(self.view.origin()));
        log::debug!(
            "tile size {} px, scale {}, origin {:?}",
            tile_size.get(),
            self.view.scale(),
            self.view.origin()
        );
        self.events.push(ViewEvent::TileSizeChanged(tile_size));
        self.redraws.push_full();
    }

    /// Fires every timer due at or before `now`, in deadline order.
    ///
    /// While a timer fires, [`now`](Self::now) reads as that timer's
    /// deadline. Timers scheduled by a firing timer also fire if already due.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(deadline) = self.timers.next_deadline().filter(|d| *d <= now) {
            let Some((_, timer)) = self.timers.pop_due(deadline) else {
                break;
            };
            self.now = self.now.max(deadline);
            self.fire(timer);
        }
        self.now = self.now.max(now);
    }

    /// When [`advance_to`](Self::advance_to) next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    fn fire(&mut self, timer: ViewTimer) {
        match timer {
            ViewTimer::Momentum(id) => self.momentum_tick(id),
            ViewTimer::Blink => {
                let cells = self.blink.toggle();
                log::trace!(
                    "blink phase {}, {} cells to redraw",
                    self.blink.phase(),
                    cells.len()
                );
                for loc in cells {
                    self.redraws.push_region(self.view.tile_rect(loc));
                }
            }
        }
    }

    fn momentum_tick(&mut self, id: TaskId) {
        match self.momentum.tick(id, self.now, self.view.scale()) {
            MomentumStep::Stale => log::trace!("discarding stale tick for {id:?}"),
            MomentumStep::Scroll { origin, settled } => {
                log::trace!("fling {id:?} at {origin:?}");
                self.view.set_origin(origin);
                self.redraws.push_full();
                if settled {
                    log::debug!("fling {id:?} finished at {origin:?}");
                    self.settle_zoom_tier();
                } else {
                    self.schedule_tick(id, self.config.tick_period);
                }
            }
            MomentumStep::Zoom {
                scale,
                settled,
                target,
            } => {
                log::trace!("zoom settle {id:?} at {scale}");
                self.view.set_scale(clamp_scale(scale));
                self.redraws.push_full();
                if settled {
                    self.complete_zoom(target);
                } else {
                    self.schedule_tick(id, self.config.tick_period);
                }
            }
        }
    }

    /// Queues the next tick of `id`. At most one momentum tick is ever queued.
    fn schedule_tick(&mut self, id: TaskId, delay: Duration) {
        self.timers
            .cancel_where(|t| matches!(t, ViewTimer::Momentum(_)));
        self.timers
            .schedule_after(self.now, delay, ViewTimer::Momentum(id));
    }

    /// Draws every visible cell of `grid` into `sink`.
    ///
    /// Unpowered tiles are recorded for the blink cycle and, while the blink
    /// phase is on, drawn with their alternate glyph. If the pass found any,
    /// a blink toggle is scheduled unless one is already pending.
    pub fn draw<G, S>(&mut self, grid: &G, sink: &mut S)
    where
        G: TileGrid + ?Sized,
        S: TileSink<G::Tile> + ?Sized,
    {
        let cells = self.view.visible_cells(grid.width(), grid.height());
        for loc in cells.iter() {
            let tile = grid.tile_at(loc);
            let glyph = if self.config.blink_unpowered
                && grid.needs_power(loc)
                && !grid.is_powered(loc)
            {
                self.blink.note_candidate(loc);
                if self.blink.phase() {
                    TileGlyph::Unpowered(tile)
                } else {
                    TileGlyph::Normal(tile)
                }
            } else {
                TileGlyph::Normal(tile)
            };
            sink.draw_tile(loc, glyph);
        }
        if self.blink.end_pass() {
            self.timers
                .schedule_after(self.now, self.config.blink_interval, ViewTimer::Blink);
        }
    }

    /// Requests a redraw of the tile at `loc` after the grid changed it.
    pub fn tile_changed(&mut self, loc: GridLocation) {
        self.redraws.push_region(self.view.tile_rect(loc));
    }

    /// Requests a full redraw after the whole grid changed.
    pub fn whole_map_changed(&mut self) {
        self.redraws.push_full();
    }

    /// Drains pending redraw requests.
    pub fn take_redraws(&mut self) -> Vec<Redraw> {
        self.redraws.take()
    }

    /// Drains pending events.
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        core::mem::take(&mut self.events)
    }

    /// Grid cell under the view-pixel point `pt`.
    ///
    /// May lie outside the grid; a singular transform yields
    /// [`GridLocation::ORIGIN`].
    #[must_use]
    pub fn grid_location_at(&self, pt: Point) -> GridLocation {
        self.view.to_grid(pt)
    }

    /// Captures the persisted part of the view state.
    #[must_use]
    pub fn save_state(&self) -> ViewState {
        let origin = self.view.origin();
        ViewState {
            scale: self.view.scale(),
            origin_x: origin.x,
            origin_y: origin.y,
        }
    }

    /// Restores a saved view state.
    ///
    /// The scale factor is clamped into [`MIN_SCALE`]..=[`MAX_SCALE`] (a
    /// non-finite one resets to `1.0`) and the origin into the current
    /// bounds. The tile size is left as it is.
    pub fn restore_state(&mut self, state: &ViewState) {
        self.cancel_momentum();
        let scale = if state.scale.is_finite() {
            state.scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };
        let origin = Point::new(state.origin_x, state.origin_y);
        let origin = if origin.is_finite() {
            self.bounds.clamp(origin)
        } else {
            self.bounds.center()
        };
        self.view.set_scale(scale);
        self.view.set_origin(origin);
        log::debug!("restored scale {scale}, origin {origin:?}");
        self.redraws.push_full();
    }
}
