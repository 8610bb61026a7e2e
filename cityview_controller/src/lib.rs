// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cityview Controller: pan, pinch, fling and blink for tile-map views.
//!
//! [`ViewportController`] owns the view state of one map viewport (origin,
//! scale factor, pinch pivot, tile size) and the two timer-driven behaviors
//! layered on top of it:
//! - **Momentum**: a single slot running either a decaying scroll fling or a
//!   zoom settle that eases the scale factor onto one of three tiers and then
//!   steps the tile size. Starting, superseding and cancelling tasks is
//!   handled by [`MomentumScheduler`]; ticks for a superseded task are
//!   discarded.
//! - **Blink**: unpowered tiles found while drawing alternate between their
//!   normal and unpowered glyphs every half second, for as long as any exist.
//!
//! The controller reads no clock and owns no thread. The host feeds it time
//! through [`ViewportController::advance_to`], input through a
//! [`GestureRouter`] (or the controller's own methods), and draws through
//! [`ViewportController::draw`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use cityview_controller::{GestureEvent, GestureRouter, ViewConfig, ViewportController};
//! use cityview_view2d::TileSize;
//!
//! struct Grid;
//!
//! let mut view = ViewportController::new(ViewConfig::default(), Size::new(480.0, 320.0));
//! view.set_grid_size(120, 100);
//! let mut router = GestureRouter::<Grid>::new();
//! let mut grid = Grid;
//!
//! // Halving the tile size doubles the scale so nothing moves on screen.
//! view.set_tile_size(TileSize::new(16).unwrap());
//! assert_eq!(view.scale(), 2.0);
//!
//! // Pinch in to 1.9x and let go: the view settles on the double tier.
//! let focus = Point::new(240.0, 160.0);
//! router.route(&mut view, &mut grid, GestureEvent::Pinch { focus, factor: 0.95 });
//! router.route(&mut view, &mut grid, GestureEvent::PinchEnd);
//!
//! // Run the settle animation to completion.
//! while let Some(deadline) = view.next_deadline() {
//!     view.advance_to(deadline);
//! }
//! assert_eq!(view.tile_size(), TileSize::MAX);
//! assert_eq!(view.scale(), 1.0);
//! ```
//!
//! ## Host loop
//!
//! 1. Call [`advance_to`](ViewportController::advance_to) with the current
//!    time before dispatching input and whenever
//!    [`next_deadline`](ViewportController::next_deadline) elapses.
//! 2. Route input through [`GestureRouter::route`].
//! 3. Drain [`take_redraws`](ViewportController::take_redraws); when
//!    non-empty, call [`draw`](ViewportController::draw) under
//!    [`render_transform`](ViewportController::render_transform).
//! 4. Drain [`take_events`](ViewportController::take_events) to react to
//!    tile size changes.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Float math goes through Kurbo,
//! so build with either the `std` (default) or the `libm` feature.

#![no_std]

extern crate alloc;

mod blink;
mod config;
mod controller;
mod fling;
mod gesture;
mod host;
mod momentum;
mod persist;
mod redraw;

pub use blink::BlinkScheduler;
pub use config::{MIN_TIMER_PERIOD, ViewConfig};
pub use controller::{ViewEvent, ViewTimer, ViewportController};
pub use fling::{FRICTION, FlingScroller, MIN_FLING_SPEED, SPRING_BACK};
pub use gesture::{GestureEvent, GestureRouter};
pub use host::{Inspector, Notifier, TileGlyph, TileGrid, TileSink, Tool, ToolError};
pub use momentum::{MomentumScheduler, MomentumStep, MomentumTask, TaskId};
pub use persist::ViewState;
pub use redraw::{Redraw, RedrawQueue};
