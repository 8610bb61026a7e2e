// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing of recognized gestures into controller actions.
//!
//! The platform's gesture detectors are out of scope: events arrive here
//! already classified. The router turns them into transform mutations,
//! momentum starts, or tap dispatch to the selected [`Tool`] (or the
//! [`Inspector`] when no tool is selected).

use alloc::boxed::Box;

use kurbo::{Point, Vec2};

use crate::controller::ViewportController;
use crate::host::{Inspector, Notifier, Tool, ToolError};

/// A gesture recognized by the platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    /// A finger touched down.
    Down,
    /// The finger dragged; `delta` is the scroll distance in view pixels
    /// (previous position minus current).
    Pan {
        /// Scroll distance.
        delta: Vec2,
    },
    /// The finger lifted while moving at `velocity` view pixels per second.
    Fling {
        /// Release velocity, in the direction the finger moved.
        velocity: Vec2,
    },
    /// A pinch update.
    Pinch {
        /// Pinch center in view pixels.
        focus: Point,
        /// Scale change since the previous update.
        factor: f64,
    },
    /// The pinch ended.
    PinchEnd,
    /// A single tap at `point` in view pixels.
    Tap {
        /// Tap position.
        point: Point,
    },
}

/// Dispatches [`GestureEvent`]s for a grid of type `G`.
pub struct GestureRouter<G: ?Sized> {
    tool: Option<Box<dyn Tool<G>>>,
    inspector: Option<Box<dyn Inspector>>,
    notifier: Option<Box<dyn Notifier>>,
    enabled: bool,
}

impl<G: ?Sized> core::fmt::Debug for GestureRouter<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GestureRouter")
            .field("has_tool", &self.tool.is_some())
            .field("has_inspector", &self.inspector.is_some())
            .field("has_notifier", &self.notifier.is_some())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl<G: ?Sized> Default for GestureRouter<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: ?Sized> GestureRouter<G> {
    /// Creates an enabled router with no tool, inspector, or notifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool: None,
            inspector: None,
            notifier: None,
            enabled: true,
        }
    }

    /// Selects the tool applied on tap, or deselects it with `None`.
    pub fn set_tool(&mut self, tool: Option<Box<dyn Tool<G>>>) {
        self.tool = tool;
    }

    /// Returns `true` if a tool is selected.
    #[must_use]
    pub fn has_tool(&self) -> bool {
        self.tool.is_some()
    }

    /// Sets the receiver of inspect requests.
    pub fn set_inspector(&mut self, inspector: Option<Box<dyn Inspector>>) {
        self.inspector = inspector;
    }

    /// Sets the receiver of tool failures.
    pub fn set_notifier(&mut self, notifier: Option<Box<dyn Notifier>>) {
        self.notifier = notifier;
    }

    /// Enables or disables touch handling. A disabled router ignores every
    /// event.
    pub fn set_touch_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns `true` if touch handling is enabled.
    #[must_use]
    pub fn touch_enabled(&self) -> bool {
        self.enabled
    }

    /// Applies `event` to `controller`, dispatching taps against `grid`.
    ///
    /// Returns `false` if the event was ignored because touch is disabled.
    pub fn route(
        &mut self,
        controller: &mut ViewportController,
        grid: &mut G,
        event: GestureEvent,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            GestureEvent::Down => controller.cancel_momentum(),
            GestureEvent::Pan { delta } => controller.pan_by(delta),
            GestureEvent::Fling { velocity } => controller.start_fling(velocity),
            GestureEvent::Pinch { focus, factor } => controller.pinch_by(focus, factor),
            GestureEvent::PinchEnd => controller.end_pinch(),
            GestureEvent::Tap { point } => self.tap(controller, grid, point),
        }
        true
    }

    fn tap(&mut self, controller: &mut ViewportController, grid: &mut G, point: Point) {
        controller.cancel_momentum();
        let loc = controller.grid_location_at(point);
        let (width, height) = controller.grid_size();
        if !loc.is_within(width, height) {
            log::debug!("tap at {point:?} maps to {loc}, outside the grid");
            return;
        }
        if let Some(tool) = self.tool.as_mut() {
            if let Err(err) = tool.apply(grid, loc) {
                self.report(&err);
            }
        } else if let Some(inspector) = self.inspector.as_mut() {
            inspector.inspect(loc);
        }
    }

    fn report(&mut self, err: &ToolError) {
        match self.notifier.as_mut() {
            Some(notifier) => notifier.notify_failure(err),
            None => log::error!("tool failed: {err}"),
        }
    }
}
