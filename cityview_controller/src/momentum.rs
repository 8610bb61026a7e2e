// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-slot momentum: at most one fling or zoom settle runs at a time.
//!
//! The scheduler owns no timers. Starting a task hands back a [`TaskId`];
//! the owner queues ticks carrying that id and feeds them back through
//! [`MomentumScheduler::tick`]. A tick whose id is no longer the active task
//! reports [`MomentumStep::Stale`] and changes nothing.
//!
//! ## Minimal example
//!
//! ```rust
//! use cityview_controller::{MomentumScheduler, MomentumStep};
//! use cityview_view2d::ZoomTier;
//! use core::time::Duration;
//!
//! let mut momentum = MomentumScheduler::new(0.9);
//! let first = momentum.start_zoom(ZoomTier::Double);
//!
//! // A newer task supersedes the first one.
//! let second = momentum.start_zoom(ZoomTier::Normal);
//! assert_eq!(momentum.tick(first, Duration::ZERO, 1.5), MomentumStep::Stale);
//!
//! match momentum.tick(second, Duration::ZERO, 1.5) {
//!     MomentumStep::Zoom { scale, settled, .. } => {
//!         assert!(scale < 1.5);
//!         assert!(!settled);
//!     }
//!     other => panic!("unexpected step {other:?}"),
//! }
//! ```

use core::mem;
use core::time::Duration;

use cityview_view2d::ZoomTier;
use kurbo::{Point, Vec2};

use crate::config::{DEFAULT_ZOOM_STEP, zoom_step_in_range};
use crate::fling::FlingScroller;

/// Identity of one momentum task.
///
/// Ids increase monotonically, so a tick carrying an older id can never
/// match a newer task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// The task currently occupying the momentum slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MomentumTask {
    /// Nothing is moving.
    #[default]
    Idle,
    /// A decaying scroll of the view origin.
    ScrollFling {
        /// Task identity.
        id: TaskId,
        /// Initial origin velocity, in map pixels per second.
        velocity: Vec2,
        /// Deceleration model driving the origin.
        scroller: FlingScroller,
    },
    /// Geometric interpolation of the scale factor toward a tier.
    ZoomSettle {
        /// Task identity.
        id: TaskId,
        /// Tier being settled onto.
        target: ZoomTier,
    },
}

impl MomentumTask {
    /// Identity of the task, or `None` when idle.
    #[must_use]
    pub fn id(&self) -> Option<TaskId> {
        match self {
            Self::Idle => None,
            Self::ScrollFling { id, .. } | Self::ZoomSettle { id, .. } => Some(*id),
        }
    }

    /// Returns `true` if no task is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// What a tick asks the owner to apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MomentumStep {
    /// The tick belonged to a superseded task; do nothing.
    Stale,
    /// Move the origin.
    Scroll {
        /// New view origin, in map pixels.
        origin: Point,
        /// The fling has finished and the slot is now idle.
        settled: bool,
    },
    /// Set the scale factor.
    Zoom {
        /// New scale factor.
        scale: f64,
        /// `scale` reached the target and the slot is now idle.
        settled: bool,
        /// Tier being settled onto.
        target: ZoomTier,
    },
}

/// Owner of the single momentum slot.
#[derive(Clone, Debug)]
pub struct MomentumScheduler {
    active: MomentumTask,
    next_id: u64,
    zoom_step: f64,
}

impl MomentumScheduler {
    /// Creates an idle scheduler.
    ///
    /// `zoom_step` is the per-tick ratio used while settling a zoom. A value
    /// outside `(0, 1)` is replaced by the default ratio.
    #[must_use]
    pub fn new(zoom_step: f64) -> Self {
        let zoom_step = if zoom_step_in_range(zoom_step) {
            zoom_step
        } else {
            log::warn!("zoom step {zoom_step} is outside (0, 1), using {DEFAULT_ZOOM_STEP}");
            DEFAULT_ZOOM_STEP
        };
        Self {
            active: MomentumTask::Idle,
            next_id: 0,
            zoom_step,
        }
    }

    /// The task in the slot.
    #[must_use]
    pub fn active(&self) -> &MomentumTask {
        &self.active
    }

    /// Returns `true` if no task is running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_idle()
    }

    /// Returns `true` if `id` identifies the running task.
    #[must_use]
    pub fn is_current(&self, id: TaskId) -> bool {
        self.active.id() == Some(id)
    }

    /// Puts a fling in the slot, replacing whatever was there.
    ///
    /// Callers that need a replaced zoom settle to complete should
    /// [`cancel`](Self::cancel) it first.
    pub fn start_fling(&mut self, velocity: Vec2, scroller: FlingScroller) -> TaskId {
        let id = self.issue_id();
        self.active = MomentumTask::ScrollFling {
            id,
            velocity,
            scroller,
        };
        id
    }

    /// Puts a zoom settle toward `target` in the slot, replacing whatever
    /// was there.
    pub fn start_zoom(&mut self, target: ZoomTier) -> TaskId {
        let id = self.issue_id();
        self.active = MomentumTask::ZoomSettle { id, target };
        id
    }

    /// Empties the slot and returns the task that was in it.
    ///
    /// Any tick still queued for that task becomes stale.
    pub fn cancel(&mut self) -> MomentumTask {
        mem::take(&mut self.active)
    }

    /// Advances task `id` to time `now`, given the current scale factor.
    ///
    /// When the step reports `settled`, the slot has already gone idle.
    pub fn tick(&mut self, id: TaskId, now: Duration, scale: f64) -> MomentumStep {
        if !self.is_current(id) {
            return MomentumStep::Stale;
        }
        let step = match &self.active {
            MomentumTask::Idle => return MomentumStep::Stale,
            MomentumTask::ScrollFling { scroller, .. } => {
                if scroller.is_finished(now) {
                    MomentumStep::Scroll {
                        origin: scroller.final_position(),
                        settled: true,
                    }
                } else {
                    MomentumStep::Scroll {
                        origin: scroller.position(now),
                        settled: false,
                    }
                }
            }
            MomentumTask::ZoomSettle { target, .. } => {
                let next = self.zoom_toward(scale, target.factor());
                MomentumStep::Zoom {
                    scale: next,
                    settled: next == target.factor(),
                    target: *target,
                }
            }
        };
        if matches!(
            step,
            MomentumStep::Scroll { settled: true, .. } | MomentumStep::Zoom { settled: true, .. }
        ) {
            self.active = MomentumTask::Idle;
        }
        step
    }

    /// The zoom settle ratio in use.
    #[must_use]
    pub fn zoom_step(&self) -> f64 {
        self.zoom_step
    }

    /// One geometric step from `scale` toward `target`.
    ///
    /// The result always lies between `scale` and `target`, inclusive.
    fn zoom_toward(&self, scale: f64, target: f64) -> f64 {
        if scale > target {
            (scale * self.zoom_step).max(target).min(scale)
        } else if scale < target {
            (scale / self.zoom_step).min(target).max(scale)
        } else {
            target
        }
    }

    fn issue_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }
}
