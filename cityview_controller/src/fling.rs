// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deceleration model for scroll flings.
//!
//! Each axis decays independently with exponential friction,
//! `v(t) = v0 * e^(-k * t)`, until its speed drops below
//! [`MIN_FLING_SPEED`]. Travel past the bounds is allowed up to the
//! overscroll slack; an axis that hits the slack limit, or comes to rest
//! outside the bounds, springs back onto the nearest edge over
//! [`SPRING_BACK`] with a cubic ease-out. The model is evaluated at absolute
//! times, so it does not care how often it is sampled.

use core::f64::consts::E;
use core::time::Duration;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _; // for `ln` and `powf`
use kurbo::{Point, Rect, Vec2};

/// Friction coefficient `k`, per second. A fling travels `v0 / k` pixels.
pub const FRICTION: f64 = 4.0;

/// Speed, in pixels per second, below which a fling stops.
pub const MIN_FLING_SPEED: f64 = 20.0;

/// Time taken to spring back from overscroll onto the bounds.
pub const SPRING_BACK: Duration = Duration::from_millis(250);

/// A fling in progress over a bounded 2D scroll range.
///
/// ```rust
/// use core::time::Duration;
/// use kurbo::{Point, Rect, Vec2};
/// use cityview_controller::FlingScroller;
///
/// let bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
/// let fling = FlingScroller::new(
///     Point::new(500.0, 500.0),
///     Vec2::new(800.0, 0.0),
///     bounds,
///     128.0,
///     Duration::ZERO,
/// );
///
/// let later = Duration::from_secs(5);
/// assert!(fling.is_finished(later));
/// assert!(fling.position(later).x > 500.0);
/// assert_eq!(fling.position(later), fling.final_position());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FlingScroller {
    started: Duration,
    x: AxisFling,
    y: AxisFling,
}

impl FlingScroller {
    /// Starts a fling from `start` with `velocity` (pixels per second) at
    /// time `now`.
    ///
    /// `bounds` are hard stops; `overscroll` is the slack allowed past each
    /// edge before the fling is cut short.
    #[must_use]
    pub fn new(start: Point, velocity: Vec2, bounds: Rect, overscroll: f64, now: Duration) -> Self {
        Self {
            started: now,
            x: AxisFling::new(start.x, velocity.x, bounds.x0, bounds.x1, overscroll),
            y: AxisFling::new(start.y, velocity.y, bounds.y0, bounds.y1, overscroll),
        }
    }

    /// Position at time `now`.
    #[must_use]
    pub fn position(&self, now: Duration) -> Point {
        let t = self.elapsed(now);
        Point::new(self.x.position(t), self.y.position(t))
    }

    /// Returns `true` once both axes have come to rest inside the bounds.
    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        let t = self.elapsed(now);
        t >= self.x.duration() && t >= self.y.duration()
    }

    /// Where the fling comes to rest.
    #[must_use]
    pub fn final_position(&self) -> Point {
        Point::new(self.x.target, self.y.target)
    }

    /// Total time until the fling is finished.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.x.duration().max(self.y.duration()))
    }

    fn elapsed(&self, now: Duration) -> f64 {
        now.saturating_sub(self.started).as_secs_f64()
    }
}

/// One axis of a fling. Times are seconds since the fling started.
#[derive(Clone, Copy, Debug, PartialEq)]
struct AxisFling {
    start: f64,
    velocity: f64,
    /// Length of the decaying phase.
    coast: f64,
    /// Where the decaying phase ends; may be in the overscroll slack.
    rest: f64,
    /// Final position, always inside the bounds.
    target: f64,
    /// Length of the spring-back phase (zero if `rest == target`).
    spring: f64,
}

impl AxisFling {
    fn new(start: f64, velocity: f64, min: f64, max: f64, overscroll: f64) -> Self {
        let speed = velocity.abs();
        let (coast, rest) = if start < min || start > max || speed < MIN_FLING_SPEED {
            (0.0, start)
        } else {
            let coast = (speed / MIN_FLING_SPEED).ln() / FRICTION;
            let end = start + travel(velocity, coast);
            let limit = if velocity > 0.0 {
                max + overscroll
            } else {
                min - overscroll
            };
            if (velocity > 0.0 && end > limit) || (velocity < 0.0 && end < limit) {
                // Solve start + v/k * (1 - exp(-k t)) = limit for t.
                let remaining = 1.0 - (limit - start) * FRICTION / velocity;
                (-remaining.ln() / FRICTION, limit)
            } else {
                (coast, end)
            }
        };
        let target = rest.clamp(min, max);
        let spring = if rest == target {
            0.0
        } else {
            SPRING_BACK.as_secs_f64()
        };
        Self {
            start,
            velocity,
            coast,
            rest,
            target,
            spring,
        }
    }

    fn duration(&self) -> f64 {
        self.coast + self.spring
    }

    fn position(&self, t: f64) -> f64 {
        if t < self.coast {
            return self.start + travel(self.velocity, t);
        }
        let s = t - self.coast;
        if s >= self.spring {
            return self.target;
        }
        let u = 1.0 - s / self.spring;
        let eased = 1.0 - u * u * u;
        self.rest + (self.target - self.rest) * eased
    }
}

/// Distance covered `t` seconds into a fling at initial `velocity`.
fn travel(velocity: f64, t: f64) -> f64 {
    velocity / FRICTION * (1.0 - E.powf(-FRICTION * t))
}
