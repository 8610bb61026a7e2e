// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw requests accumulated for the renderer.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

/// One redraw request, in view pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Redraw {
    /// Repaint the whole surface.
    Full,
    /// Repaint one rectangle, already rounded outward to whole pixels.
    Region(Rect),
}

/// Pending redraws since the renderer last drained the queue.
///
/// A full redraw supersedes every region: once one is queued, regions are
/// dropped until the queue is drained. Regions may overlap and are not
/// merged.
#[derive(Clone, Debug, Default)]
pub struct RedrawQueue {
    full: bool,
    regions: Vec<Rect>,
}

impl RedrawQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a full redraw.
    pub fn push_full(&mut self) {
        self.full = true;
        self.regions.clear();
    }

    /// Requests a redraw of `rect`. Empty rectangles are ignored.
    pub fn push_region(&mut self, rect: Rect) {
        if self.full || rect.is_zero_area() {
            return;
        }
        self.regions.push(rect);
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.full && self.regions.is_empty()
    }

    /// Returns `true` if a full redraw is pending.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Returns the union of all pending regions, or `None` if there are none.
    ///
    /// Ignores a pending full redraw.
    #[must_use]
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.regions.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Drains the queue in request order.
    pub fn take(&mut self) -> Vec<Redraw> {
        if core::mem::take(&mut self.full) {
            self.regions.clear();
            return vec![Redraw::Full];
        }
        self.regions.drain(..).map(Redraw::Region).collect()
    }
}
