// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blink cycle for unpowered tiles.
//!
//! Draw passes are the producer: each unpowered tile found while drawing is
//! noted as a candidate. Toggles are the consumer: a toggle flips the phase
//! and drains the candidates so the owner can redraw exactly those cells.
//! The cycle stops itself: nothing is scheduled while no candidate exists,
//! and the next draw pass that finds one schedules a toggle again.

use alloc::vec::Vec;

use hashbrown::HashSet;

use cityview_view2d::GridLocation;

/// Phase and pending set of the blink cycle.
#[derive(Clone, Debug, Default)]
pub struct BlinkScheduler {
    pending: HashSet<GridLocation>,
    phase: bool,
    scheduled: bool,
}

impl BlinkScheduler {
    /// Creates an idle scheduler in the "off" phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an unpowered tile found during the current draw pass.
    pub fn note_candidate(&mut self, loc: GridLocation) {
        self.pending.insert(loc);
    }

    /// Current phase. When `true`, unpowered tiles show their alternate glyph.
    #[must_use]
    pub fn phase(&self) -> bool {
        self.phase
    }

    /// Ends a draw pass.
    ///
    /// Returns `true` when the caller must schedule a toggle: there is at
    /// least one candidate and no toggle is pending yet.
    pub fn end_pass(&mut self) -> bool {
        if self.pending.is_empty() || self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Fires a scheduled toggle: flips the phase and returns the cells that
    /// need redrawing, leaving the pending set empty.
    pub fn toggle(&mut self) -> Vec<GridLocation> {
        self.scheduled = false;
        self.phase = !self.phase;
        self.pending.drain().collect()
    }

    /// Returns `true` while a toggle is pending.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Number of candidates noted since the last toggle.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use cityview_view2d::GridLocation;

    use super::BlinkScheduler;

    #[test]
    fn empty_pass_schedules_nothing() {
        let mut b = BlinkScheduler::new();
        assert!(!b.end_pass());
        assert!(!b.is_scheduled());
    }

    #[test]
    fn never_schedules_twice() {
        let mut b = BlinkScheduler::new();
        b.note_candidate(GridLocation::new(1, 2));
        assert!(b.end_pass());
        b.note_candidate(GridLocation::new(3, 4));
        assert!(!b.end_pass(), "a toggle is already pending");
        assert!(b.is_scheduled());
    }

    #[test]
    fn toggle_flips_phase_and_drains() {
        let mut b = BlinkScheduler::new();
        b.note_candidate(GridLocation::new(1, 2));
        b.note_candidate(GridLocation::new(1, 2));
        b.note_candidate(GridLocation::new(5, 5));
        assert_eq!(b.pending_len(), 2, "duplicates collapse");
        assert!(b.end_pass());

        let mut cells = b.toggle();
        cells.sort_by_key(|l| (l.x, l.y));
        assert_eq!(cells, [GridLocation::new(1, 2), GridLocation::new(5, 5)]);
        assert!(b.phase());
        assert!(!b.is_scheduled());
        assert_eq!(b.pending_len(), 0);
    }

    #[test]
    fn cycle_stops_when_everything_is_powered() {
        let mut b = BlinkScheduler::new();
        b.note_candidate(GridLocation::new(0, 0));
        assert!(b.end_pass());
        b.toggle();
        // The redraw pass finds nothing unpowered.
        assert!(!b.end_pass());
        assert!(!b.is_scheduled());
    }
}
