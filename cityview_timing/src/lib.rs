// Copyright 2025 the Cityview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cityview Timing: a host-agnostic one-shot timer queue.
//!
//! [`TimerQueue`] stores payloads keyed by an absolute deadline. It never
//! reads a clock and never sleeps: the host event loop asks for
//! [`TimerQueue::next_deadline`], waits however it likes, and then drains
//! [`TimerQueue::pop_due`] with its own notion of "now". Time is a
//! [`Duration`] since an arbitrary, host-chosen epoch.
//!
//! Timers with equal deadlines fire in the order they were scheduled.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::time::Duration;
//! use cityview_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let now = Duration::ZERO;
//! timers.schedule_after(now, Duration::from_millis(100), "tick");
//! let blink = timers.schedule_after(now, Duration::from_millis(500), "blink");
//!
//! assert_eq!(timers.next_deadline(), Some(Duration::from_millis(100)));
//! assert!(timers.pop_due(Duration::from_millis(50)).is_none());
//!
//! let (_, payload) = timers.pop_due(Duration::from_millis(100)).unwrap();
//! assert_eq!(payload, "tick");
//!
//! assert_eq!(timers.cancel(blink), Some("blink"));
//! assert!(timers.is_empty());
//! ```
//!
//! This crate is `no_std` + `alloc`.

#![no_std]

extern crate alloc;

use alloc::collections::VecDeque;
use core::time::Duration;

/// Handle to a scheduled timer, usable with [`TimerQueue::cancel`].
///
/// Ids are unique for the lifetime of the queue that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    deadline: Duration,
    id: TimerId,
    payload: T,
}

/// One-shot timers ordered by `(deadline, scheduling order)`.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    entries: VecDeque<Entry<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Schedules `payload` to fire at the absolute time `deadline`.
    pub fn schedule_at(&mut self, deadline: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // Equal deadlines keep FIFO order: insert after every entry that is due
        // no later than this one.
        let at = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(
            at,
            Entry {
                deadline,
                id,
                payload,
            },
        );
        id
    }

    /// Schedules `payload` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, payload: T) -> TimerId {
        self.schedule_at(now.saturating_add(delay), payload)
    }

    /// Removes a pending timer, returning its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let at = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(at).map(|e| e.payload)
    }

    /// Removes all pending timers whose payload matches `pred`.
    ///
    /// Returns the number of timers removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.payload));
        before - self.entries.len()
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.front().map(|e| e.deadline)
    }

    /// Pops the earliest timer if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, T)> {
        if self.entries.front()?.deadline > now {
            return None;
        }
        self.entries.pop_front().map(|e| (e.id, e.payload))
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates pending payloads in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|e| &e.payload)
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
