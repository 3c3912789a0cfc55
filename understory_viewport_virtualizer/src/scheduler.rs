// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-flight refresh scheduling.

use alloc::collections::VecDeque;
use core::cell::{Cell, RefCell};
use core::iter::FusedIterator;
use core::sync::atomic::{AtomicBool, Ordering};

use kurbo::Point;

/// What happens to offsets requested while a pass is running.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RefreshMode {
    /// Only the latest requested offset is kept; any number of requests made
    /// during a pass produce exactly one more pass.
    #[default]
    Drop,
    /// Every requested offset is kept and run in request order.
    Queued,
}

/// Coalesces refresh requests so at most one refresh runs at a time.
///
/// The caller that wins the gate gets a [`Passes`] iterator and runs one
/// refresh per yielded offset. Requests made while it is iterating (from
/// callbacks fired by the refresh itself, for example) return `None` and are
/// folded into the running iteration according to the [`RefreshMode`].
///
/// ```rust
/// use kurbo::Point;
/// use understory_viewport_virtualizer::RefreshScheduler;
///
/// let scheduler = RefreshScheduler::default();
/// let mut ran = Vec::new();
/// if let Some(passes) = scheduler.request(Point::new(0.0, 0.0)) {
///     for offset in passes {
///         ran.push(offset);
///         if offset.y == 0.0 {
///             // Re-entrant requests coalesce into one trailing pass.
///             assert!(scheduler.request(Point::new(0.0, 10.0)).is_none());
///             assert!(scheduler.request(Point::new(0.0, 20.0)).is_none());
///         }
///     }
/// }
/// assert_eq!(ran, [Point::new(0.0, 0.0), Point::new(0.0, 20.0)]);
/// assert!(scheduler.is_idle());
/// ```
#[derive(Debug)]
pub struct RefreshScheduler {
    mode: RefreshMode,
    // Set while no pass is in flight.
    idle: AtomicBool,
    // A pending offset doubles as the run-again flag.
    latest: Cell<Option<Point>>,
    queue: RefCell<VecDeque<Point>>,
    coalesced: Cell<u64>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(RefreshMode::default())
    }
}

impl RefreshScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(mode: RefreshMode) -> Self {
        Self {
            mode,
            idle: AtomicBool::new(true),
            latest: Cell::new(None),
            queue: RefCell::new(VecDeque::new()),
            coalesced: Cell::new(0),
        }
    }

    /// The mode.
    #[must_use]
    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Returns `true` if no pass is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Acquire)
    }

    /// Number of offsets waiting in [`RefreshMode::Queued`] mode.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Number of requests that found a pass in flight.
    #[must_use]
    pub fn coalesced(&self) -> u64 {
        self.coalesced.get()
    }

    /// Requests a refresh at `offset`.
    ///
    /// Returns the passes to run if no pass was in flight, or `None` if the
    /// request was folded into the pass already running.
    pub fn request(&self, offset: Point) -> Option<Passes<'_>> {
        match self.mode {
            RefreshMode::Drop => self.latest.set(Some(offset)),
            RefreshMode::Queued => self.queue.borrow_mut().push_back(offset),
        }
        if self.idle.swap(false, Ordering::AcqRel) {
            vtrace!(?offset, "RefreshScheduler::request: acquired");
            Some(Passes {
                scheduler: self,
                done: false,
            })
        } else {
            self.coalesced.set(self.coalesced.get() + 1);
            vtrace!(?offset, "RefreshScheduler::request: coalesced");
            None
        }
    }

    fn next_offset(&self) -> Option<Point> {
        match self.mode {
            // The first pass takes the offset that won the gate; later
            // passes run only if someone asked while the last one ran.
            RefreshMode::Drop => self.latest.take(),
            RefreshMode::Queued => self.queue.borrow_mut().pop_front(),
        }
    }

    fn open(&self) {
        self.idle.store(true, Ordering::Release);
    }
}

/// The passes owed to the caller that won a [`RefreshScheduler`] gate.
///
/// Yields one offset per refresh to run. The gate re-opens when the iterator
/// is exhausted or dropped; in [`RefreshMode::Drop`] mode any offset requested
/// but not yet yielded is discarded when dropped early.
#[derive(Debug)]
pub struct Passes<'a> {
    scheduler: &'a RefreshScheduler,
    done: bool,
}

impl Iterator for Passes<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        match self.scheduler.next_offset() {
            Some(p) => Some(p),
            None => {
                self.done = true;
                self.scheduler.open();
                None
            }
        }
    }
}

impl FusedIterator for Passes<'_> {}

impl Drop for Passes<'_> {
    fn drop(&mut self) {
        if !self.done {
            if self.scheduler.mode == RefreshMode::Drop {
                self.scheduler.latest.set(None);
            }
            self.scheduler.open();
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Point;

    use super::{RefreshMode, RefreshScheduler};

    fn p(y: f64) -> Point {
        Point::new(0.0, y)
    }

    #[test]
    fn idle_request_runs_once() {
        let s = RefreshScheduler::default();
        let ran: Vec<_> = s.request(p(1.0)).unwrap().collect();
        assert_eq!(ran, [p(1.0)]);
        assert!(s.is_idle());
        assert_eq!(s.coalesced(), 0);
    }

    #[test]
    fn drop_mode_coalesces_to_latest() {
        let s = RefreshScheduler::new(RefreshMode::Drop);
        let mut ran = Vec::new();
        for offset in s.request(p(1.0)).unwrap() {
            ran.push(offset);
            if ran.len() == 1 {
                for y in 2..=5 {
                    assert!(s.request(p(f64::from(y))).is_none());
                }
            }
        }
        assert_eq!(ran, [p(1.0), p(5.0)]);
        assert_eq!(s.coalesced(), 4);
        assert!(s.is_idle());
    }

    #[test]
    fn queued_mode_runs_every_offset_in_order() {
        let s = RefreshScheduler::new(RefreshMode::Queued);
        let mut ran = Vec::new();
        for offset in s.request(p(1.0)).unwrap() {
            ran.push(offset);
            if ran.len() == 1 {
                assert!(s.request(p(2.0)).is_none());
                assert!(s.request(p(3.0)).is_none());
                assert_eq!(s.queued(), 2);
            }
        }
        assert_eq!(ran, [p(1.0), p(2.0), p(3.0)]);
        assert_eq!(s.queued(), 0);
    }

    #[test]
    fn dropping_passes_reopens_the_gate() {
        let s = RefreshScheduler::default();
        let mut passes = s.request(p(1.0)).unwrap();
        assert_eq!(passes.next(), Some(p(1.0)));
        assert!(s.request(p(2.0)).is_none());
        drop(passes);
        assert!(s.is_idle());
        // The abandoned request does not leak into the next run.
        let ran: Vec<_> = s.request(p(3.0)).unwrap().collect();
        assert_eq!(ran, [p(3.0)]);
    }

    #[test]
    fn exhausted_passes_stay_exhausted() {
        let s = RefreshScheduler::default();
        let mut passes = s.request(p(1.0)).unwrap();
        assert_eq!(passes.next(), Some(p(1.0)));
        assert_eq!(passes.next(), None);
        // A new request now wins its own gate instead of reviving the old one.
        let fresh = s.request(p(2.0));
        assert!(fresh.is_some());
        assert_eq!(passes.next(), None);
        drop(fresh);
    }
}
