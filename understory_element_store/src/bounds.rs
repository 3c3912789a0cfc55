// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy bookkeeping for the tight bounding box of all element positions.

use core::cell::Cell;

use kurbo::{Point, Rect};

/// Tracks content bounds, deferring the O(n) recomputation until an element
/// on the current boundary moves away or is removed.
#[derive(Debug)]
pub(crate) struct BoundsTracker {
    rect: Cell<Rect>,
    stale: Cell<bool>,
}

impl Default for BoundsTracker {
    fn default() -> Self {
        Self {
            rect: Cell::new(Rect::ZERO),
            stale: Cell::new(false),
        }
    }
}

impl BoundsTracker {
    /// Accounts for a position that just became occupied.
    ///
    /// `first` is set when the store was empty before this position was added.
    pub(crate) fn include(&mut self, p: Point, first: bool) {
        if first {
            self.rect.set(Rect::from_points(p, p));
            self.stale.set(false);
        } else if !self.stale.get() {
            self.rect.set(self.rect.get().union_pt(p));
        }
    }

    /// Accounts for a position that was just vacated.
    ///
    /// Interior positions cannot shrink the box, so only boundary hits mark
    /// the bounds for recomputation.
    pub(crate) fn vacate(&mut self, p: Point) {
        if self.stale.get() {
            return;
        }
        let r = self.rect.get();
        if p.x == r.x0 || p.x == r.x1 || p.y == r.y0 || p.y == r.y1 {
            self.stale.set(true);
        }
    }

    /// Unconditionally resets the bounds to zero.
    pub(crate) fn reset(&mut self) {
        self.rect.set(Rect::ZERO);
        self.stale.set(false);
    }

    /// Returns `true` if the next read recomputes.
    #[cfg(test)]
    pub(crate) fn is_stale(&self) -> bool {
        self.stale.get()
    }

    /// Returns the bounds, recomputing them from `positions` if stale.
    pub(crate) fn get<I>(&self, positions: impl FnOnce() -> I) -> Rect
    where
        I: Iterator<Item = Point>,
    {
        if self.stale.get() {
            self.rect.set(span(positions()));
            self.stale.set(false);
        }
        self.rect.get()
    }
}

/// Tight bounding box of `points`, or [`Rect::ZERO`] if there are none.
pub(crate) fn span(mut points: impl Iterator<Item = Point>) -> Rect {
    let Some(first) = points.next() else {
        return Rect::ZERO;
    };
    points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p))
}
