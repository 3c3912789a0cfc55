// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public value types: positioned items, bucket coordinates, and query statistics.

use kurbo::{Point, Rect};

/// A value together with its 2D position.
///
/// Equality compares the value *and* both coordinates, so two entries holding
/// the same value at different positions are distinct.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Positioned<T> {
    /// The application value stored in the index.
    pub value: T,
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl<T> Positioned<T> {
    /// Creates a new positioned item.
    #[must_use]
    pub const fn new(value: T, x: f64, y: f64) -> Self {
        Self { value, x, y }
    }

    /// Creates a positioned item from a [`Point`].
    #[must_use]
    pub const fn at(value: T, position: Point) -> Self {
        Self::new(value, position.x, position.y)
    }

    /// Returns the position as a [`Point`].
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns `true` if the position lies inside the closed rectangle.
    ///
    /// Points on any edge of `rect` count as contained.
    #[must_use]
    pub fn is_within(&self, rect: Rect) -> bool {
        contains_closed(rect, self.x, self.y)
    }
}

/// Closed-interval containment shared by every query path.
#[inline]
pub(crate) fn contains_closed(rect: Rect, x: f64, y: f64) -> bool {
    rect.x0 <= x && x <= rect.x1 && rect.y0 <= y && y <= rect.y1
}

/// One of the two grid axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis, addressed by bucket rows.
    X,
    /// Vertical axis, addressed by bucket columns.
    Y,
}

/// Address of a bucket in the grid.
///
/// `row` is derived from the x coordinate and `col` from the y coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BucketCoord {
    /// Bucket index along the x axis.
    pub row: usize,
    /// Bucket index along the y axis.
    pub col: usize,
}

impl BucketCoord {
    /// Creates a bucket coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// How a range query was answered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// The query was rejected without scanning (inverted, empty, or outside the bounds).
    pub rejected: bool,
    /// The query covered the whole index and every item was returned without testing.
    pub full_cover: bool,
    /// Boundary buckets whose items were tested one by one.
    pub tested_buckets: usize,
    /// Interior buckets appended wholesale.
    pub bulk_buckets: usize,
    /// Number of per-item containment tests performed.
    pub items_tested: usize,
    /// Number of items reported to the visitor.
    pub items_visited: usize,
}
