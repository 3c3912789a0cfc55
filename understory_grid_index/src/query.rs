// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only spatial query capability shared by index implementations.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::types::{Positioned, QueryStats};

/// Read-only rectangular range queries over positioned items.
///
/// Implemented by [`GridIndex`](crate::GridIndex) and
/// [`FlatIndex`](crate::FlatIndex), and by higher-level collections that wrap
/// them. Queries use closed intervals: an item lying exactly on an edge of the
/// query rectangle is reported.
pub trait SpatialQuery<T> {
    /// Visit every item whose position lies inside the closed rectangle
    /// spanned by `top_left` and `bottom_right`.
    ///
    /// Inverted or zero-area rectangles visit nothing.
    fn visit_range<F: FnMut(&Positioned<T>)>(
        &self,
        top_left: Point,
        bottom_right: Point,
        f: F,
    ) -> QueryStats;

    /// Visit every item.
    fn visit_all<F: FnMut(&Positioned<T>)>(&self, f: F);

    /// Number of stored items.
    fn len(&self) -> usize;

    /// Returns `true` if no items are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if range queries only scan the parts of the structure
    /// that overlap the query.
    ///
    /// Callers that diff successive queries (for example by querying only the
    /// newly exposed strip of a moving viewport) should fall back to whole
    /// queries when this is `false`, since a partial query costs the same as a
    /// full one.
    fn is_partitioned(&self) -> bool {
        true
    }

    /// Collect references to the items inside the closed rectangle, in the
    /// same order [`SpatialQuery::visit_range`] reports them.
    fn query_range(&self, top_left: Point, bottom_right: Point) -> Vec<&Positioned<T>>;

    /// Visit the items inside `rect`; convenience over [`SpatialQuery::visit_range`].
    fn visit_rect<F: FnMut(&Positioned<T>)>(&self, rect: Rect, f: F) -> QueryStats {
        self.visit_range(rect.origin(), Point::new(rect.x1, rect.y1), f)
    }
}
