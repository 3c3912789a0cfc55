// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector index with linear scans. Small and simple; good for tiny sets
//! and as a reference for the grid.

use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::error::InsertError;
use crate::query::SpatialQuery;
use crate::types::{Positioned, QueryStats, contains_closed};

/// Flat vector index with linear scans.
///
/// Every range query tests every item, so it reports
/// [`is_partitioned`](SpatialQuery::is_partitioned) as `false`.
pub struct FlatIndex<T> {
    entries: Vec<Positioned<T>>,
}

impl<T> Default for FlatIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Debug for FlatIndex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatIndex")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<T> FlatIndex<T> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item.
    pub fn insert(&mut self, item: Positioned<T>) -> Result<(), InsertError> {
        if !(item.x.is_finite() && item.y.is_finite() && item.x >= 0.0 && item.y >= 0.0) {
            return Err(InsertError::OutOfDomain {
                x: item.x,
                y: item.y,
            });
        }
        self.entries.push(item);
        Ok(())
    }

    /// Removes the first entry equal to `item`.
    pub fn remove(&mut self, item: &Positioned<T>) -> Option<Positioned<T>>
    where
        T: PartialEq,
    {
        let idx = self.entries.iter().position(|e| e == item)?;
        Some(self.entries.remove(idx))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Positioned<T>> + '_ {
        self.entries.iter()
    }
}

impl<T> SpatialQuery<T> for FlatIndex<T> {
    fn visit_range<F: FnMut(&Positioned<T>)>(
        &self,
        top_left: Point,
        bottom_right: Point,
        mut f: F,
    ) -> QueryStats {
        let mut stats = QueryStats::default();
        if !(top_left.x < bottom_right.x && top_left.y < bottom_right.y) {
            stats.rejected = true;
            return stats;
        }
        let rect = Rect::from_points(top_left, bottom_right);
        for e in &self.entries {
            stats.items_tested += 1;
            if contains_closed(rect, e.x, e.y) {
                stats.items_visited += 1;
                f(e);
            }
        }
        stats
    }

    fn visit_all<F: FnMut(&Positioned<T>)>(&self, f: F) {
        self.entries.iter().for_each(f);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_partitioned(&self) -> bool {
        false
    }

    fn query_range(&self, top_left: Point, bottom_right: Point) -> Vec<&Positioned<T>> {
        if !(top_left.x < bottom_right.x && top_left.y < bottom_right.y) {
            return Vec::new();
        }
        let rect = Rect::from_points(top_left, bottom_right);
        self.entries
            .iter()
            .filter(|e| contains_closed(rect, e.x, e.y))
            .collect()
    }
}
