// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resizable bucket grid.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::sync::atomic::{AtomicUsize, Ordering};

use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::config::GridConfig;
use crate::cursor::Cursor;
use crate::error::{ConfigError, InsertError};
use crate::query::SpatialQuery;
use crate::types::{Axis, BucketCoord, Positioned, QueryStats, contains_closed};

/// Items held inline per bucket before spilling to the heap.
const BUCKET_INLINE: usize = 4;

pub(crate) type Bucket<T> = SmallVec<[Positioned<T>; BUCKET_INLINE]>;

/// Outcome of growing one axis in [`GridIndex::ensure_capacity`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AxisGrowth {
    /// The axis already covered the requested extent.
    Unchanged,
    /// The bucket range (cell size) was stretched; bucket count unchanged.
    Range,
    /// Buckets were added; the bucket range is unchanged.
    Buckets,
    /// Buckets were added up to the configured maximum and the range was
    /// stretched to cover the remainder.
    BucketsCapped,
}

/// Result of [`GridIndex::ensure_capacity`], one entry per axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resize {
    /// Growth applied along x (rows).
    pub x: AxisGrowth,
    /// Growth applied along y (columns).
    pub y: AxisGrowth,
}

impl Resize {
    /// Returns `true` if either axis changed.
    #[must_use]
    pub fn changed(self) -> bool {
        self.x != AxisGrowth::Unchanged || self.y != AxisGrowth::Unchanged
    }

    /// Returns the growth applied to `axis`.
    #[must_use]
    pub fn axis(self, axis: Axis) -> AxisGrowth {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Layout of one axis: bucket count and covered extent.
#[derive(Copy, Clone, Debug, PartialEq)]
struct AxisLayout {
    count: usize,
    extent: f64,
}

impl AxisLayout {
    fn range(self) -> f64 {
        self.extent / self.count as f64
    }

    /// Bucket index of `v`, closed at the upper bound.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "coordinates are finite and non-negative, truncation is the floor"
    )]
    fn bucket(self, v: f64) -> usize {
        if v <= 0.0 {
            return 0;
        }
        let idx = (v / self.extent * self.count as f64) as usize;
        idx.min(self.count - 1)
    }

    /// Grows the layout so that it covers `extent`.
    fn grow(&mut self, extent: f64, max_count: usize, max_growth: f64) -> AxisGrowth {
        if extent <= self.extent {
            return AxisGrowth::Unchanged;
        }
        let range = self.range();
        if self.count >= max_count || extent / self.count as f64 <= range * max_growth {
            self.extent = extent;
            return AxisGrowth::Range;
        }
        let wanted = ceil_to_usize(extent / range);
        if wanted <= max_count {
            self.count = wanted;
            self.extent = wanted as f64 * range;
            AxisGrowth::Buckets
        } else {
            self.count = max_count;
            self.extent = extent;
            AxisGrowth::BucketsCapped
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "callers pass finite, positive ratios"
)]
fn ceil_to_usize(v: f64) -> usize {
    let floor = v as usize;
    if (floor as f64) < v { floor + 1 } else { floor }
}

fn in_domain(x: f64, y: f64) -> bool {
    x.is_finite() && y.is_finite() && x >= 0.0 && y >= 0.0
}

/// A resizable grid of buckets over positioned items.
///
/// The grid covers `[0, width] x [0, height]`. Rows subdivide the x axis and
/// columns subdivide the y axis; an item at `(x, y)` lives in bucket
/// `(floor(x / width * rows), floor(y / height * cols))`, with coordinates equal
/// to the bound falling into the last bucket. Buckets keep their items in
/// insertion order.
///
/// Inserting beyond the current extent grows the grid (see
/// [`GridIndex::ensure_capacity`]); the grid never shrinks except through
/// [`GridIndex::reset`].
///
/// Every structural change (insert, remove, resize, clear) bumps a
/// modification counter that detached [`Cursor`]s use to fail fast.
///
/// # Example
///
/// ```rust
/// use kurbo::Point;
/// use understory_grid_index::{BucketCoord, GridIndex, Positioned, SpatialQuery};
///
/// let mut grid = GridIndex::default();
/// grid.insert(Positioned::new("a", 150.0, 150.0)).unwrap();
/// grid.insert(Positioned::new("b", 950.0, 50.0)).unwrap();
///
/// assert_eq!(grid.bucket_of(150.0, 150.0), BucketCoord::new(0, 0));
/// assert_eq!(grid.bucket_of(950.0, 50.0), BucketCoord::new(4, 0));
///
/// let hits = grid.query_range(Point::new(100.0, 100.0), Point::new(300.0, 300.0));
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].value, "a");
/// ```
pub struct GridIndex<T> {
    config: GridConfig,
    rows: AxisLayout,
    cols: AxisLayout,
    /// Row-major: bucket `(row, col)` lives at `row * cols + col`.
    buckets: Vec<Bucket<T>>,
    len: usize,
    modifications: u64,
    /// Distinguishes grids so cursors reject foreign ones.
    id: usize,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

impl<T> Default for GridIndex<T> {
    fn default() -> Self {
        Self::with_valid_config(GridConfig::default())
    }
}

impl<T> Debug for GridIndex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.buckets.iter().filter(|b| !b.is_empty()).count();
        f.debug_struct("GridIndex")
            .field("rows", &self.rows.count)
            .field("cols", &self.cols.count)
            .field("width", &self.rows.extent)
            .field("height", &self.cols.extent)
            .field("len", &self.len)
            .field("occupied_buckets", &occupied)
            .field("modifications", &self.modifications)
            .finish_non_exhaustive()
    }
}

impl<T> GridIndex<T> {
    /// Creates an empty grid, validating `config`.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: GridConfig) -> Self {
        let rows = AxisLayout {
            count: config.initial_rows,
            extent: config.initial_extent.width,
        };
        let cols = AxisLayout {
            count: config.initial_cols,
            extent: config.initial_extent.height,
        };
        let mut buckets = Vec::new();
        buckets.resize_with(rows.count * cols.count, SmallVec::new);
        Self {
            config,
            rows,
            cols,
            buckets,
            len: 0,
            modifications: 0,
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Returns the configuration the grid was built with.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Returns the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the covered extent, `[0, width] x [0, height]`.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.rows.extent, self.cols.extent)
    }

    /// Returns the current bucket counts as `(rows, cols)`.
    #[must_use]
    pub fn bucket_dims(&self) -> (usize, usize) {
        (self.rows.count, self.cols.count)
    }

    /// Returns the current bucket range (cell size) on each axis.
    #[must_use]
    pub fn bucket_ranges(&self) -> Size {
        Size::new(self.rows.range(), self.cols.range())
    }

    /// Returns the current modification count.
    ///
    /// The count increases on every structural change and never decreases.
    #[must_use]
    pub fn modification_count(&self) -> u64 {
        self.modifications
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Returns the address of the bucket that holds position `(x, y)`.
    ///
    /// Coordinates beyond the bounds are clamped to the last bucket.
    #[must_use]
    pub fn bucket_of(&self, x: f64, y: f64) -> BucketCoord {
        BucketCoord::new(self.rows.bucket(x), self.cols.bucket(y))
    }

    /// Returns the items stored in a bucket, in insertion order.
    #[must_use]
    pub fn bucket(&self, coord: BucketCoord) -> &[Positioned<T>] {
        if coord.row >= self.rows.count || coord.col >= self.cols.count {
            return &[];
        }
        &self.buckets[self.slot(coord)]
    }

    #[inline]
    fn slot(&self, coord: BucketCoord) -> usize {
        coord.row * self.cols.count + coord.col
    }

    #[inline]
    fn slot_of(&self, x: f64, y: f64) -> usize {
        self.slot(self.bucket_of(x, y))
    }

    /// Inserts an item into its bucket, growing the grid first if the item
    /// lies beyond the current extent.
    pub fn insert(&mut self, item: Positioned<T>) -> Result<(), InsertError> {
        if !in_domain(item.x, item.y) {
            return Err(InsertError::OutOfDomain {
                x: item.x,
                y: item.y,
            });
        }
        if item.x > self.rows.extent || item.y > self.cols.extent {
            self.ensure_capacity(item.x, item.y);
        }
        let slot = self.slot_of(item.x, item.y);
        self.buckets[slot].push(item);
        self.len += 1;
        self.modifications += 1;
        Ok(())
    }

    /// Removes the first entry equal to `item` (value and position).
    ///
    /// Only the bucket addressed by the item's position is scanned.
    pub fn remove(&mut self, item: &Positioned<T>) -> Option<Positioned<T>>
    where
        T: PartialEq,
    {
        self.remove_matching(item.x, item.y, |e| e == item)
    }

    /// Removes the first entry at `(x, y)` for which `pred` holds.
    pub fn remove_matching<P>(&mut self, x: f64, y: f64, mut pred: P) -> Option<Positioned<T>>
    where
        P: FnMut(&Positioned<T>) -> bool,
    {
        if !in_domain(x, y) {
            return None;
        }
        let slot = self.slot_of(x, y);
        let pos = self.buckets[slot].iter().position(|e| pred(e))?;
        Some(self.remove_at_slot(slot, pos))
    }

    pub(crate) fn remove_at_slot(&mut self, slot: usize, pos: usize) -> Positioned<T> {
        let removed = self.buckets[slot].remove(pos);
        self.len -= 1;
        self.modifications += 1;
        removed
    }

    /// Moves an existing entry to a new position.
    ///
    /// Returns `Ok(false)` if no entry equal to `item` exists. The grid grows
    /// if the new position lies beyond the current extent.
    pub fn reposition(&mut self, item: &Positioned<T>, to: Point) -> Result<bool, InsertError>
    where
        T: PartialEq,
    {
        if !in_domain(to.x, to.y) {
            return Err(InsertError::OutOfDomain { x: to.x, y: to.y });
        }
        let Some(mut moved) = self.remove(item) else {
            return Ok(false);
        };
        moved.x = to.x;
        moved.y = to.y;
        self.insert(moved)?;
        Ok(true)
    }

    /// Grows the grid so that it covers `[0, width] x [0, height]`.
    ///
    /// Each axis is grown independently:
    ///
    /// - If the axis already holds its maximum bucket count, or if stretching
    ///   the bucket range to cover the new extent stays within
    ///   `range * max_range_growth`, the range is stretched and the bucket
    ///   count is unchanged.
    /// - Otherwise buckets of the current range are added until the extent is
    ///   covered. If that would exceed the maximum count, the count stops at
    ///   the maximum and the range is stretched to cover the rest.
    ///
    /// Any change relocates every stored item: O(n). Requests that do not
    /// exceed the current extent are no-ops.
    pub fn ensure_capacity(&mut self, width: f64, height: f64) -> Resize {
        let mut rows = self.rows;
        let mut cols = self.cols;
        let resize = Resize {
            x: rows.grow(width, self.config.max_rows, self.config.max_range_growth),
            y: cols.grow(height, self.config.max_cols, self.config.max_range_growth),
        };
        if !resize.changed() {
            return resize;
        }
        gdebug!(
            ?resize,
            rows = rows.count,
            cols = cols.count,
            width = rows.extent,
            height = cols.extent,
            items = self.len,
            "GridIndex::ensure_capacity"
        );
        self.relayout(rows, cols);
        resize
    }

    fn relayout(&mut self, rows: AxisLayout, cols: AxisLayout) {
        let old = core::mem::take(&mut self.buckets);
        self.rows = rows;
        self.cols = cols;
        self.buckets.resize_with(rows.count * cols.count, SmallVec::new);
        for bucket in old {
            for item in bucket {
                let slot = self.slot_of(item.x, item.y);
                self.buckets[slot].push(item);
            }
        }
        self.modifications += 1;
    }

    /// Removes every item, keeping the current layout.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
        self.modifications += 1;
    }

    /// Removes every item and restores the initial layout.
    pub fn reset(&mut self) {
        let rows = AxisLayout {
            count: self.config.initial_rows,
            extent: self.config.initial_extent.width,
        };
        let cols = AxisLayout {
            count: self.config.initial_cols,
            extent: self.config.initial_extent.height,
        };
        self.buckets.clear();
        self.len = 0;
        self.relayout(rows, cols);
    }

    /// Iterates over every item: buckets in row-major order, items within a
    /// bucket in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Positioned<T>> + '_ {
        self.buckets.iter().flat_map(|b| b.iter())
    }

    /// Creates a detached, fail-fast [`Cursor`] positioned before the first item.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.id, self.modifications)
    }

    pub(crate) fn bucket_slots(&self) -> &[Bucket<T>] {
        &self.buckets
    }

    /// Visits the items in `rect`, splitting buckets into tested boundary
    /// buckets and wholesale interior buckets.
    fn visit_rect_split<'a, F>(&'a self, rect: Rect, mut f: F) -> QueryStats
    where
        F: FnMut(&'a Positioned<T>),
    {
        let mut stats = QueryStats::default();
        let bounds = self.bounds();
        if !(rect.x0 < rect.x1 && rect.y0 < rect.y1)
            || rect.x1 < 0.0
            || rect.y1 < 0.0
            || rect.x0 > bounds.x1
            || rect.y0 > bounds.y1
        {
            stats.rejected = true;
            gtrace!(?rect, "GridIndex::visit_range rejected");
            return stats;
        }
        if rect.x0 <= 0.0 && rect.y0 <= 0.0 && rect.x1 >= bounds.x1 && rect.y1 >= bounds.y1 {
            stats.full_cover = true;
            for item in self.iter() {
                f(item);
            }
            stats.items_visited = self.len;
            stats.bulk_buckets = self.buckets.len();
            return stats;
        }

        let min = self.bucket_of(rect.x0.max(0.0), rect.y0.max(0.0));
        let max = self.bucket_of(rect.x1, rect.y1);
        for row in min.row..=max.row {
            let row_edge = row == min.row || row == max.row;
            for col in min.col..=max.col {
                let bucket = &self.buckets[self.slot(BucketCoord::new(row, col))];
                if row_edge || col == min.col || col == max.col {
                    stats.tested_buckets += 1;
                    for item in bucket {
                        stats.items_tested += 1;
                        if contains_closed(rect, item.x, item.y) {
                            stats.items_visited += 1;
                            f(item);
                        }
                    }
                } else {
                    stats.bulk_buckets += 1;
                    stats.items_visited += bucket.len();
                    for item in bucket {
                        f(item);
                    }
                }
            }
        }
        stats
    }
}

impl<T> SpatialQuery<T> for GridIndex<T> {
    fn visit_range<F: FnMut(&Positioned<T>)>(
        &self,
        top_left: Point,
        bottom_right: Point,
        f: F,
    ) -> QueryStats {
        self.visit_rect_split(
            Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y),
            f,
        )
    }

    fn visit_all<F: FnMut(&Positioned<T>)>(&self, f: F) {
        self.iter().for_each(f);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn query_range(&self, top_left: Point, bottom_right: Point) -> Vec<&Positioned<T>> {
        let mut out = Vec::new();
        self.visit_rect_split(
            Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y),
            |item| out.push(item),
        );
        out
    }
}
