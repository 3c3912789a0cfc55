// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The incremental viewport virtualizer.

use alloc::vec::Vec;
use core::hash::Hash;

use kurbo::{Point, Rect};
use understory_grid_index::SpatialQuery;
use understory_render_pool::{FreePolicy, Placeable, RenderPool, SlotId};

use crate::bands::{contains, difference, overlaps};
use crate::config::{ConfigError, VirtualizerConfig};
use crate::locator::ItemLocator;
use crate::viewport::{ContentBoundsChanged, ViewportChanged, ViewportState};

/// How a refresh brought the displayed set up to date.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefreshPath {
    /// No usable previous rectangle: everything was released and the whole
    /// query rectangle was fetched.
    HardCut,
    /// Displayed objects were swept and only the delta bands were fetched.
    Incremental,
    /// After [`ViewportVirtualizer::invalidate`]: displayed objects were swept
    /// and the whole query rectangle was fetched.
    Full,
}

/// What a refresh did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RefreshReport {
    /// Path taken.
    pub path: RefreshPath,
    /// The query rectangle, which becomes the previous rectangle.
    pub rect: Rect,
    /// Render objects newly acquired from the pool.
    pub acquired: usize,
    /// Render objects released back to the pool.
    pub released: usize,
    /// Displayed objects kept and repositioned.
    pub repositioned: usize,
    /// Number of range queries issued against the source.
    pub queries: usize,
}

impl RefreshReport {
    fn new(path: RefreshPath, rect: Rect) -> Self {
        Self {
            path,
            rect,
            acquired: 0,
            released: 0,
            repositioned: 0,
            queries: 0,
        }
    }
}

/// Keeps exactly the items inside a moving viewport backed by render objects.
///
/// Each [`refresh`](ViewportVirtualizer::refresh) computes the query
/// rectangle `[x - look_ahead, y - look_ahead, x + width + look_ahead,
/// y + height + look_ahead]` from the viewport and compares it with the
/// rectangle of the previous refresh:
///
/// - No previous rectangle, or no overlap (closed intervals): **hard cut**.
///   Every displayed object is released and the whole rectangle is queried.
/// - Overlap: **incremental**. Displayed objects whose item still exists,
///   still has its key binding, and still lies in the new rectangle are
///   repositioned; the others are released. Then only the bands covering
///   `new \ previous` are queried. Sources that are not partitioned (where a
///   partial query costs as much as a full one) get one whole-rectangle query
///   instead.
/// - After [`invalidate`](ViewportVirtualizer::invalidate): **full**. Like
///   incremental, but the whole rectangle is queried.
///
/// Display coordinates are item coordinates minus the viewport offset.
///
/// The virtualizer does not own the source or the pool; both are passed to
/// every refresh. It keeps the set of slots it has acquired and nothing else.
/// Items added to or moved into the previously covered area are not picked up
/// by an incremental refresh; call [`invalidate`](ViewportVirtualizer::invalidate)
/// after such changes.
#[derive(Debug, Default)]
pub struct ViewportVirtualizer {
    viewport: ViewportState,
    previous: Option<Rect>,
    invalidated: bool,
    displayed: Vec<SlotId>,
    scratch: Vec<SlotId>,
}

impl ViewportVirtualizer {
    /// Creates a virtualizer with a zero-sized viewport at the origin.
    pub fn new(config: VirtualizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            viewport: ViewportState::new(config.look_ahead)?,
            previous: None,
            invalidated: false,
            displayed: Vec::new(),
            scratch: Vec::new(),
        })
    }

    /// The viewport.
    #[must_use]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// The viewport, mutably. Changes take effect on the next refresh.
    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    /// Applies a [`ViewportChanged`] event to the viewport.
    pub fn apply(&mut self, event: ViewportChanged) -> Result<(), ConfigError> {
        self.viewport.apply(event)
    }

    /// Records new content bounds, clamping the viewport offset into them.
    ///
    /// Non-finite or inverted bounds are rejected.
    pub fn set_content_bounds(&mut self, event: ContentBoundsChanged) -> Result<(), ConfigError> {
        self.viewport.apply_content_bounds(event)
    }

    /// The rectangle used by the last refresh.
    #[must_use]
    pub fn previous_rect(&self) -> Option<Rect> {
        self.previous
    }

    /// Slots currently displayed, in acquisition order.
    #[must_use]
    pub fn displayed(&self) -> &[SlotId] {
        &self.displayed
    }

    /// Makes the next refresh query the whole rectangle instead of bands.
    ///
    /// Call after store changes inside the current rectangle.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// Brings the displayed set up to date with the viewport.
    pub fn refresh<K, S, N, F, P>(
        &mut self,
        source: &S,
        pool: &mut RenderPool<K, N, F, P>,
    ) -> RefreshReport
    where
        K: Eq + Hash + Clone,
        S: SpatialQuery<K> + ItemLocator<K> + ?Sized,
        N: Placeable,
        F: FnMut() -> N,
        P: FreePolicy,
    {
        let rect = self.viewport.expanded_rect();
        let origin = self.viewport.offset();
        let path = match self.previous {
            Some(prev) if overlaps(rect, prev) => {
                if self.invalidated {
                    RefreshPath::Full
                } else {
                    RefreshPath::Incremental
                }
            }
            _ => RefreshPath::HardCut,
        };
        let mut report = RefreshReport::new(path, rect);

        match path {
            RefreshPath::HardCut => {
                report.released = self.release_displayed(pool);
                self.acquire(source, pool, rect, origin, &mut report);
            }
            RefreshPath::Full => {
                self.sweep(source, pool, rect, origin, &mut report);
                self.acquire(source, pool, rect, origin, &mut report);
            }
            RefreshPath::Incremental => {
                self.sweep(source, pool, rect, origin, &mut report);
                if source.is_partitioned() {
                    if let Some(prev) = self.previous {
                        for band in difference(rect, prev) {
                            self.acquire(source, pool, band, origin, &mut report);
                        }
                    }
                } else {
                    self.acquire(source, pool, rect, origin, &mut report);
                }
            }
        }

        self.previous = Some(rect);
        self.invalidated = false;
        vdebug!(
            ?report.path,
            acquired = report.acquired,
            released = report.released,
            repositioned = report.repositioned,
            queries = report.queries,
            displayed = self.displayed.len(),
            "ViewportVirtualizer::refresh"
        );
        report
    }

    /// Releases every displayed object and forgets the previous rectangle.
    ///
    /// Returns the number of objects released.
    pub fn release_all<K, N, F, P>(&mut self, pool: &mut RenderPool<K, N, F, P>) -> usize
    where
        K: Eq + Hash + Clone,
        N: Placeable,
        F: FnMut() -> N,
        P: FreePolicy,
    {
        self.previous = None;
        self.invalidated = false;
        self.release_displayed(pool)
    }

    fn release_displayed<K, N, F, P>(&mut self, pool: &mut RenderPool<K, N, F, P>) -> usize
    where
        K: Eq + Hash + Clone,
        N: Placeable,
        F: FnMut() -> N,
        P: FreePolicy,
    {
        let mut released = 0;
        for id in self.displayed.drain(..) {
            if release_one(pool, id) {
                released += 1;
            }
        }
        released
    }

    /// Repositions displayed objects that remain in `rect` and releases the rest.
    fn sweep<K, S, N, F, P>(
        &mut self,
        source: &S,
        pool: &mut RenderPool<K, N, F, P>,
        rect: Rect,
        origin: Point,
        report: &mut RefreshReport,
    ) where
        K: Eq + Hash + Clone,
        S: ItemLocator<K> + ?Sized,
        N: Placeable,
        F: FnMut() -> N,
        P: FreePolicy,
    {
        let mut marked = core::mem::take(&mut self.scratch);
        self.displayed.retain(|&id| {
            let at = pool
                .slot(id)
                .and_then(|s| s.bound_key())
                .and_then(|k| source.locate(k))
                .filter(|p| contains(rect, *p));
            match (at, pool.slot_mut(id)) {
                (Some(p), Some(slot)) => {
                    slot.node_mut().place(p - origin.to_vec2());
                    report.repositioned += 1;
                    true
                }
                _ => {
                    marked.push(id);
                    false
                }
            }
        });
        for id in marked.drain(..) {
            if release_one(pool, id) {
                report.released += 1;
            }
        }
        self.scratch = marked;
    }

    fn acquire<K, S, N, F, P>(
        &mut self,
        source: &S,
        pool: &mut RenderPool<K, N, F, P>,
        rect: Rect,
        origin: Point,
        report: &mut RefreshReport,
    ) where
        K: Eq + Hash + Clone,
        S: SpatialQuery<K> + ?Sized,
        N: Placeable,
        F: FnMut() -> N,
        P: FreePolicy,
    {
        report.queries += 1;
        let displayed = &mut self.displayed;
        source.visit_rect(rect, |item| {
            // Keys already displayed are refused by the pool.
            let Some(id) = pool.get(item.value.clone()) else {
                return;
            };
            if let Some(slot) = pool.slot_mut(id) {
                slot.node_mut().place(item.position() - origin.to_vec2());
            }
            displayed.push(id);
            report.acquired += 1;
        });
        vtrace!(?rect, acquired = report.acquired, "ViewportVirtualizer::acquire");
    }
}

fn release_one<K, N, F, P>(pool: &mut RenderPool<K, N, F, P>, id: SlotId) -> bool
where
    K: Eq + Hash + Clone,
    N: Placeable,
    F: FnMut() -> N,
    P: FreePolicy,
{
    if let Some(slot) = pool.slot_mut(id) {
        slot.node_mut().detach();
    }
    pool.release(id)
}
