// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications.

use core::fmt;

use kurbo::{Point, Rect};

use crate::bounds::span;
use crate::id::ItemId;
use crate::store::ElementStore;

/// What happened to the affected elements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Elements were added.
    Addition,
    /// Elements were removed. Their ids are already stale.
    Removal,
    /// Elements were repositioned.
    Move,
}

/// One element touched by a change.
#[derive(Debug)]
pub struct Affected<'a, T> {
    /// Handle of the element. Stale for [`ChangeKind::Removal`].
    pub id: ItemId,
    /// The element's value.
    pub value: &'a T,
    /// Position after the change; for removals, the position it was removed from.
    pub position: Point,
    /// Position before the change, set for [`ChangeKind::Move`] only.
    pub previous: Option<Point>,
}

impl<T> Clone for Affected<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Affected<'_, T> {}

/// A change notification delivered to store listeners.
///
/// Listeners only see a shared reference to the store, so they cannot mutate
/// it while the notification is being delivered.
pub struct ChangeEvent<'a, T> {
    store: &'a ElementStore<T>,
    kind: ChangeKind,
    items: &'a [Affected<'a, T>],
    bounds: Rect,
}

impl<T> fmt::Debug for ChangeEvent<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEvent")
            .field("kind", &self.kind)
            .field("items", &self.items.len())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<'a, T> ChangeEvent<'a, T> {
    pub(crate) fn new(
        store: &'a ElementStore<T>,
        kind: ChangeKind,
        items: &'a [Affected<'a, T>],
    ) -> Self {
        Self {
            store,
            kind,
            items,
            bounds: span(items.iter().map(|a| a.position)),
        }
    }

    /// The store that changed, in its post-change state.
    #[must_use]
    pub fn store(&self) -> &'a ElementStore<T> {
        self.store
    }

    /// The kind of change.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// The affected elements, in the order the change applied them.
    #[must_use]
    pub fn items(&self) -> &'a [Affected<'a, T>] {
        self.items
    }

    /// The tight rectangle spanning the affected positions.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}
