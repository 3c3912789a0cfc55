// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element handles.

/// Identifier for an element in an [`ElementStore`](crate::ElementStore).
///
/// A small, copyable handle made of a slot index and a generation counter. It
/// stays stable while the element is repositioned and becomes stale once the
/// element is removed.
///
/// ## Semantics
///
/// - On add, a fresh slot is allocated with generation `1`.
/// - On removal the slot is freed and its generation incremented, so every
///   existing `ItemId` for it is stale.
/// - A reused slot hands out the incremented generation, producing a new,
///   distinct `ItemId`. Stale ids never alias a later element.
///
/// Use [`ElementStore::contains`](crate::ElementStore::contains) to check
/// liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}
