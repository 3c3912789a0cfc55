// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot handles and the render objects they hold.

use kurbo::Point;

/// Identifier for a slot in a [`RenderPool`](crate::RenderPool).
///
/// A slot index plus a generation counter. The id stays valid across any
/// number of Free ↔ `InUse` cycles and becomes stale when the slot is evicted
/// or cleared; a stale id never aliases a newer slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SlotId(pub(crate) u32, pub(crate) u32);

impl SlotId {
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

/// Lifecycle state of a slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Pooled and available for reuse.
    Free,
    /// Bound to a key and handed out.
    InUse,
    /// Dropped by the pool. Terminal; also reported for unknown ids.
    Evicted,
}

/// A render object that can be positioned in display space.
pub trait Placeable {
    /// Moves the object to `at`, in display coordinates.
    fn place(&mut self, at: Point);

    /// Takes the object out of the display. Called when it stops showing an item.
    fn detach(&mut self) {}
}

/// One pooled render object and the key it is bound to.
#[derive(Debug)]
pub struct RenderSlot<N, K> {
    node: N,
    key: Option<K>,
}

impl<N, K> RenderSlot<N, K> {
    pub(crate) fn new(node: N) -> Self {
        Self { node, key: None }
    }

    /// The render object.
    #[must_use]
    pub fn node(&self) -> &N {
        &self.node
    }

    /// The render object, mutably.
    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    /// The key this slot is currently bound to.
    #[must_use]
    pub fn bound_key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Rebinds the slot to `key`, returning the previous binding.
    ///
    /// The pool's key index is not updated; a slot rebound or cleared while in
    /// use is still released correctly.
    pub fn set_bound_key(&mut self, key: K) -> Option<K> {
        self.key.replace(key)
    }

    /// Clears the binding, returning the previous key.
    pub fn clear_binding(&mut self) -> Option<K> {
        self.key.take()
    }

    /// Returns `true` if the slot is bound to a key.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }
}
