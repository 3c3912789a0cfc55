// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The keyed render-object pool.

use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::policy::{FreePolicy, Retain};
use crate::slot::{RenderSlot, SlotId, SlotState};

struct Entry<N, K> {
    generation: u32,
    slot: Option<RenderSlot<N, K>>,
    in_use: bool,
}

/// Counters describing how a pool satisfied requests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Render objects built by the factory.
    pub created: usize,
    /// Requests served from a Free slot.
    pub reused: usize,
    /// Slots dropped by the policy or by [`RenderPool::clear`].
    pub evicted: usize,
    /// Ids handed back by the policy that were no longer Free.
    pub misses: usize,
}

/// A pool of reusable render objects, keyed by the item each one shows.
///
/// At most one slot is `InUse` per key at any time. A request for a key that
/// is not in use takes the policy's preferred Free slot, or builds a new
/// render object with the factory. Released slots go back to the policy,
/// which decides how long they are retained.
///
/// Slots are addressed by [`SlotId`]; the render object and its binding are
/// reached through [`RenderPool::slot`] and [`RenderPool::slot_mut`].
///
/// # Example
///
/// ```rust
/// use understory_render_pool::{RenderPool, SlotState};
///
/// let mut pool = RenderPool::new(|| String::from("node"));
///
/// let a = pool.get("a").unwrap();
/// // Only one live object per key.
/// assert!(pool.get("a").is_none());
///
/// assert!(pool.release(a));
/// assert_eq!(pool.state(a), SlotState::Free);
///
/// // The freed slot is reused for another key.
/// let b = pool.get("b").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(pool.slot(b).unwrap().bound_key(), Some(&"b"));
/// assert_eq!(pool.stats().created, 1);
/// ```
pub struct RenderPool<K, N, F, P = Retain> {
    entries: Vec<Entry<N, K>>,
    /// Storage indices of evicted entries, reused for new slots.
    vacant: Vec<u32>,
    in_use: HashMap<K, SlotId>,
    policy: P,
    factory: F,
    stats: PoolStats,
    scratch: Vec<SlotId>,
}

impl<K, N, F, P: FreePolicy> fmt::Debug for RenderPool<K, N, F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPool")
            .field("in_use", &self.in_use.len())
            .field("free", &self.policy.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<K, N, F> RenderPool<K, N, F, Retain>
where
    K: Eq + Hash + Clone,
    F: FnMut() -> N,
{
    /// Creates a pool that retains every Free slot.
    pub fn new(factory: F) -> Self {
        Self::with_policy(factory, Retain::default())
    }
}

impl<K, N, F, P> RenderPool<K, N, F, P>
where
    K: Eq + Hash + Clone,
    F: FnMut() -> N,
    P: FreePolicy,
{
    /// Creates a pool with an explicit free-list policy.
    pub fn with_policy(factory: F, policy: P) -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
            in_use: HashMap::new(),
            policy,
            factory,
            stats: PoolStats::default(),
            scratch: Vec::new(),
        }
    }

    /// Total number of live slots, Free plus `InUse`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_use.len() + self.policy.len()
    }

    /// Returns `true` if the pool holds no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `InUse` slots.
    #[must_use]
    pub fn in_use_len(&self) -> usize {
        self.in_use.len()
    }

    /// Number of Free slots, without sweeping first.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.policy.len()
    }

    /// Sweeps, then returns the number of Free slots.
    pub fn available(&mut self) -> usize {
        self.sweep();
        self.policy.len()
    }

    /// Request counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// The free-list policy.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// State of the slot addressed by `id`.
    #[must_use]
    pub fn state(&self, id: SlotId) -> SlotState {
        match self.entry(id) {
            Some(e) if e.in_use => SlotState::InUse,
            Some(_) => SlotState::Free,
            None => SlotState::Evicted,
        }
    }

    fn entry(&self, id: SlotId) -> Option<&Entry<N, K>> {
        let e = self.entries.get(id.idx())?;
        (e.generation == id.generation() && e.slot.is_some()).then_some(e)
    }

    /// The slot addressed by `id`, if it is still live.
    #[must_use]
    pub fn slot(&self, id: SlotId) -> Option<&RenderSlot<N, K>> {
        self.entry(id)?.slot.as_ref()
    }

    /// The slot addressed by `id`, mutably.
    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut RenderSlot<N, K>> {
        let e = self.entries.get_mut(id.idx())?;
        if e.generation != id.generation() {
            return None;
        }
        e.slot.as_mut()
    }

    /// The `InUse` slot requested for `key`, if any.
    #[must_use]
    pub fn slot_for_key(&self, key: &K) -> Option<SlotId> {
        self.in_use.get(key).copied()
    }

    /// Iterates over `InUse` slots and the keys they were requested for.
    pub fn in_use(&self) -> impl Iterator<Item = (&K, SlotId)> + '_ {
        self.in_use.iter().map(|(k, id)| (k, *id))
    }

    /// Binds a slot to `key` and marks it `InUse`.
    ///
    /// Returns `None` if `key` already has an `InUse` slot. Otherwise reuses
    /// the policy's preferred Free slot or builds a new one. The policy is
    /// swept first.
    pub fn get(&mut self, key: K) -> Option<SlotId> {
        if self.in_use.contains_key(&key) {
            return None;
        }
        self.sweep();
        let id = match self.reuse() {
            Some(id) => {
                self.stats.reused += 1;
                id
            }
            None => self.create(),
        };
        let entry = &mut self.entries[id.idx()];
        entry.in_use = true;
        if let Some(slot) = entry.slot.as_mut() {
            slot.set_bound_key(key.clone());
        }
        self.in_use.insert(key, id);
        ptrace!(?id, in_use = self.in_use.len(), "RenderPool::get");
        Some(id)
    }

    /// Calls [`RenderPool::get`] for every key, skipping keys already in use.
    ///
    /// Returns only the newly bound slots, in key order.
    pub fn get_all<I>(&mut self, keys: I) -> Vec<SlotId>
    where
        I: IntoIterator<Item = K>,
    {
        keys.into_iter().filter_map(|k| self.get(k)).collect()
    }

    fn reuse(&mut self) -> Option<SlotId> {
        while let Some(id) = self.policy.take() {
            if self.state(id) == SlotState::Free {
                return Some(id);
            }
            self.stats.misses += 1;
        }
        None
    }

    fn create(&mut self) -> SlotId {
        let slot = RenderSlot::new((self.factory)());
        self.stats.created += 1;
        if let Some(idx) = self.vacant.pop() {
            let entry = &mut self.entries[idx as usize];
            entry.slot = Some(slot);
            return SlotId::new(idx, entry.generation);
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "more than u32::MAX render objects is not supported"
        )]
        let idx = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 1,
            slot: Some(slot),
            in_use: false,
        });
        SlotId::new(idx, 1)
    }

    /// Returns an `InUse` slot to the pool and clears its binding.
    ///
    /// If the slot's binding was changed or cleared while it was in use, the
    /// key index is searched for the slot instead (O(`InUse`)). Releasing a
    /// slot that is not `InUse` does nothing and returns `false`.
    pub fn release(&mut self, id: SlotId) -> bool {
        let Some(entry) = self.entries.get_mut(id.idx()) else {
            return false;
        };
        if entry.generation != id.generation() || !entry.in_use {
            return false;
        }
        let Some(slot) = entry.slot.as_mut() else {
            return false;
        };
        entry.in_use = false;
        let key = slot.clear_binding();
        match key {
            Some(k) if self.in_use.get(&k) == Some(&id) => {
                self.in_use.remove(&k);
            }
            _ => {
                ptrace!(?id, "RenderPool::release: binding changed, scanning");
                self.in_use.retain(|_, v| *v != id);
            }
        }
        let mut evicted = core::mem::take(&mut self.scratch);
        self.policy.push(id, &mut evicted);
        self.evict_all(&mut evicted);
        self.scratch = evicted;
        self.sweep();
        true
    }

    /// Releases every slot in `ids`, returning how many were `InUse`.
    pub fn release_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = SlotId>,
    {
        ids.into_iter().filter(|id| self.release(*id)).count()
    }

    /// Lets the policy evict Free slots, returning how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let total = self.len();
        let mut evicted = core::mem::take(&mut self.scratch);
        self.policy.sweep(total, &mut evicted);
        let n = self.evict_all(&mut evicted);
        self.scratch = evicted;
        n
    }

    /// Drops every Free slot. `InUse` slots are untouched.
    pub fn clear(&mut self) {
        let mut evicted = core::mem::take(&mut self.scratch);
        self.policy.drain(&mut evicted);
        self.evict_all(&mut evicted);
        self.scratch = evicted;
    }

    fn evict_all(&mut self, ids: &mut Vec<SlotId>) -> usize {
        let mut n = 0;
        for id in ids.drain(..) {
            let Some(entry) = self.entries.get_mut(id.idx()) else {
                continue;
            };
            if entry.generation != id.generation() || entry.in_use || entry.slot.is_none() {
                continue;
            }
            entry.slot = None;
            entry.generation = entry.generation.wrapping_add(1);
            self.vacant.push(id.0);
            n += 1;
        }
        if n > 0 {
            self.stats.evicted += n;
            pdebug!(evicted = n, remaining = self.len(), "RenderPool evicted free slots");
        }
        n
    }
}
