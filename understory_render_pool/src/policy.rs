// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free-list policies.
//!
//! A policy owns the list of Free slots: it decides which one is reused next
//! and which ones are evicted. All built-in policies reuse the most recently
//! freed slot first (LIFO), which keeps recently used render objects warm, and
//! evict the oldest Free slot first.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::time::Duration;

use crate::clock::Clock;
use crate::slot::SlotId;

/// Free-list management for a [`RenderPool`](crate::RenderPool).
pub trait FreePolicy {
    /// Takes the next slot to reuse, if any.
    ///
    /// The pool double-checks the returned id; a slot that is no longer Free
    /// counts as a miss and the pool asks again.
    fn take(&mut self) -> Option<SlotId>;

    /// Records a slot that just became Free, appending any slots this pushes
    /// out to `evicted`.
    fn push(&mut self, id: SlotId, evicted: &mut Vec<SlotId>);

    /// Evicts Free slots that should no longer be retained.
    ///
    /// `total` is the pool size (Free plus `InUse`) before this sweep.
    fn sweep(&mut self, total: usize, evicted: &mut Vec<SlotId>) {
        let _ = (total, evicted);
    }

    /// Moves every Free slot into `out`.
    fn drain(&mut self, out: &mut Vec<SlotId>);

    /// Number of Free slots held.
    fn len(&self) -> usize;

    /// Returns `true` if no Free slots are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unbounded retention: Free slots are kept until [`RenderPool::clear`](crate::RenderPool::clear).
#[derive(Clone, Debug, Default)]
pub struct Retain {
    free: Vec<SlotId>,
}

impl FreePolicy for Retain {
    fn take(&mut self) -> Option<SlotId> {
        self.free.pop()
    }

    fn push(&mut self, id: SlotId, _evicted: &mut Vec<SlotId>) {
        self.free.push(id);
    }

    fn drain(&mut self, out: &mut Vec<SlotId>) {
        out.append(&mut self.free);
    }

    fn len(&self) -> usize {
        self.free.len()
    }
}

/// Default idle time after which a Free slot may be evicted.
pub const DEFAULT_TTL: Duration = Duration::from_millis(20_000);

/// Default number of slots [`IdleTtl`] keeps regardless of idle time.
pub const DEFAULT_CORE_SIZE: usize = 50;

/// Parameters for [`IdleTtl`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TtlConfig {
    /// Minimum idle time before a Free slot may be evicted. Zero is legal.
    pub ttl: Duration,
    /// Pool size (Free plus `InUse`) at or below which nothing is evicted.
    /// Zero is legal.
    pub core_size: usize,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            core_size: DEFAULT_CORE_SIZE,
        }
    }
}

/// Idle-time eviction above a core size.
///
/// A sweep repeatedly looks at the *oldest* Free slot and evicts it while it
/// has been idle for at least the TTL **and** the pool is larger than the core
/// size. It stops at the first slot failing either test, so a sweep costs
/// O(evicted + 1).
///
/// ```rust
/// use core::time::Duration;
/// use understory_render_pool::{FreePolicy, IdleTtl, ManualClock, TtlConfig};
///
/// let clock = ManualClock::new();
/// let mut policy = IdleTtl::new(
///     TtlConfig { ttl: Duration::from_millis(1000), core_size: 0 },
///     clock.clone(),
/// );
/// assert!(policy.take().is_none());
/// ```
#[derive(Clone, Debug)]
pub struct IdleTtl<C> {
    config: TtlConfig,
    clock: C,
    /// Oldest release at the front.
    free: VecDeque<(SlotId, Duration)>,
}

impl<C: Clock> IdleTtl<C> {
    /// Creates the policy with its time source.
    pub fn new(config: TtlConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            free: VecDeque::new(),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> TtlConfig {
        self.config
    }

    /// The time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> FreePolicy for IdleTtl<C> {
    fn take(&mut self) -> Option<SlotId> {
        self.free.pop_back().map(|(id, _)| id)
    }

    fn push(&mut self, id: SlotId, _evicted: &mut Vec<SlotId>) {
        self.free.push_back((id, self.clock.now()));
    }

    fn sweep(&mut self, mut total: usize, evicted: &mut Vec<SlotId>) {
        let now = self.clock.now();
        while let Some(&(id, released)) = self.free.front() {
            let idle = now.saturating_sub(released);
            if idle < self.config.ttl || total <= self.config.core_size {
                break;
            }
            self.free.pop_front();
            evicted.push(id);
            total -= 1;
        }
    }

    fn drain(&mut self, out: &mut Vec<SlotId>) {
        out.extend(self.free.drain(..).map(|(id, _)| id));
    }

    fn len(&self) -> usize {
        self.free.len()
    }
}

/// Default number of Free slots [`Bounded`] retains.
pub const DEFAULT_MAX_FREE: usize = 50;

/// Parameters for [`Bounded`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundedConfig {
    /// Maximum number of Free slots retained. Zero disables retention.
    pub max_free: usize,
}

impl Default for BoundedConfig {
    fn default() -> Self {
        Self {
            max_free: DEFAULT_MAX_FREE,
        }
    }
}

/// Bounded retention: at most `max_free` Free slots, oldest evicted first.
#[derive(Clone, Debug, Default)]
pub struct Bounded {
    config: BoundedConfig,
    free: VecDeque<SlotId>,
}

impl Bounded {
    /// Creates the policy.
    #[must_use]
    pub fn new(config: BoundedConfig) -> Self {
        Self {
            config,
            free: VecDeque::new(),
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> BoundedConfig {
        self.config
    }
}

impl FreePolicy for Bounded {
    fn take(&mut self) -> Option<SlotId> {
        self.free.pop_back()
    }

    fn push(&mut self, id: SlotId, evicted: &mut Vec<SlotId>) {
        self.free.push_back(id);
        while self.free.len() > self.config.max_free {
            if let Some(old) = self.free.pop_front() {
                evicted.push(old);
            }
        }
    }

    fn drain(&mut self, out: &mut Vec<SlotId>) {
        out.extend(self.free.drain(..));
    }

    fn len(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::time::Duration;

    use super::{Bounded, BoundedConfig, FreePolicy, IdleTtl, Retain, TtlConfig};
    use crate::clock::ManualClock;
    use crate::slot::SlotId;

    fn ids(n: u32) -> Vec<SlotId> {
        (0..n).map(|i| SlotId::new(i, 1)).collect()
    }

    #[test]
    fn retain_is_lifo() {
        let mut p = Retain::default();
        let mut evicted = Vec::new();
        for id in ids(3) {
            p.push(id, &mut evicted);
        }
        assert!(evicted.is_empty());
        assert_eq!(p.take(), Some(SlotId::new(2, 1)));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn ttl_sweep_stops_at_core_size() {
        let clock = ManualClock::new();
        let mut p = IdleTtl::new(
            TtlConfig {
                ttl: Duration::from_millis(1000),
                core_size: 2,
            },
            clock.clone(),
        );
        let mut evicted = Vec::new();
        for id in ids(3) {
            p.push(id, &mut evicted);
        }
        p.sweep(3, &mut evicted);
        assert!(evicted.is_empty(), "nothing is idle long enough yet");

        clock.advance(Duration::from_millis(1000));
        p.sweep(3, &mut evicted);
        assert_eq!(evicted, [SlotId::new(0, 1)]);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn ttl_sweep_stops_at_first_young_slot() {
        let clock = ManualClock::new();
        let mut p = IdleTtl::new(
            TtlConfig {
                ttl: Duration::from_millis(100),
                core_size: 0,
            },
            clock.clone(),
        );
        let mut evicted = Vec::new();
        let [a, b, c] = [SlotId::new(0, 1), SlotId::new(1, 1), SlotId::new(2, 1)];
        p.push(a, &mut evicted);
        clock.advance(Duration::from_millis(50));
        p.push(b, &mut evicted);
        p.push(c, &mut evicted);
        // Reuse takes the most recently freed slot.
        assert_eq!(p.take(), Some(c));
        clock.advance(Duration::from_millis(60));
        p.sweep(3, &mut evicted);
        assert_eq!(evicted, [a]);
        assert_eq!(p.take(), Some(b));
    }

    #[test]
    fn bounded_evicts_oldest_on_overflow() {
        let mut p = Bounded::new(BoundedConfig { max_free: 2 });
        let mut evicted = Vec::new();
        for id in ids(4) {
            p.push(id, &mut evicted);
        }
        assert_eq!(evicted, [SlotId::new(0, 1), SlotId::new(1, 1)]);
        assert_eq!(p.take(), Some(SlotId::new(3, 1)));

        let mut none = Bounded::new(BoundedConfig { max_free: 0 });
        let mut evicted = Vec::new();
        none.push(SlotId::new(9, 1), &mut evicted);
        assert_eq!(evicted.len(), 1);
        assert!(none.is_empty());
    }
}
