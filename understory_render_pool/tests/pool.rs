// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pool behavior across the three retention policies.

use core::time::Duration;

use understory_render_pool::{
    Bounded, BoundedConfig, FreePolicy, IdleTtl, ManualClock, RenderPool, SlotId, SlotState,
    TtlConfig,
};

fn ttl_pool(
    ttl_ms: u64,
    core_size: usize,
) -> (
    RenderPool<u32, u32, impl FnMut() -> u32, IdleTtl<ManualClock>>,
    ManualClock,
) {
    let clock = ManualClock::new();
    let policy = IdleTtl::new(
        TtlConfig {
            ttl: Duration::from_millis(ttl_ms),
            core_size,
        },
        clock.clone(),
    );
    let mut next = 0;
    let factory = move || {
        next += 1;
        next
    };
    (RenderPool::with_policy(factory, policy), clock)
}

#[test]
fn ttl_evicts_exactly_the_oldest_above_core() {
    let (mut pool, clock) = ttl_pool(1000, 2);
    let slots = pool.get_all([10, 20, 30]);
    assert_eq!(pool.release_all(slots.iter().copied()), 3);
    assert_eq!(pool.len(), 3);

    clock.advance(Duration::from_millis(999));
    assert_eq!(pool.sweep(), 0);

    clock.advance(Duration::from_millis(1));
    assert_eq!(pool.sweep(), 1);
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.state(slots[0]), SlotState::Evicted);
    assert_eq!(pool.state(slots[1]), SlotState::Free);

    // At core size nothing more goes, however long it idles.
    clock.advance(Duration::from_secs(3600));
    assert_eq!(pool.available(), 2);
}

#[test]
fn ttl_reuses_most_recently_released() {
    let (mut pool, clock) = ttl_pool(1000, 0);
    let a = pool.get(1).unwrap();
    let b = pool.get(2).unwrap();
    pool.release(a);
    clock.advance(Duration::from_millis(10));
    pool.release(b);
    let c = pool.get(3).unwrap();
    assert_eq!(c, b);
    assert_eq!(pool.slot(c).unwrap().bound_key(), Some(&3));
}

#[test]
fn ttl_sweeps_opportunistically_on_get() {
    let (mut pool, clock) = ttl_pool(100, 0);
    let a = pool.get(1).unwrap();
    pool.release(a);
    clock.advance(Duration::from_millis(100));
    // The idle slot is evicted before the request is served.
    let b = pool.get(2).unwrap();
    assert_ne!(a, b);
    assert_eq!(pool.stats().created, 2);
    assert_eq!(pool.stats().evicted, 1);
}

#[test]
fn released_instance_can_serve_same_key_again() {
    let mut pool = RenderPool::new(|| String::from("node"));
    let a = pool.get("k").unwrap();
    pool.slot_mut(a).unwrap().node_mut().push('!');
    pool.release(a);
    let again = pool.get("k").unwrap();
    assert_eq!(again, a);
    assert_eq!(pool.slot(again).unwrap().node(), "node!");
    assert!(pool.get("k").is_none());
}

#[test]
fn bounded_keeps_at_most_max_free() {
    let mut pool = RenderPool::with_policy(|| (), Bounded::new(BoundedConfig { max_free: 2 }));
    let slots = pool.get_all(0..5_u32);
    pool.release_all(slots.iter().copied());
    assert_eq!(pool.free_len(), 2);
    assert_eq!(pool.stats().evicted, 3);
    // The two most recently released survive.
    assert_eq!(pool.state(slots[4]), SlotState::Free);
    assert_eq!(pool.state(slots[3]), SlotState::Free);
    assert_eq!(pool.state(slots[0]), SlotState::Evicted);
}

/// A policy that also hands back ids it has no business returning.
#[derive(Debug, Default)]
struct Leaky {
    free: Vec<SlotId>,
    stale: Vec<SlotId>,
}

impl FreePolicy for Leaky {
    fn take(&mut self) -> Option<SlotId> {
        self.stale.pop().or_else(|| self.free.pop())
    }

    fn push(&mut self, id: SlotId, evicted: &mut Vec<SlotId>) {
        // Evict immediately but remember the id.
        evicted.push(id);
        self.stale.push(id);
    }

    fn drain(&mut self, out: &mut Vec<SlotId>) {
        out.append(&mut self.free);
    }

    fn len(&self) -> usize {
        self.free.len()
    }
}

#[test]
fn stale_ids_from_policy_are_misses() {
    let mut pool = RenderPool::with_policy(|| (), Leaky::default());
    let a = pool.get(1_u32).unwrap();
    pool.release(a);
    assert_eq!(pool.state(a), SlotState::Evicted);

    let b = pool.get(1).unwrap();
    assert_ne!(a, b);
    let stats = pool.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.created, 2);
    assert_eq!(stats.reused, 0);
}
