// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_render_pool --heading-base-level=0

//! Understory Render Pool: reusable render objects keyed by the item they show.
//!
//! A virtualizing view keeps only a few hundred render objects alive for a
//! collection that may hold millions of items. [`RenderPool`] hands those
//! objects out and takes them back:
//!
//! - [`RenderPool::get`] binds a Free slot (or a freshly built one) to a key.
//!   A key never has two `InUse` slots at once.
//! - [`RenderPool::release`] returns a slot. It is idempotent, and tolerates
//!   bindings changed behind the pool's back.
//! - A [`FreePolicy`] decides what happens to Free slots:
//!   [`Retain`] keeps them all, [`IdleTtl`] evicts the ones idle for too long
//!   above a core size, and [`Bounded`] keeps a fixed number.
//!
//! Every slot is either Free, `InUse`, or Evicted; see [`SlotState`]. Render
//! objects that can be positioned implement [`Placeable`].
//!
//! ## Idle eviction
//!
//! ```rust
//! use core::time::Duration;
//! use understory_render_pool::{IdleTtl, ManualClock, RenderPool, TtlConfig};
//!
//! let clock = ManualClock::new();
//! let policy = IdleTtl::new(
//!     TtlConfig { ttl: Duration::from_millis(1000), core_size: 2 },
//!     clock.clone(),
//! );
//! let mut pool = RenderPool::with_policy(|| (), policy);
//!
//! let slots = pool.get_all([1, 2, 3]);
//! pool.release_all(slots);
//! assert_eq!(pool.len(), 3);
//!
//! clock.advance(Duration::from_millis(1000));
//! assert_eq!(pool.sweep(), 1);
//! assert_eq!(pool.len(), 2);
//! ```
//!
//! Hosts use [`InstantClock`] (feature `std`) instead of [`ManualClock`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod macros;

mod clock;
mod policy;
mod pool;
mod slot;

#[cfg(feature = "std")]
pub use clock::InstantClock;
pub use clock::{Clock, ManualClock};
pub use policy::{
    Bounded, BoundedConfig, DEFAULT_CORE_SIZE, DEFAULT_MAX_FREE, DEFAULT_TTL, FreePolicy, IdleTtl,
    Retain, TtlConfig,
};
pub use pool::{PoolStats, RenderPool};
pub use slot::{Placeable, RenderSlot, SlotId, SlotState};
