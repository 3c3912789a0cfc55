// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_element_store --heading-base-level=0

//! Understory Element Store: a mutable collection of 2D-positioned elements.
//!
//! [`ElementStore`] wraps an [`understory_grid_index::GridIndex`] and adds the
//! bookkeeping a virtualizing view needs from its data source:
//!
//! - Stable generational handles ([`ItemId`]) that survive repositioning and
//!   never alias a later element.
//! - Change notifications ([`ChangeEvent`]) of kind [`ChangeKind::Addition`],
//!   [`ChangeKind::Removal`], or [`ChangeKind::Move`], each carrying the
//!   affected elements and the rectangle spanning them.
//! - Listener registrations keyed by an [`OwnerToken`], so one owner can drop
//!   all of its listeners at once.
//! - Lazily maintained [content bounds](ElementStore::content_bounds).
//! - Batches that fold many mutations into one notification per kind.
//!
//! The store implements [`SpatialQuery<ItemId>`](understory_grid_index::SpatialQuery),
//! so anything that consumes an index can consume a store.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_element_store::ElementStore;
//! use understory_grid_index::SpatialQuery;
//!
//! let mut store = ElementStore::default();
//! let id = store.add("hello", Point::new(150.0, 150.0)).unwrap();
//! store.add("world", Point::new(950.0, 50.0)).unwrap();
//!
//! let hits = store.query_range(Point::new(100.0, 100.0), Point::new(300.0, 300.0));
//! assert_eq!(hits.len(), 1);
//! assert_eq!(store.get(hits[0].value), Some(&"hello"));
//! assert_eq!(hits[0].value, id);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bounds;
mod event;
mod id;
mod listener;
mod store;

pub use event::{Affected, ChangeEvent, ChangeKind};
pub use id::ItemId;
pub use listener::{ListenerId, OwnerToken};
pub use store::ElementStore;
