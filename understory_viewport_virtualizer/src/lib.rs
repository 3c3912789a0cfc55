// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_viewport_virtualizer --heading-base-level=0

//! Understory Viewport Virtualizer: materialize only what the viewport shows.
//!
//! A 2D canvas with a huge number of positioned items keeps render objects
//! alive only for the items inside the viewport plus a look-ahead margin.
//! Three pieces cooperate:
//!
//! - a spatial source answering range queries, usually an
//!   [`ElementStore`](understory_element_store::ElementStore) over an
//!   [`understory_grid_index::GridIndex`];
//! - a [`RenderPool`](understory_render_pool::RenderPool) of reusable render
//!   objects keyed by item;
//! - the [`ViewportVirtualizer`], which on every
//!   [`refresh`](ViewportVirtualizer::refresh) releases what left the query
//!   rectangle, repositions what stayed, and acquires objects only for the
//!   newly exposed [bands](bands::difference).
//!
//! [`ViewportState`] carries the offset, size and look-ahead margin and
//! batches change notifications. [`RefreshScheduler`] keeps at most one
//! refresh in flight and coalesces requests made during it.
//!
//! ## Scrolling a store
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_element_store::ElementStore;
//! use understory_grid_index::GridConfig;
//! use understory_render_pool::{Placeable, RenderPool};
//! use understory_viewport_virtualizer::{
//!     RefreshPath, ViewportVirtualizer, VirtualizerConfig,
//! };
//!
//! #[derive(Default)]
//! struct Label {
//!     at: Option<Point>,
//! }
//!
//! impl Placeable for Label {
//!     fn place(&mut self, at: Point) {
//!         self.at = Some(at);
//!     }
//!     fn detach(&mut self) {
//!         self.at = None;
//!     }
//! }
//!
//! let mut store = ElementStore::new(GridConfig::default()).unwrap();
//! for i in 0..100 {
//!     store.add(i, Point::new(f64::from(i) * 50.0, 10.0)).unwrap();
//! }
//! let mut pool = RenderPool::new(Label::default);
//! let mut virt = ViewportVirtualizer::new(VirtualizerConfig::default().with_look_ahead(0.0)).unwrap();
//! virt.viewport_mut().set_size(Size::new(500.0, 100.0)).unwrap();
//!
//! let first = virt.refresh(&store, &mut pool);
//! assert_eq!(first.path, RefreshPath::HardCut);
//! assert_eq!(virt.displayed().len(), 11);
//!
//! virt.viewport_mut().set_offset(Point::new(100.0, 0.0)).unwrap();
//! let next = virt.refresh(&store, &mut pool);
//! assert_eq!(next.path, RefreshPath::Incremental);
//! assert_eq!((next.acquired, next.released), (2, 2));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod macros;

pub mod bands;
mod config;
mod locator;
mod scheduler;
mod viewport;
mod virtualizer;

pub use config::{ConfigError, DEFAULT_LOOK_AHEAD, VirtualizerConfig};
pub use locator::ItemLocator;
pub use scheduler::{Passes, RefreshMode, RefreshScheduler};
pub use viewport::{ContentBoundsChanged, ViewportChanged, ViewportState};
pub use virtualizer::{RefreshPath, RefreshReport, ViewportVirtualizer};
