// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_grid_index --heading-base-level=0

//! Understory Grid Index: a resizable bucket grid over 2D-positioned items.
//!
//! This crate answers one question fast: which items have a position inside
//! this rectangle? It is the spatial half of viewport virtualization, where a
//! host only materializes the items near the visible region of a very large
//! canvas.
//!
//! - [`GridIndex`]: a rows × cols grid of buckets covering `[0, width] x [0, height]`.
//!   Rows subdivide x, columns subdivide y. Each bucket keeps its items in insertion order.
//! - [`FlatIndex`]: a linear-scan reference implementation with the same query contract.
//! - [`SpatialQuery`]: the read-only query capability both implement.
//! - [`Cursor`]: a detached, fail-fast traversal that supports removal.
//! - [`GridConfig`]: sizing parameters with documented defaults and validation.
//!
//! ## Queries
//!
//! Range queries use **closed** intervals everywhere: an item exactly on an
//! edge of the query rectangle is reported, and an item exactly on the grid's
//! far bound lives in the last bucket.
//!
//! A query touching only part of the grid splits the buckets it overlaps into
//! *boundary* buckets (on the first or last overlapped row or column), whose
//! items are tested one by one, and *interior* buckets, whose items are
//! appended wholesale. A query covering the whole grid returns every item with
//! no tests at all, and inverted, zero-area, or fully outside queries return
//! nothing without scanning. [`SpatialQuery::visit_range`] reports which of
//! these happened through [`QueryStats`].
//!
//! ## Growth
//!
//! Inserting an item beyond the current extent grows the grid one axis at a
//! time, either by stretching the bucket range (bounded by
//! [`GridConfig::max_range_growth`]) or by adding buckets (bounded by
//! [`GridConfig::max_rows`] / [`GridConfig::max_cols`]). Growth relocates every
//! item. See [`GridIndex::ensure_capacity`] for the exact policy.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_grid_index::{GridConfig, GridIndex, Positioned, SpatialQuery};
//!
//! let mut grid = GridIndex::new(GridConfig::default()).unwrap();
//! grid.insert(Positioned::new(1_u32, 150.0, 150.0)).unwrap();
//! grid.insert(Positioned::new(2_u32, 950.0, 50.0)).unwrap();
//!
//! let mut visible = Vec::new();
//! grid.visit_range(Point::new(0.0, 0.0), Point::new(400.0, 400.0), |item| {
//!     visible.push(item.value);
//! });
//! assert_eq!(visible, [1]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[macro_use]
mod macros;

mod config;
mod cursor;
mod error;
mod flat;
mod grid;
mod query;
mod types;

pub use config::{
    DEFAULT_INITIAL_BUCKETS, DEFAULT_INITIAL_EXTENT, DEFAULT_MAX_BUCKETS,
    DEFAULT_MAX_RANGE_GROWTH, GridConfig,
};
pub use cursor::Cursor;
pub use error::{ConfigError, CursorError, InsertError};
pub use flat::FlatIndex;
pub use grid::{AxisGrowth, GridIndex, Resize};
pub use query::SpatialQuery;
pub use types::{Axis, BucketCoord, Positioned, QueryStats};
