// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Detached, fail-fast traversal.
//!
//! [`GridIndex::iter`](crate::GridIndex::iter) borrows the grid, so the borrow
//! checker already rules out mutation while it is alive. A [`Cursor`] holds no
//! borrow between steps: the caller hands the grid to every call. This allows
//! removing the current element mid-traversal, and it means the cursor has to
//! detect structural changes made behind its back. It does so by comparing
//! the grid's modification count against the value it captured; a mismatch is
//! reported on the next advancement, never earlier.
//!
//! ```rust
//! use understory_grid_index::{CursorError, GridIndex, Positioned};
//!
//! let mut grid = GridIndex::default();
//! for i in 0..4_u32 {
//!     grid.insert(Positioned::new(i, f64::from(i) * 300.0, 10.0)).unwrap();
//! }
//!
//! // Remove every odd value while walking.
//! let mut cursor = grid.cursor();
//! while let Some(item) = cursor.advance(&grid).unwrap() {
//!     if item.value % 2 == 1 {
//!         cursor.remove(&mut grid).unwrap();
//!     }
//! }
//! assert_eq!(grid.len(), 2);
//!
//! // A change made outside the cursor is reported on the next step.
//! let mut cursor = grid.cursor();
//! grid.insert(Positioned::new(9, 1.0, 1.0)).unwrap();
//! assert!(matches!(
//!     cursor.advance(&grid),
//!     Err(CursorError::ConcurrentModification { .. })
//! ));
//! ```

use crate::error::CursorError;
use crate::grid::GridIndex;
use crate::types::Positioned;

/// A forward-only, non-restartable position in a [`GridIndex`].
///
/// Visits buckets in row-major order and items within a bucket in insertion
/// order. Once exhausted it keeps returning `Ok(None)`. A cursor only works
/// with the grid that created it; any other grid is rejected with
/// [`CursorError::ForeignIndex`].
#[derive(Clone, Debug)]
pub struct Cursor {
    owner: usize,
    expected: u64,
    bucket: usize,
    next: usize,
    /// Position of the element returned by the last advancement, if it has
    /// not been removed yet.
    current: Option<(usize, usize)>,
}

impl Cursor {
    pub(crate) fn new(owner: usize, expected: u64) -> Self {
        Self {
            owner,
            expected,
            bucket: 0,
            next: 0,
            current: None,
        }
    }

    fn check<T>(&self, grid: &GridIndex<T>) -> Result<(), CursorError> {
        if grid.id() != self.owner {
            return Err(CursorError::ForeignIndex);
        }
        let found = grid.modification_count();
        if found == self.expected {
            Ok(())
        } else {
            Err(CursorError::ConcurrentModification {
                expected: self.expected,
                found,
            })
        }
    }

    /// Moves to the next element and returns it.
    ///
    /// Returns `Ok(None)` when the traversal is exhausted and
    /// [`CursorError::ConcurrentModification`] if `grid` was structurally
    /// modified by anything other than this cursor since it was created.
    pub fn advance<'a, T>(
        &mut self,
        grid: &'a GridIndex<T>,
    ) -> Result<Option<&'a Positioned<T>>, CursorError> {
        self.check(grid)?;
        let buckets = grid.bucket_slots();
        while let Some(bucket) = buckets.get(self.bucket) {
            if let Some(item) = bucket.get(self.next) {
                self.current = Some((self.bucket, self.next));
                self.next += 1;
                return Ok(Some(item));
            }
            self.bucket += 1;
            self.next = 0;
        }
        self.current = None;
        Ok(None)
    }

    /// Removes the element returned by the last call to [`Cursor::advance`].
    ///
    /// The cursor stays valid afterwards. Calling this twice without an
    /// advancement in between, or before the first advancement, fails with
    /// [`CursorError::InvalidState`].
    pub fn remove<T>(&mut self, grid: &mut GridIndex<T>) -> Result<Positioned<T>, CursorError> {
        self.check(grid)?;
        let (bucket, pos) = self.current.take().ok_or(CursorError::InvalidState)?;
        let removed = grid.remove_at_slot(bucket, pos);
        // Later items in the bucket shifted down by one.
        self.next = pos;
        self.expected = grid.modification_count();
        Ok(removed)
    }
}
