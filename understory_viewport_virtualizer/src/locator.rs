// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position lookup by key.

use kurbo::Point;
use understory_element_store::{ElementStore, ItemId};

/// Looks up the current position of an item by key.
///
/// The virtualizer uses this to decide, for each displayed item, whether it
/// still exists and where it is now. `None` means the item is gone.
pub trait ItemLocator<K> {
    /// Current position of `key`, or `None` if it no longer exists.
    fn locate(&self, key: &K) -> Option<Point>;
}

impl<T> ItemLocator<ItemId> for ElementStore<T> {
    fn locate(&self, key: &ItemId) -> Option<Point> {
        self.position(*key)
    }
}

impl<K, L: ItemLocator<K> + ?Sized> ItemLocator<K> for &L {
    fn locate(&self, key: &K) -> Option<Point> {
        (**self).locate(key)
    }
}
