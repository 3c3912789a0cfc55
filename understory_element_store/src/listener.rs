// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owner-keyed listener registry.
//!
//! Listeners are kept in registration order. A secondary index maps each
//! [`OwnerToken`] to the listeners it registered so an owner can drop all of
//! them at once, for example when the view that subscribed goes away.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::event::ChangeEvent;

/// Opaque identity of a listener owner.
///
/// Obtained from [`ElementStore::new_owner`](crate::ElementStore::new_owner).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OwnerToken(u64);

/// Identifier of one registered listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub(crate) type Listener<T> = Box<dyn FnMut(&ChangeEvent<'_, T>)>;

struct Registration<T> {
    id: ListenerId,
    owner: OwnerToken,
    callback: Listener<T>,
}

pub(crate) struct Registry<T> {
    entries: Vec<Registration<T>>,
    by_owner: HashMap<OwnerToken, SmallVec<[ListenerId; 2]>>,
    next_owner: u64,
    next_listener: u64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_owner: HashMap::new(),
            next_owner: 0,
            next_listener: 0,
        }
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("listeners", &self.entries.len())
            .field("owners", &self.by_owner.len())
            .finish_non_exhaustive()
    }
}

impl<T> Registry<T> {
    pub(crate) fn new_owner(&mut self) -> OwnerToken {
        self.next_owner += 1;
        OwnerToken(self.next_owner)
    }

    pub(crate) fn add(&mut self, owner: OwnerToken, callback: Listener<T>) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.entries.push(Registration {
            id,
            owner,
            callback,
        });
        self.by_owner.entry(owner).or_default().push(id);
        id
    }

    /// Removes one listener; it must have been registered by `owner`.
    pub(crate) fn remove(&mut self, owner: OwnerToken, id: ListenerId) -> bool {
        let Some(ids) = self.by_owner.get_mut(&owner) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|l| *l == id) else {
            return false;
        };
        ids.remove(pos);
        if ids.is_empty() {
            self.by_owner.remove(&owner);
        }
        self.entries.retain(|r| r.id != id);
        true
    }

    /// Removes every listener registered by `owner`, returning how many.
    pub(crate) fn remove_owner(&mut self, owner: OwnerToken) -> usize {
        let Some(ids) = self.by_owner.remove(&owner) else {
            return 0;
        };
        self.entries.retain(|r| r.owner != owner);
        ids.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn dispatch(&mut self, event: &ChangeEvent<'_, T>) {
        for r in &mut self.entries {
            (r.callback)(event);
        }
    }
}
