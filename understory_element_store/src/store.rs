// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element store.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};
use understory_grid_index::{
    ConfigError, GridConfig, GridIndex, InsertError, Positioned, QueryStats, SpatialQuery,
};

use crate::bounds::BoundsTracker;
use crate::event::{Affected, ChangeEvent, ChangeKind};
use crate::id::ItemId;
use crate::listener::{ListenerId, OwnerToken, Registry};

struct Slot<T> {
    generation: u32,
    entry: Option<(T, Point)>,
}

/// An element detached from the store, kept until its removal is reported.
struct Detached<T> {
    id: ItemId,
    value: T,
    position: Point,
}

/// Changes collected while a batch is open.
struct Pending<T> {
    depth: usize,
    added: Vec<ItemId>,
    moved: Vec<(ItemId, Point)>,
    removed: Vec<Detached<T>>,
}

impl<T> Pending<T> {
    fn new() -> Self {
        Self {
            depth: 0,
            added: Vec::new(),
            moved: Vec::new(),
            removed: Vec::new(),
        }
    }
}

fn validate(p: Point) -> Result<(), InsertError> {
    if p.x.is_finite() && p.y.is_finite() && p.x >= 0.0 && p.y >= 0.0 {
        Ok(())
    } else {
        Err(InsertError::OutOfDomain { x: p.x, y: p.y })
    }
}

/// A mutable collection of positioned elements backed by a [`GridIndex`].
///
/// Every element gets an [`ItemId`]; the index stores ids, and the store keeps
/// the values. Mutations notify listeners with a [`ChangeEvent`] and keep the
/// [content bounds](ElementStore::content_bounds) up to date.
///
/// Listeners receive `&ElementStore`, never `&mut`, so a listener cannot
/// mutate the store it is observing.
///
/// # Example
///
/// ```rust
/// use core::cell::Cell;
/// use std::rc::Rc;
///
/// use kurbo::{Point, Rect};
/// use understory_element_store::{ChangeKind, ElementStore};
///
/// let mut store: ElementStore<&str> = ElementStore::default();
/// let owner = store.new_owner();
/// let additions = Rc::new(Cell::new(0));
/// let seen = additions.clone();
/// store.add_listener(owner, move |event| {
///     if event.kind() == ChangeKind::Addition {
///         seen.set(seen.get() + event.items().len());
///     }
/// });
///
/// let a = store.add("a", Point::new(10.0, 20.0)).unwrap();
/// store.add_all([("b", Point::new(300.0, 40.0)), ("c", Point::new(50.0, 700.0))]).unwrap();
/// assert_eq!(additions.get(), 3);
/// assert_eq!(store.content_bounds(), Rect::new(10.0, 20.0, 300.0, 700.0));
///
/// store.move_to(a, Point::new(900.0, 900.0)).unwrap();
/// assert_eq!(store.position(a), Some(Point::new(900.0, 900.0)));
/// ```
pub struct ElementStore<T> {
    index: GridIndex<ItemId>,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    bounds: BoundsTracker,
    listeners: Registry<T>,
    pending: Option<Pending<T>>,
}

impl<T> Default for ElementStore<T> {
    fn default() -> Self {
        Self::with_index(GridIndex::default())
    }
}

impl<T> fmt::Debug for ElementStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementStore")
            .field("len", &self.len)
            .field("index", &self.index)
            .field("listeners", &self.listeners)
            .field("batching", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> ElementStore<T> {
    /// Creates an empty store whose index uses `config`.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_index(GridIndex::new(config)?))
    }

    fn with_index(index: GridIndex<ItemId>) -> Self {
        Self {
            index,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            bounds: BoundsTracker::default(),
            listeners: Registry::default(),
            pending: None,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the store holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` refers to a live element.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.entry(id).is_some()
    }

    /// Returns the value of a live element.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.entry(id).map(|(v, _)| v)
    }

    /// Returns the position of a live element.
    #[must_use]
    pub fn position(&self, id: ItemId) -> Option<Point> {
        self.entry(id).map(|(_, p)| *p)
    }

    fn entry(&self, id: ItemId) -> Option<&(T, Point)> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Iterates over live elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &T, Point)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            let (v, p) = s.entry.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "slot indices are allocated as u32"
            )]
            let id = ItemId::new(i as u32, s.generation);
            Some((id, v, *p))
        })
    }

    /// Returns the underlying spatial index.
    #[must_use]
    pub fn index(&self) -> &GridIndex<ItemId> {
        &self.index
    }

    /// Returns the tight bounding box of all element positions.
    ///
    /// The box is maintained incrementally; it is only recomputed (O(n)) when
    /// an element lying on the boundary was moved or removed since the last
    /// read. An empty store reports [`Rect::ZERO`].
    pub fn content_bounds(&self) -> Rect {
        self.bounds.get(|| self.iter().map(|(_, _, p)| p))
    }

    fn alloc(&mut self, value: T, position: Point) -> ItemId {
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.entry = Some((value, position));
            return ItemId::new(idx, slot.generation);
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "more than u32::MAX elements is not supported"
        )]
        let idx = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            entry: Some((value, position)),
        });
        ItemId::new(idx, 1)
    }

    fn insert_valid(&mut self, value: T, position: Point) -> Result<ItemId, InsertError> {
        let first = self.len == 0;
        let id = self.alloc(value, position);
        if let Err(err) = self.index.insert(Positioned::at(id, position)) {
            self.release_slot(id);
            return Err(err);
        }
        self.len += 1;
        self.bounds.include(position, first);
        Ok(id)
    }

    /// Frees the slot of `id`, returning its contents.
    fn release_slot(&mut self, id: ItemId) -> Option<(T, Point)> {
        let slot = self.slots.get_mut(id.idx())?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.0);
        Some(entry)
    }

    /// Adds an element and notifies listeners with an [`ChangeKind::Addition`].
    pub fn add(&mut self, value: T, position: Point) -> Result<ItemId, InsertError> {
        validate(position)?;
        let id = self.insert_valid(value, position)?;
        self.notify_added(alloc::vec![id]);
        Ok(id)
    }

    /// Adds several elements with a single [`ChangeKind::Addition`].
    ///
    /// All positions are validated first; on error nothing is added.
    pub fn add_all<I>(&mut self, items: I) -> Result<Vec<ItemId>, InsertError>
    where
        I: IntoIterator<Item = (T, Point)>,
    {
        let items: Vec<_> = items.into_iter().collect();
        for (_, p) in &items {
            validate(*p)?;
        }
        let mut ids = Vec::with_capacity(items.len());
        for (value, position) in items {
            ids.push(self.insert_valid(value, position)?);
        }
        self.notify_added(ids.clone());
        Ok(ids)
    }

    fn detach(&mut self, id: ItemId) -> Option<Detached<T>> {
        let position = self.position(id)?;
        self.index
            .remove_matching(position.x, position.y, |e| e.value == id)?;
        let (value, position) = self.release_slot(id)?;
        self.len -= 1;
        self.bounds.vacate(position);
        Some(Detached {
            id,
            value,
            position,
        })
    }

    /// Removes an element by handle.
    ///
    /// Returns `false` if `id` is stale.
    pub fn remove_id(&mut self, id: ItemId) -> bool {
        let Some(detached) = self.detach(id) else {
            return false;
        };
        self.notify_removed(alloc::vec![detached]);
        true
    }

    /// Removes the first element equal to `value`, in index iteration order.
    ///
    /// This scans the whole index. Prefer [`ElementStore::remove_at`] when the
    /// position is known, or [`ElementStore::remove_id`].
    pub fn remove(&mut self, value: &T) -> Option<ItemId>
    where
        T: PartialEq,
    {
        let id = self
            .index
            .iter()
            .map(|e| e.value)
            .find(|id| self.get(*id) == Some(value))?;
        let detached = self.detach(id)?;
        self.notify_removed(alloc::vec![detached]);
        Some(id)
    }

    /// Removes the element equal to `value` located exactly at `position`.
    ///
    /// Only the bucket holding `position` is scanned.
    pub fn remove_at(&mut self, value: &T, position: Point) -> Option<ItemId>
    where
        T: PartialEq,
    {
        let slots = &self.slots;
        let removed = self.index.remove_matching(position.x, position.y, |e| {
            e.x == position.x
                && e.y == position.y
                && slots
                    .get(e.value.idx())
                    .and_then(|s| s.entry.as_ref())
                    .is_some_and(|(v, _)| v == value)
        })?;
        let id = removed.value;
        let (value, position) = self.release_slot(id)?;
        self.len -= 1;
        self.bounds.vacate(position);
        self.notify_removed(alloc::vec![Detached {
            id,
            value,
            position
        }]);
        Some(id)
    }

    fn relocate(&mut self, id: ItemId, to: Point) -> Result<Option<Point>, InsertError> {
        validate(to)?;
        let Some(from) = self.position(id) else {
            return Ok(None);
        };
        self.index.reposition(&Positioned::at(id, from), to)?;
        if let Some(slot) = self.slots.get_mut(id.idx()) {
            if let Some((_, p)) = slot.entry.as_mut() {
                *p = to;
            }
        }
        self.bounds.vacate(from);
        self.bounds.include(to, false);
        Ok(Some(from))
    }

    /// Moves an element and notifies listeners with a [`ChangeKind::Move`].
    ///
    /// Returns `Ok(false)` if `id` is stale.
    pub fn move_to(&mut self, id: ItemId, to: Point) -> Result<bool, InsertError> {
        let Some(from) = self.relocate(id, to)? else {
            return Ok(false);
        };
        self.notify_moved(alloc::vec![(id, from)]);
        Ok(true)
    }

    /// Moves several elements with a single [`ChangeKind::Move`].
    ///
    /// All targets are validated first; on error nothing moves. Stale ids are
    /// skipped. Returns the number of elements moved.
    pub fn move_all<I>(&mut self, moves: I) -> Result<usize, InsertError>
    where
        I: IntoIterator<Item = (ItemId, Point)>,
    {
        let moves: Vec<_> = moves.into_iter().collect();
        for (_, p) in &moves {
            validate(*p)?;
        }
        let mut moved = Vec::with_capacity(moves.len());
        for (id, to) in moves {
            if let Some(from) = self.relocate(id, to)? {
                moved.push((id, from));
            }
        }
        let count = moved.len();
        self.notify_moved(moved);
        Ok(count)
    }

    /// Removes every element with a single [`ChangeKind::Removal`] and resets
    /// the content bounds to zero.
    ///
    /// The index keeps its current layout.
    pub fn clear(&mut self) {
        let mut removed = Vec::with_capacity(self.len);
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some((value, position)) = slot.entry.take() {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "slot indices are allocated as u32"
                )]
                let idx = i as u32;
                removed.push(Detached {
                    id: ItemId::new(idx, slot.generation),
                    value,
                    position,
                });
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(idx);
            }
        }
        self.index.clear();
        self.len = 0;
        self.bounds.reset();
        self.notify_removed(removed);
    }

    /// Runs `f` with notifications suppressed, then reports one consolidated
    /// event per kind.
    ///
    /// On exit listeners see, in order: one [`ChangeKind::Removal`] with every
    /// element removed inside the batch, one [`ChangeKind::Addition`] with the
    /// elements added inside the batch that are still alive, and one
    /// [`ChangeKind::Move`] with the elements moved inside the batch that are
    /// still alive (each once, with the position it had before the batch).
    /// Empty kinds are not reported. Batches nest; only the outermost one
    /// reports.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.pending.get_or_insert_with(Pending::new).depth += 1;
        let result = f(self);
        let done = match self.pending.as_mut() {
            Some(p) => {
                p.depth -= 1;
                p.depth == 0
            }
            None => false,
        };
        if done {
            if let Some(p) = self.pending.take() {
                self.notify_removed(p.removed);
                let added = p.added.into_iter().filter(|id| self.contains(*id)).collect();
                self.notify_added(added);
                let mut moved: Vec<(ItemId, Point)> = Vec::with_capacity(p.moved.len());
                for (id, from) in p.moved {
                    if self.contains(id) && !moved.iter().any(|(m, _)| *m == id) {
                        moved.push((id, from));
                    }
                }
                self.notify_moved(moved);
            }
        }
        result
    }

    /// Returns `true` while inside [`ElementStore::batch`].
    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.pending.is_some()
    }

    /// Allocates a fresh owner token for listener registration.
    pub fn new_owner(&mut self) -> OwnerToken {
        self.listeners.new_owner()
    }

    /// Registers a listener on behalf of `owner`.
    ///
    /// Listeners fire in registration order.
    pub fn add_listener<F>(&mut self, owner: OwnerToken, listener: F) -> ListenerId
    where
        F: FnMut(&ChangeEvent<'_, T>) + 'static,
    {
        self.listeners.add(owner, Box::new(listener))
    }

    /// Unregisters one listener registered by `owner`.
    pub fn remove_listener(&mut self, owner: OwnerToken, id: ListenerId) -> bool {
        self.listeners.remove(owner, id)
    }

    /// Unregisters every listener registered by `owner`, returning how many.
    pub fn remove_owner(&mut self, owner: OwnerToken) -> usize {
        self.listeners.remove_owner(owner)
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify_added(&mut self, ids: Vec<ItemId>) {
        if let Some(p) = self.pending.as_mut() {
            p.added.extend(ids);
            return;
        }
        if ids.is_empty() || self.listeners.is_empty() {
            return;
        }
        let mut listeners = core::mem::take(&mut self.listeners);
        {
            let this = &*self;
            let items: Vec<Affected<'_, T>> = ids
                .iter()
                .filter_map(|&id| {
                    let (value, position) = this.entry(id)?;
                    Some(Affected {
                        id,
                        value,
                        position: *position,
                        previous: None,
                    })
                })
                .collect();
            listeners.dispatch(&ChangeEvent::new(this, ChangeKind::Addition, &items));
        }
        self.listeners = listeners;
    }

    fn notify_moved(&mut self, moved: Vec<(ItemId, Point)>) {
        if let Some(p) = self.pending.as_mut() {
            p.moved.extend(moved);
            return;
        }
        if moved.is_empty() || self.listeners.is_empty() {
            return;
        }
        let mut listeners = core::mem::take(&mut self.listeners);
        {
            let this = &*self;
            let items: Vec<Affected<'_, T>> = moved
                .iter()
                .filter_map(|&(id, from)| {
                    let (value, position) = this.entry(id)?;
                    Some(Affected {
                        id,
                        value,
                        position: *position,
                        previous: Some(from),
                    })
                })
                .collect();
            listeners.dispatch(&ChangeEvent::new(this, ChangeKind::Move, &items));
        }
        self.listeners = listeners;
    }

    fn notify_removed(&mut self, removed: Vec<Detached<T>>) {
        if let Some(p) = self.pending.as_mut() {
            p.removed.extend(removed);
            return;
        }
        if removed.is_empty() || self.listeners.is_empty() {
            return;
        }
        let mut listeners = core::mem::take(&mut self.listeners);
        {
            let items: Vec<Affected<'_, T>> = removed
                .iter()
                .map(|d| Affected {
                    id: d.id,
                    value: &d.value,
                    position: d.position,
                    previous: None,
                })
                .collect();
            listeners.dispatch(&ChangeEvent::new(self, ChangeKind::Removal, &items));
        }
        self.listeners = listeners;
    }
}

impl<T> SpatialQuery<ItemId> for ElementStore<T> {
    fn visit_range<F: FnMut(&Positioned<ItemId>)>(
        &self,
        top_left: Point,
        bottom_right: Point,
        f: F,
    ) -> QueryStats {
        self.index.visit_range(top_left, bottom_right, f)
    }

    fn visit_all<F: FnMut(&Positioned<ItemId>)>(&self, f: F) {
        self.index.visit_all(f);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_partitioned(&self) -> bool {
        self.index.is_partitioned()
    }

    fn query_range(&self, top_left: Point, bottom_right: Point) -> Vec<&Positioned<ItemId>> {
        self.index.query_range(top_left, bottom_right)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use kurbo::{Point, Rect};
    use understory_grid_index::{InsertError, SpatialQuery};

    use super::ElementStore;
    use crate::event::ChangeKind;

    type Log = Rc<RefCell<Vec<(ChangeKind, usize, Rect)>>>;

    fn observed() -> (ElementStore<u32>, Log) {
        let mut store = ElementStore::default();
        let log: Log = Rc::default();
        let owner = store.new_owner();
        let sink = log.clone();
        store.add_listener(owner, move |e| {
            sink.borrow_mut().push((e.kind(), e.items().len(), e.bounds()));
        });
        (store, log)
    }

    #[test]
    fn ids_are_generational() {
        let mut store = ElementStore::default();
        let a = store.add(1_u32, Point::new(1.0, 1.0)).unwrap();
        assert!(store.remove_id(a));
        let b = store.add(2, Point::new(2.0, 2.0)).unwrap();
        // Same slot, new generation.
        assert_eq!(a.idx(), b.idx());
        assert_ne!(a, b);
        assert!(!store.contains(a));
        assert_eq!(store.get(b), Some(&2));
        assert!(!store.remove_id(a));
    }

    #[test]
    fn add_rejects_out_of_domain() {
        let mut store = ElementStore::default();
        assert_eq!(
            store.add(1_u32, Point::new(-1.0, 0.0)),
            Err(InsertError::OutOfDomain { x: -1.0, y: 0.0 })
        );
        assert!(
            store
                .add_all([(1, Point::new(1.0, 1.0)), (2, Point::new(f64::NAN, 1.0))])
                .is_err()
        );
        assert!(store.is_empty());
        assert!(store.index().is_empty());
    }

    #[test]
    fn add_all_fires_one_event() {
        let (mut store, log) = observed();
        store
            .add_all([
                (1, Point::new(10.0, 10.0)),
                (2, Point::new(20.0, 50.0)),
                (3, Point::new(40.0, 30.0)),
            ])
            .unwrap();
        assert_eq!(
            *log.borrow(),
            [(ChangeKind::Addition, 3, Rect::new(10.0, 10.0, 40.0, 50.0))]
        );
    }

    #[test]
    fn remove_by_value_takes_first_in_index_order() {
        let mut store = ElementStore::default();
        // (900, 0) lives in row 4, (0, 900) in row 0: row 0 comes first.
        let far = store.add(7_u32, Point::new(900.0, 0.0)).unwrap();
        let near = store.add(7, Point::new(0.0, 900.0)).unwrap();
        assert_eq!(store.remove(&7), Some(near));
        assert!(store.contains(far));
        assert_eq!(store.remove(&8), None);
    }

    #[test]
    fn remove_at_needs_exact_position() {
        let mut store = ElementStore::default();
        let a = store.add(5_u32, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(store.remove_at(&5, Point::new(11.0, 10.0)), None);
        assert_eq!(store.remove_at(&6, Point::new(10.0, 10.0)), None);
        assert_eq!(store.remove_at(&5, Point::new(10.0, 10.0)), Some(a));
        assert!(store.is_empty());
    }

    #[test]
    fn bounds_recompute_only_on_boundary_changes() {
        let mut store = ElementStore::default();
        let a = store.add(1_u32, Point::new(0.0, 0.0)).unwrap();
        let b = store.add(2, Point::new(100.0, 100.0)).unwrap();
        let c = store.add(3, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(store.content_bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));

        store.remove_id(c);
        assert!(!store.bounds.is_stale());

        store.move_to(b, Point::new(30.0, 20.0)).unwrap();
        assert!(store.bounds.is_stale());
        assert_eq!(store.content_bounds(), Rect::new(0.0, 0.0, 30.0, 20.0));

        store.remove_id(a);
        assert_eq!(store.content_bounds(), Rect::new(30.0, 20.0, 30.0, 20.0));
    }

    #[test]
    fn clear_resets_bounds_and_reports_everything() {
        let (mut store, log) = observed();
        store
            .add_all([(1, Point::new(5.0, 5.0)), (2, Point::new(8.0, 9.0))])
            .unwrap();
        store.clear();
        assert_eq!(store.content_bounds(), Rect::ZERO);
        assert!(store.is_empty());
        assert_eq!(
            log.borrow().last(),
            Some(&(ChangeKind::Removal, 2, Rect::new(5.0, 5.0, 8.0, 9.0)))
        );
        // Nothing to report on an empty clear.
        store.clear();
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn move_reports_previous_position() {
        let mut store = ElementStore::default();
        let owner = store.new_owner();
        let prev = Rc::new(RefCell::new(None));
        let sink = prev.clone();
        store.add_listener(owner, move |e| {
            if e.kind() == ChangeKind::Move {
                *sink.borrow_mut() = e.items()[0].previous;
            }
        });
        let a = store.add(1_u32, Point::new(1.0, 2.0)).unwrap();
        assert!(store.move_to(a, Point::new(3.0, 4.0)).unwrap());
        assert_eq!(*prev.borrow(), Some(Point::new(1.0, 2.0)));
        let hits = store.query_range(Point::new(2.0, 3.0), Point::new(4.0, 5.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].value, a);
    }

    #[test]
    fn batch_consolidates_per_kind() {
        let (mut store, log) = observed();
        let keep = store.add(1, Point::new(1.0, 1.0)).unwrap();
        log.borrow_mut().clear();
        store.batch(|s| {
            let gone = s.add(2, Point::new(2.0, 2.0)).unwrap();
            s.add(3, Point::new(3.0, 3.0)).unwrap();
            s.move_to(keep, Point::new(4.0, 4.0)).unwrap();
            s.batch(|s| s.move_to(keep, Point::new(5.0, 5.0)).unwrap());
            s.remove_id(gone);
            assert!(s.is_batching());
        });
        assert!(!store.is_batching());
        let kinds: Vec<_> = log.borrow().iter().map(|(k, n, _)| (*k, *n)).collect();
        assert_eq!(
            kinds,
            [
                (ChangeKind::Removal, 1),
                (ChangeKind::Addition, 1),
                (ChangeKind::Move, 1)
            ]
        );
    }

    #[test]
    fn listeners_fire_in_order_and_unregister_by_owner() {
        let mut store = ElementStore::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = store.new_owner();
        let b = store.new_owner();
        for (owner, tag) in [(a, "a1"), (b, "b1"), (a, "a2")] {
            let sink = order.clone();
            store.add_listener(owner, move |_| sink.borrow_mut().push(tag));
        }
        store.add(1_u32, Point::new(1.0, 1.0)).unwrap();
        assert_eq!(*order.borrow(), ["a1", "b1", "a2"]);

        assert_eq!(store.remove_owner(a), 2);
        store.add(2, Point::new(1.0, 1.0)).unwrap();
        assert_eq!(*order.borrow(), ["a1", "b1", "a2", "b1"]);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn listener_sees_post_change_state() {
        let mut store = ElementStore::default();
        let owner = store.new_owner();
        let lens = Rc::new(RefCell::new(Vec::new()));
        let sink = lens.clone();
        store.add_listener(owner, move |e| {
            sink.borrow_mut().push(e.store().len());
        });
        let a = store.add(1_u32, Point::new(1.0, 1.0)).unwrap();
        store.remove_id(a);
        assert_eq!(*lens.borrow(), [1, 0]);
    }
}
