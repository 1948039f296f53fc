use std::iter::FusedIterator;
use std::num::NonZero;
use std::ops::{Index, IndexMut};
use std::slice;

use crate::{
    DEFAULT_BASE_CAPACITY, DenseStore, Dump, Error, Generation, Result, SlotId, SlotMapBuilder,
    SparseFreeList,
};

/// An arena of `Copy` records addressed by generational handles.
///
/// Inserting a record returns a [`SlotId`] that keeps referring to that record for as long as it
/// is in the map, while other records come and go. Once the record is removed, every copy of the
/// handle is dead: it no longer resolves and can never come back to life, even when its slot is
/// reused by a later insertion.
///
/// The records themselves are kept densely packed in insertion order (modulo removals), so
/// iterating over them is as fast as iterating over a slice. Removal moves the last record into
/// the vacated position in O(1) ([`remove()`](Self::remove)) or, if the relative order of the
/// records matters, shifts all later records down in O(n) ([`remove_shift()`](Self::remove_shift)).
///
/// # Structure
///
/// Internally the map consists of four parts that are kept mutually consistent:
///
/// * a [`SparseFreeList`] mapping each handle's slot index to the dense position of its record,
/// * a generation counter per slot, bumped whenever the slot is vacated,
/// * a back-reference from each dense position to the slot that owns it,
/// * a [`DenseStore`] holding the records.
///
/// For every live handle `{slot, generation}` the slot maps to a dense position whose
/// back-reference is that same slot, and the slot's counter equals the handle's generation.
/// The back-reference is what makes swap-removal O(1): the owner of the record that moves into
/// the vacated position is found without scanning.
///
/// # Invalid handles
///
/// Using a dead handle with [`get()`](Self::get), [`index_of()`](Self::index_of) or the
/// indexing operator is a programming error and panics. Callers that expect handles to go stale
/// use [`contains()`](Self::contains) or the `try_` variants instead. Removing through a dead
/// handle is always a harmless no-op.
///
/// # Thread safety
///
/// The map has no interior mutability; it is [`Send`] and [`Sync`] whenever `T` is, with the
/// borrow checker enforcing a single writer.
///
/// # Examples
///
/// ```
/// use slot_map::SlotMap;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Particle {
///     x: f32,
///     y: f32,
/// }
///
/// let mut particles = SlotMap::new();
///
/// let a = particles.insert(Particle { x: 0.0, y: 1.0 });
/// let b = particles.insert(Particle { x: 2.0, y: 3.0 });
///
/// particles[b].x += 1.0;
/// assert_eq!(particles[b], Particle { x: 3.0, y: 3.0 });
///
/// assert_eq!(particles.remove(a), Some(Particle { x: 0.0, y: 1.0 }));
/// assert!(!particles.contains(a));
/// assert!(particles.try_get(a).is_err());
///
/// // Removing again is a no-op.
/// assert_eq!(particles.remove(a), None);
///
/// // The surviving record is now at the front of the dense storage.
/// assert_eq!(particles.index_of(b), 0);
/// ```
#[derive(Clone, Debug)]
pub struct SlotMap<T> {
    /// Slot index of a handle to the dense position of its record.
    index_map: SparseFreeList<usize>,

    /// Generation of every slot the index map has capacity for. Never shrinks, so a slot that is
    /// trimmed from the index map and later recreated keeps counting from where it was.
    generations: Vec<Generation>,

    /// Dense position to the slot index that owns the record there.
    dense_to_sparse: DenseStore<usize>,

    data: DenseStore<T>,
}

impl<T: Copy> SlotMap<T> {
    /// Creates an empty map with the [default base capacity][DEFAULT_BASE_CAPACITY].
    ///
    /// Use [`builder()`](Self::builder) to customize the capacity.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::new_inner(DEFAULT_BASE_CAPACITY, 0)
    }

    /// Starts building a map with custom settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use new_zealand::nz;
    /// use slot_map::SlotMap;
    ///
    /// let map = SlotMap::<u64>::builder()
    ///     .base_capacity(nz!(16))
    ///     .capacity(1000)
    ///     .build();
    ///
    /// assert!(map.capacity() >= 1000);
    /// ```
    #[inline]
    pub fn builder() -> SlotMapBuilder<T> {
        SlotMapBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(base_capacity: NonZero<usize>, capacity: usize) -> Self {
        assert!(size_of::<T>() > 0, "SlotMap must have non-zero item size");

        let mut map = Self {
            index_map: SparseFreeList::with_base_capacity(base_capacity),
            generations: Vec::new(),
            dense_to_sparse: DenseStore::with_base_capacity(base_capacity),
            data: DenseStore::with_base_capacity(base_capacity),
        };

        // Never evicts anything from an empty map.
        drop(map.resize(capacity));

        map
    }

    /// The number of records in the map.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the map holds no records.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of records the dense storage can hold before it needs to grow.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Inserts a record and returns a handle to it.
    ///
    /// The record is appended at the end of the dense storage. The handle reuses the lowest
    /// vacant slot, carrying that slot's current generation.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.data.push(value);

        // Cannot wrap around because we just pushed a record.
        let dense_index = self.data.len().wrapping_sub(1);

        let index = self.index_map.add(dense_index);
        self.cover_index_map_with_generations();

        self.dense_to_sparse.push(index);

        let id = SlotId::new(index, self.generation_of(index));

        #[cfg(debug_assertions)]
        self.integrity_check();

        id
    }

    /// Whether the handle refers to a live record.
    #[must_use]
    #[inline]
    pub fn contains(&self, id: SlotId) -> bool {
        self.index_map.is_occupied(id.index())
            && self.generations.get(id.index()) == Some(&id.generation())
    }

    /// Returns the record the handle refers to.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live record.
    #[must_use]
    #[inline]
    #[track_caller]
    pub fn get(&self, id: SlotId) -> &T {
        self.data.at(self.index_of(id))
    }

    /// Returns an exclusive reference to the record the handle refers to.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live record.
    #[must_use]
    #[inline]
    #[track_caller]
    pub fn get_mut(&mut self, id: SlotId) -> &mut T {
        let dense_index = self.index_of(id);
        self.data.at_mut(dense_index)
    }

    /// Returns the record the handle refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the handle does not refer to a live record.
    #[inline]
    pub fn try_get(&self, id: SlotId) -> Result<&T> {
        let dense_index = self.try_index_of(id)?;
        Ok(self.data.at(dense_index))
    }

    /// Returns an exclusive reference to the record the handle refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the handle does not refer to a live record.
    #[inline]
    pub fn try_get_mut(&mut self, id: SlotId) -> Result<&mut T> {
        let dense_index = self.try_index_of(id)?;
        Ok(self.data.at_mut(dense_index))
    }

    /// Returns the current position of the handle's record in the dense storage.
    ///
    /// The position changes whenever records are removed or moved, unlike the handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live record.
    #[must_use]
    #[inline]
    #[track_caller]
    pub fn index_of(&self, id: SlotId) -> usize {
        self.try_index_of(id)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    /// Returns the current position of the handle's record in the dense storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the handle does not refer to a live record.
    #[inline]
    pub fn try_index_of(&self, id: SlotId) -> Result<usize> {
        if self.generations.get(id.index()) != Some(&id.generation()) {
            return Err(Error::InvalidHandle { id });
        }

        self.index_map
            .get(id.index())
            .copied()
            .ok_or(Error::InvalidHandle { id })
    }

    /// Returns the handle of the record at a position in the dense storage.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[must_use]
    #[inline]
    #[track_caller]
    pub fn id_at(&self, dense_index: usize) -> SlotId {
        self.try_id_at(dense_index)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    /// Returns the handle of the record at a position in the dense storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DenseIndexOutOfBounds`] if the position is out of bounds.
    #[inline]
    pub fn try_id_at(&self, dense_index: usize) -> Result<SlotId> {
        let index = *self
            .dense_to_sparse
            .get(dense_index)
            .ok_or(Error::DenseIndexOutOfBounds {
                index: dense_index,
                len: self.len(),
            })?;

        Ok(SlotId::new(index, self.generation_of(index)))
    }

    /// Returns the record at a position in the dense storage.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[must_use]
    #[inline]
    #[track_caller]
    pub fn get_at(&self, dense_index: usize) -> &T {
        self.data.at(dense_index)
    }

    /// Exchanges the records two handles refer to.
    ///
    /// Afterwards `a` resolves to the record `b` used to resolve to and vice versa. The handles
    /// themselves keep their dense positions, so calling this twice restores the original state.
    ///
    /// # Panics
    ///
    /// Panics if either handle does not refer to a live record.
    #[track_caller]
    pub fn swap_elements(&mut self, a: SlotId, b: SlotId) {
        let dense_a = self.index_of(a);
        let dense_b = self.index_of(b);

        self.data.swap(dense_a, dense_b);
    }

    /// Exchanges the records two handles refer to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] and changes nothing if either handle does not refer to a
    /// live record.
    pub fn try_swap_elements(&mut self, a: SlotId, b: SlotId) -> Result<()> {
        let dense_a = self.try_index_of(a)?;
        let dense_b = self.try_index_of(b)?;

        self.data.swap(dense_a, dense_b);

        Ok(())
    }

    /// Exchanges the positions of two records in the dense storage.
    ///
    /// Both handles keep resolving to their own records; only the iteration order changes.
    ///
    /// # Panics
    ///
    /// Panics if either handle does not refer to a live record.
    #[track_caller]
    pub fn swap_positions(&mut self, a: SlotId, b: SlotId) {
        let dense_a = self.index_of(a);
        let dense_b = self.index_of(b);

        self.data.swap(dense_a, dense_b);
        self.dense_to_sparse.swap(dense_a, dense_b);

        *self.index_map.at_mut(a.index()) = dense_b;
        *self.index_map.at_mut(b.index()) = dense_a;

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Removes the record the handle refers to and returns it, moving the last record of the
    /// dense storage into the vacated position.
    ///
    /// Costs O(1). The handle, and every copy of it, is dead afterwards. Returns `None` and
    /// changes nothing if the handle was already dead.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let dense_index = self.try_index_of(id).ok()?;

        // Cannot wrap around because the handle is live, so the map is not empty.
        let last_dense_index = self.data.len().wrapping_sub(1);

        let value = self.data.swap_remove(dense_index);
        self.dense_to_sparse.swap_remove(dense_index);

        if dense_index != last_dense_index {
            // The former last record now lives at dense_index; point its owner there.
            let moved_index = *self.dense_to_sparse.at(dense_index);
            *self.index_map.at_mut(moved_index) = dense_index;
        }

        self.vacate(id.index());

        #[cfg(debug_assertions)]
        self.integrity_check();

        Some(value)
    }

    /// Removes the record the handle refers to and returns it, shifting all later records down
    /// by one position.
    ///
    /// Preserves the relative order of the remaining records at the cost of O(n). Returns `None`
    /// and changes nothing if the handle was already dead.
    pub fn remove_shift(&mut self, id: SlotId) -> Option<T> {
        let dense_index = self.try_index_of(id).ok()?;

        let value = self.data.remove(dense_index);
        self.dense_to_sparse.remove(dense_index);

        let shifted = self.dense_to_sparse.iter().enumerate().skip(dense_index);

        for (shifted_dense_index, index) in shifted {
            *self.index_map.at_mut(*index) = shifted_dense_index;
        }

        self.vacate(id.index());

        #[cfg(debug_assertions)]
        self.integrity_check();

        Some(value)
    }

    /// Shortens the map to `len` records by removing records from the end of the dense storage.
    ///
    /// The removed records are returned, last dense position first. Their handles are dead.
    pub fn truncate(&mut self, len: usize) -> Vec<T> {
        let mut evicted = Vec::with_capacity(self.len().saturating_sub(len));

        while self.len() > len {
            // Cannot wrap around because the map has more than `len` records.
            let id = self.id_at(self.len().wrapping_sub(1));

            evicted.push(
                self.remove(id)
                    .expect("handle resolved from a dense position is always live"),
            );
        }

        evicted
    }

    /// Sets the capacity of the backing stores to `capacity`.
    ///
    /// Growing reserves room ahead of time. Shrinking below the current number of records first
    /// evicts records from the end of the dense storage, highest position first, through the
    /// regular removal path, so their handles are properly invalidated. The evicted records are
    /// returned in the order they were evicted.
    ///
    /// The slot index of a live handle can be higher than the number of records, in which case
    /// the slot table keeps enough capacity to retain it.
    pub fn resize(&mut self, capacity: usize) -> Vec<T> {
        let evicted = self.truncate(capacity);

        self.data.set_capacity(capacity);
        self.dense_to_sparse.set_capacity(capacity);
        self.index_map
            .set_capacity(capacity.max(self.index_map.high_watermark()));
        self.cover_index_map_with_generations();

        #[cfg(debug_assertions)]
        self.integrity_check();

        evicted
    }

    /// Reserves capacity for at least `additional` more records.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity does not fit in `usize`.
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn reserve(&mut self, additional: usize) {
        let required = self
            .len()
            .checked_add(additional)
            .expect("requested capacity exceeds size of virtual memory");

        if required > self.capacity() {
            // Never evicts because the new capacity is above the current length.
            drop(self.resize(required));
        }
    }

    /// Removes all records. Every handle issued so far is dead afterwards.
    pub fn clear(&mut self) {
        for index in &self.dense_to_sparse {
            let generation = self
                .generations
                .get_mut(*index)
                .expect("generations cover every slot of the index map");
            *generation = generation.wrapping_add(1);
        }

        self.index_map.clear();
        self.dense_to_sparse.clear();
        self.data.clear();

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// The records in dense storage order.
    #[must_use]
    #[inline]
    pub fn values(&self) -> &[T] {
        self.data.as_slice()
    }

    /// The records in dense storage order.
    ///
    /// Records may be modified in place but not reordered through this slice in a way that
    /// changes which handle they belong to; swapping two elements of the slice has the same
    /// effect as [`swap_elements()`](Self::swap_elements).
    #[must_use]
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Iterates over the handles and records in dense storage order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            owners: self.dense_to_sparse.iter(),
            values: self.data.iter(),
            generations: &self.generations,
        }
    }

    /// Iterates over the handles of all live records in dense storage order.
    pub fn ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Returns a formatter that prints the records in dense storage order.
    #[inline]
    pub fn dump(&self) -> Dump<'_, T> {
        self.data.dump()
    }

    fn generation_of(&self, index: usize) -> Generation {
        *self
            .generations
            .get(index)
            .expect("generations cover every slot of the index map")
    }

    /// Grows the generation table so that every slot the index map has capacity for has a
    /// counter. New counters start at zero; existing ones are never discarded.
    fn cover_index_map_with_generations(&mut self) {
        let required = self.index_map.capacity();

        if self.generations.len() < required {
            self.generations.resize(required, 0);
        }
    }

    /// Releases the slot and bumps its generation, killing all handles to it.
    fn vacate(&mut self, index: usize) {
        self.index_map.remove(index);

        let generation = self
            .generations
            .get_mut(index)
            .expect("generations cover every slot of the index map");
        *generation = generation.wrapping_add(1);
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        self.data.integrity_check();
        self.dense_to_sparse.integrity_check();
        self.index_map.integrity_check();

        assert_eq!(
            self.data.len(),
            self.dense_to_sparse.len(),
            "SlotMap has {} records but {} back-references",
            self.data.len(),
            self.dense_to_sparse.len()
        );

        assert_eq!(
            self.data.len(),
            self.index_map.len(),
            "SlotMap has {} records but {} occupied slots",
            self.data.len(),
            self.index_map.len()
        );

        assert!(
            self.generations.len() >= self.index_map.capacity(),
            "SlotMap has {} generations for {} slots",
            self.generations.len(),
            self.index_map.capacity()
        );

        for (dense_index, index) in self.dense_to_sparse.iter().enumerate() {
            assert_eq!(
                self.index_map.get(*index),
                Some(&dense_index),
                "SlotMap dense position {dense_index} is owned by slot {index} which does not point back to it"
            );
        }
    }
}

impl<T: Copy> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Index<SlotId> for SlotMap<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: SlotId) -> &Self::Output {
        self.get(index)
    }
}

impl<T: Copy> IndexMut<SlotId> for SlotMap<T> {
    #[track_caller]
    fn index_mut(&mut self, index: SlotId) -> &mut Self::Output {
        self.get_mut(index)
    }
}

impl<'a, T: Copy> IntoIterator for &'a SlotMap<T> {
    type Item = (SlotId, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the handles and records of a [`SlotMap`], created by [`SlotMap::iter()`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    owners: slice::Iter<'a, usize>,
    values: slice::Iter<'a, T>,
    generations: &'a [Generation],
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.owners.next()?;
        let value = self.values.next()?;
        let generation = *self.generations.get(index)?;

        Some((SlotId::new(index, generation), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::modulo_arithmetic,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;

    use new_zealand::nz;
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Record {
        f: i32,
        y: f64,
    }

    fn record(i: i32) -> Record {
        Record {
            f: i,
            y: f64::from(10 - i),
        }
    }

    /// Checks that every live handle resolves to a dense position whose back-reference is the
    /// handle's own slot.
    fn assert_triangle<T: Copy>(map: &SlotMap<T>, ids: &[SlotId]) {
        for id in ids.iter().filter(|id| map.contains(**id)) {
            let dense_index = map.index_of(*id);
            assert_eq!(map.dense_to_sparse.as_slice()[dense_index], id.index());
            assert_eq!(map.generations[id.index()], id.generation());
        }
    }

    #[test]
    fn thread_safety_assertions() {
        assert_impl_all!(SlotMap<u32>: Send, Sync, Debug, Clone, Default);
        assert_impl_all!(Iter<'static, u32>: Send, Sync);
        assert_not_impl_any!(SlotMap<Cell<u32>>: Sync);
    }

    #[test]
    fn smoke_test() {
        let mut map = SlotMap::new();

        assert!(map.is_empty());

        let a = map.insert(record(1));
        let b = map.insert(record(2));
        let c = map.insert(record(3));

        assert_eq!(map.len(), 3);
        assert_eq!(*map.get(a), record(1));
        assert_eq!(map[b], record(2));
        assert_eq!(map.try_get(c), Ok(&record(3)));

        map.get_mut(b).f = 20;
        assert_eq!(map[b].f, 20);

        map[c].f = 30;
        assert_eq!(map.try_get_mut(c).map(|r| r.f), Ok(30));

        assert_eq!(map.remove(b).map(|r| r.f), Some(20));
        assert_eq!(map.len(), 2);
        assert!(map.contains(a));
        assert!(!map.contains(b));
        assert!(map.contains(c));
    }

    #[test]
    fn new_handles_start_at_generation_zero() {
        let mut map = SlotMap::new();

        for expected_index in 0..10 {
            let id = map.insert(expected_index);
            assert_eq!(id.index(), expected_index);
            assert_eq!(id.generation(), 0);
        }
    }

    #[test]
    fn remove_odd_keeps_even() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..10).map(|i| map.insert(record(i))).collect();

        for id in ids.iter().skip(1).step_by(2) {
            assert!(map.remove(*id).is_some());
        }

        for (i, id) in ids.iter().enumerate() {
            if i % 2 == 0 {
                assert!(map.contains(*id));
                assert_eq!(map[*id], record(i32::try_from(i).unwrap()));
            } else {
                assert!(!map.contains(*id));
            }
        }

        assert_triangle(&map, &ids);

        let new_id = map.insert(record(42));
        assert_eq!(map[new_id], record(42));
        assert_triangle(&map, &[new_id]);
    }

    #[test]
    fn generation_increases_with_each_reuse() {
        let mut map = SlotMap::new();
        let mut previous = Vec::new();

        for expected_generation in 0..5 {
            let id = map.insert(expected_generation);

            assert_eq!(id.index(), 0);
            assert_eq!(id.generation(), expected_generation);

            for old in &previous {
                assert!(!map.contains(*old));
            }

            map.remove(id);
            previous.push(id);
        }
    }

    #[test]
    fn remove_relocates_last_record() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..5).map(|i| map.insert(i * 100)).collect();

        map.remove(ids[1]);

        assert_eq!(map.values(), &[0, 400, 200, 300]);
        assert_eq!(map.index_of(ids[4]), 1);
        assert_eq!(map[ids[4]], 400);
        assert_eq!(map[ids[0]], 0);
        assert_eq!(map[ids[2]], 200);
        assert_eq!(map[ids[3]], 300);
        assert_triangle(&map, &ids);
    }

    #[test]
    fn remove_last_record_moves_nothing() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..3).map(|i| map.insert(i)).collect();

        map.remove(ids[2]);

        assert_eq!(map.values(), &[0, 1]);
        assert_triangle(&map, &ids);
    }

    #[test]
    fn remove_dead_handle_is_noop() {
        let mut map = SlotMap::new();
        let a = map.insert(1);
        let b = map.insert(2);

        assert_eq!(map.remove(a), Some(1));
        assert_eq!(map.remove(a), None);
        assert_eq!(map.remove_shift(a), None);
        assert_eq!(map.remove(SlotId::from_parts(99, 0)), None);

        assert_eq!(map.len(), 1);
        assert_eq!(map[b], 2);
    }

    #[test]
    fn remove_shift_preserves_order() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..6).map(|i| map.insert(i)).collect();

        assert_eq!(map.remove_shift(ids[1]), Some(1));
        assert_eq!(map.values(), &[0, 2, 3, 4, 5]);

        assert_eq!(map.remove_shift(ids[4]), Some(4));
        assert_eq!(map.values(), &[0, 2, 3, 5]);

        for (i, id) in ids.iter().enumerate() {
            if i == 1 || i == 4 {
                assert!(!map.contains(*id));
            } else {
                assert_eq!(map[*id], i32::try_from(i).unwrap());
            }
        }

        assert_eq!(map.index_of(ids[5]), 3);
        assert_triangle(&map, &ids);
    }

    #[test]
    fn stale_handle_does_not_resolve_to_reused_slot() {
        let mut map = SlotMap::new();
        let old = map.insert('a');

        map.remove(old);
        let new = map.insert('b');

        assert_eq!(new.index(), old.index());
        assert!(new.generation() > old.generation());
        assert!(!map.contains(old));
        assert_eq!(map.try_get(old), Err(Error::InvalidHandle { id: old }));
        assert_eq!(map[new], 'b');
    }

    #[test]
    fn never_issued_handle_is_invalid() {
        let mut map = SlotMap::new();
        map.insert(1_u8);

        assert!(!map.contains(SlotId::from_parts(0, 1)));
        assert!(!map.contains(SlotId::from_parts(1, 0)));
        assert!(!map.contains(SlotId::from_parts(usize::MAX, 0)));
        let never_issued = SlotId::from_parts(3, 0);
        assert_eq!(
            map.try_index_of(never_issued),
            Err(Error::InvalidHandle { id: never_issued })
        );
    }

    #[test]
    fn generation_survives_slot_trimming() {
        let mut map = SlotMap::new();

        let a = map.insert(1);
        let b = map.insert(2);

        // Removing the top slot trims the slot table all the way down.
        map.remove(a);
        map.remove(b);

        let c = map.insert(3);
        let d = map.insert(4);

        assert_eq!((c.index(), d.index()), (0, 1));
        assert_eq!((c.generation(), d.generation()), (1, 1));
        assert!(!map.contains(a));
        assert!(!map.contains(b));
    }

    #[test]
    fn swap_elements_exchanges_values() {
        let mut map = SlotMap::new();
        let a = map.insert(1);
        let b = map.insert(2);
        let c = map.insert(3);

        map.swap_elements(a, c);

        assert_eq!(map[a], 3);
        assert_eq!(map[c], 1);
        assert_eq!(map.index_of(a), 0);
        assert_eq!(map.index_of(c), 2);
        assert_triangle(&map, &[a, b, c]);

        map.swap_elements(a, c);

        assert_eq!(map[a], 1);
        assert_eq!(map[c], 3);

        // Removal afterwards still finds the right owners.
        map.remove(a);
        assert_eq!(map[c], 3);
        assert_eq!(map[b], 2);
        assert_triangle(&map, &[a, b, c]);
    }

    #[test]
    fn swap_positions_keeps_handles_on_their_records() {
        let mut map = SlotMap::new();
        let a = map.insert(1);
        let b = map.insert(2);
        let c = map.insert(3);

        map.swap_positions(a, c);

        assert_eq!(map.values(), &[3, 2, 1]);
        assert_eq!(map[a], 1);
        assert_eq!(map[c], 3);
        assert_eq!(map.index_of(a), 2);
        assert_eq!(map.index_of(c), 0);
        assert_triangle(&map, &[a, b, c]);

        map.remove(c);
        assert_eq!(map.values(), &[1, 2]);
        assert_eq!(map[a], 1);
        assert_eq!(map[b], 2);
        assert_triangle(&map, &[a, b, c]);
    }

    #[test]
    fn try_swap_elements_with_dead_handle_changes_nothing() {
        let mut map = SlotMap::new();
        let a = map.insert(1);
        let b = map.insert(2);
        map.remove(b);

        assert_eq!(
            map.try_swap_elements(a, b),
            Err(Error::InvalidHandle { id: b })
        );
        assert_eq!(map[a], 1);
    }

    #[test]
    fn id_at_maps_dense_positions_back_to_handles() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..4).map(|i| map.insert(i)).collect();
        map.remove(ids[0]);

        assert_eq!(map.id_at(0), ids[3]);
        assert_eq!(*map.get_at(0), 3);
        assert_eq!(
            map.try_id_at(3),
            Err(Error::DenseIndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn iter_yields_handles_in_dense_order() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..4).map(|i| map.insert(i * 10)).collect();
        map.remove(ids[1]);

        let collected: Vec<_> = map.iter().map(|(id, value)| (id, *value)).collect();

        assert_eq!(collected, vec![(ids[0], 0), (ids[3], 30), (ids[2], 20)]);
        assert_eq!(map.iter().len(), 3);
        assert_eq!(map.ids().collect::<Vec<_>>(), vec![ids[0], ids[3], ids[2]]);
        assert_eq!((&map).into_iter().count(), 3);
    }

    #[test]
    fn truncate_evicts_from_the_end() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..6).map(|i| map.insert(i)).collect();

        let evicted = map.truncate(3);

        assert_eq!(evicted, vec![5, 4, 3]);
        assert_eq!(map.len(), 3);
        assert!(ids[..3].iter().all(|id| map.contains(*id)));
        assert!(ids[3..].iter().all(|id| !map.contains(*id)));
        assert_triangle(&map, &ids);
    }

    #[test]
    fn resize_to_shrink_evicts_and_keeps_invariants() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..10).map(|i| map.insert(i)).collect();

        // Scatter the records so that dense order differs from slot order.
        map.remove(ids[0]);
        map.remove(ids[2]);
        map.swap_positions(ids[5], ids[7]);

        let survivors_before: Vec<SlotId> = map.ids().collect();
        let evicted = map.resize(3);

        assert_eq!(evicted.len(), 5);
        assert_eq!(map.len(), 3);

        for (dense_index, id) in survivors_before.iter().enumerate() {
            assert_eq!(map.contains(*id), dense_index < 3);
        }

        assert_triangle(&map, &ids);
    }

    #[test]
    fn resize_keeps_high_slots_addressable() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..10).map(|i| map.insert(i)).collect();

        for id in &ids[..8] {
            map.remove(*id);
        }

        // Two records remain, but in slots 8 and 9.
        let evicted = map.resize(2);

        assert!(evicted.is_empty());
        assert_eq!(map[ids[8]], 8);
        assert_eq!(map[ids[9]], 9);
        assert_triangle(&map, &ids);
    }

    #[test]
    fn resize_to_grow_reserves() {
        let mut map = SlotMap::<u16>::new();

        let evicted = map.resize(100);

        assert!(evicted.is_empty());
        assert_eq!(map.capacity(), 100);
    }

    #[test]
    fn reserve_grows_capacity() {
        let mut map = SlotMap::<u16>::new();
        map.insert(1);

        map.reserve(50);
        assert!(map.capacity() >= 51);

        let capacity = map.capacity();
        map.reserve(10);
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn clear_kills_every_handle() {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..8).map(|i| map.insert(i)).collect();

        map.clear();

        assert!(map.is_empty());
        assert!(ids.iter().all(|id| !map.contains(*id)));

        let fresh = map.insert(100);
        assert_eq!(fresh.index(), 0);
        assert_eq!(fresh.generation(), 1);
    }

    #[test]
    fn builder_applies_settings() {
        let map = SlotMap::<u32>::builder()
            .base_capacity(nz!(3))
            .capacity(40)
            .build();

        assert_eq!(map.capacity(), 40);
        assert_eq!(map.index_map.capacity(), 40);
        assert_eq!(map.data.base_capacity(), nz!(3));
    }

    #[test]
    fn dump_prints_dense_order() {
        let mut map = SlotMap::new();
        let a = map.insert(1);
        map.insert(2);
        map.insert(3);

        map.remove(a);

        assert_eq!(map.dump().to_string(), "{ 3, 2 }");
    }

    #[test]
    #[should_panic]
    fn get_dead_handle_panics() {
        let mut map = SlotMap::new();
        let id = map.insert(1);
        map.remove(id);

        _ = map.get(id);
    }

    #[test]
    #[should_panic]
    fn index_dead_handle_panics() {
        let mut map = SlotMap::new();
        let id = map.insert(1);
        map.remove(id);

        _ = map[id];
    }

    #[test]
    #[should_panic]
    fn index_of_never_issued_handle_panics() {
        let map = SlotMap::<u8>::new();

        _ = map.index_of(SlotId::from_parts(0, 0));
    }

    #[test]
    #[should_panic]
    fn swap_elements_with_dead_handle_panics() {
        let mut map = SlotMap::new();
        let a = map.insert(1);
        let b = map.insert(2);
        map.remove(b);

        map.swap_elements(a, b);
    }

    #[test]
    #[should_panic]
    fn id_at_out_of_bounds_panics() {
        let map = SlotMap::<u8>::new();

        _ = map.id_at(0);
    }

    #[test]
    #[should_panic]
    fn get_at_out_of_bounds_panics() {
        let mut map = SlotMap::new();
        map.insert(1_u8);

        _ = map.get_at(1);
    }

    #[test]
    #[should_panic]
    fn zero_sized_records_panic() {
        drop(SlotMap::<()>::new());
    }
}
