use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::iter::{Enumerate, FusedIterator, Zip};
use std::num::NonZero;
use std::slice;

use crate::{DEFAULT_BASE_CAPACITY, capacity};

/// A sparse collection of fixed-size records addressed by slot index, where vacated slots are
/// reused by later insertions.
///
/// Inserting a record returns the slot it was stored in. The slot index stays the same until the
/// record is removed, no matter what happens to other slots. Vacated slots are reused
/// lowest-index-first, so the occupied slots stay as densely packed as the removal pattern allows.
///
/// All slots below the [high watermark][Self::high_watermark] are either occupied or vacant;
/// slots at or above it are unused capacity. Whenever the highest occupied slot is removed, the
/// high watermark drops back past any trailing vacant slots and the capacity shrinks according to
/// the same policy as [`DenseStore`][crate::DenseStore].
///
/// Removing a vacant or out-of-range slot is a no-op, so removals are idempotent.
///
/// # Examples
///
/// ```
/// use slot_map::SparseFreeList;
///
/// let mut list = SparseFreeList::new();
///
/// let a = list.add("a");
/// let b = list.add("b");
/// let c = list.add("c");
/// assert_eq!((a, b, c), (0, 1, 2));
///
/// list.remove(a);
/// list.remove(b);
/// assert_eq!(list.get(a), None);
///
/// // The lowest vacant slot is reused first.
/// assert_eq!(list.add("d"), 0);
/// assert_eq!(list.get(c), Some(&"c"));
/// ```
#[derive(Clone, Debug)]
pub struct SparseFreeList<T> {
    /// One entry per slot below the high watermark. Entries of vacant slots hold stale records.
    slots: Vec<T>,

    /// Occupancy flag for every slot below the high watermark. The last flag, if any, is always
    /// `true` because trailing vacant slots are trimmed away.
    occupied: Vec<bool>,

    /// Every vacant slot below the high watermark, exactly once. Popping yields the lowest.
    vacant: BinaryHeap<Reverse<usize>>,

    /// Number of occupied slots.
    count: usize,

    capacity: usize,

    base_capacity: NonZero<usize>,
}

impl<T: Copy> SparseFreeList<T> {
    /// Creates an empty list with the [default base capacity][DEFAULT_BASE_CAPACITY].
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_capacity(DEFAULT_BASE_CAPACITY)
    }

    /// Creates an empty list that starts with, and never shrinks below, `base_capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn with_base_capacity(base_capacity: NonZero<usize>) -> Self {
        assert!(
            size_of::<T>() > 0,
            "SparseFreeList must have non-zero item size"
        );

        Self {
            slots: Vec::with_capacity(base_capacity.get()),
            occupied: Vec::with_capacity(base_capacity.get()),
            vacant: BinaryHeap::new(),
            count: 0,
            capacity: base_capacity.get(),
            base_capacity,
        }
    }

    /// The number of occupied slots.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no slot is occupied.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// One past the highest occupied slot, or zero if the list is empty.
    #[must_use]
    #[inline]
    pub fn high_watermark(&self) -> usize {
        self.slots.len()
    }

    /// The number of slots the list can hold before it needs to grow.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The capacity the list starts with and never shrinks below.
    #[must_use]
    #[inline]
    pub fn base_capacity(&self) -> NonZero<usize> {
        self.base_capacity
    }

    /// Whether `slot` holds a record. Slots out of range are never occupied.
    #[must_use]
    #[inline]
    pub fn is_occupied(&self, slot: usize) -> bool {
        self.occupied.get(slot).copied().unwrap_or(false)
    }

    /// Stores a record in the lowest vacant slot, or in a new slot at the high watermark if
    /// there are no vacant slots, and returns the slot index.
    ///
    /// The capacity doubles if a new slot is needed and the list is full.
    pub fn add(&mut self, value: T) -> usize {
        let slot = if let Some(Reverse(slot)) = self.vacant.pop() {
            *self
                .slots
                .get_mut(slot)
                .expect("vacant slots are always below the high watermark") = value;
            *self
                .occupied
                .get_mut(slot)
                .expect("vacant slots are always below the high watermark") = true;

            slot
        } else {
            if self.slots.len() == self.capacity {
                self.set_capacity_exact(capacity::grown(self.capacity));
            }

            self.slots.push(value);
            self.occupied.push(true);

            // Cannot wrap around because we just pushed an entry.
            self.slots.len().wrapping_sub(1)
        };

        // Cannot overflow because that would imply more slots than fit in virtual memory.
        self.count = self.count.wrapping_add(1);

        #[cfg(debug_assertions)]
        self.integrity_check();

        slot
    }

    /// Returns the record in `slot` without checking whether the slot is occupied.
    ///
    /// For a vacant slot this returns the stale record that was last stored there. This is meant
    /// for callers that already know the slot is occupied; use [`get()`](Self::get) otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is at or above the high watermark.
    #[must_use]
    #[inline]
    pub fn at(&self, slot: usize) -> &T {
        let high_watermark = self.high_watermark();

        self.slots
            .get(slot)
            .unwrap_or_else(|| beyond_high_watermark(slot, high_watermark))
    }

    /// Returns an exclusive reference to the record in `slot` without checking whether the slot
    /// is occupied.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is at or above the high watermark.
    #[must_use]
    #[inline]
    pub fn at_mut(&mut self, slot: usize) -> &mut T {
        let high_watermark = self.high_watermark();

        self.slots
            .get_mut(slot)
            .unwrap_or_else(|| beyond_high_watermark(slot, high_watermark))
    }

    /// Returns the record in `slot`, or `None` if the slot is vacant or out of range.
    #[must_use]
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&T> {
        if self.is_occupied(slot) {
            self.slots.get(slot)
        } else {
            None
        }
    }

    /// Returns an exclusive reference to the record in `slot`, or `None` if the slot is vacant
    /// or out of range.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        if self.is_occupied(slot) {
            self.slots.get_mut(slot)
        } else {
            None
        }
    }

    /// Vacates `slot` and returns the record that was stored there.
    ///
    /// Returns `None` and does nothing if the slot is already vacant or out of range.
    pub fn remove(&mut self, slot: usize) -> Option<T> {
        let occupied = self.occupied.get_mut(slot)?;

        if !*occupied {
            return None;
        }

        *occupied = false;

        let value = *self
            .slots
            .get(slot)
            .expect("occupancy flags and slots always have the same length");

        // Cannot underflow because we just vacated an occupied slot.
        self.count = self.count.wrapping_sub(1);

        if slot.wrapping_add(1) == self.high_watermark() {
            self.trim_vacant_tail();
        } else {
            self.vacant.push(Reverse(slot));
        }

        #[cfg(debug_assertions)]
        self.integrity_check();

        Some(value)
    }

    /// Sets the capacity of the list to `capacity`, but never below the base capacity.
    ///
    /// If the new capacity is below the high watermark, the slots at or beyond the new capacity
    /// are discarded as if their records had been removed.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(self.base_capacity.get());

        if capacity < self.high_watermark() {
            self.slots.truncate(capacity);
            self.occupied.truncate(capacity);
            self.count = self.occupied.iter().filter(|occupied| **occupied).count();

            self.trim_vacant_tail();

            let high_watermark = self.high_watermark();
            self.vacant.retain(|Reverse(slot)| *slot < high_watermark);
        }

        self.set_capacity_exact(capacity);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Vacates every slot and returns the list to its base capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.occupied.clear();
        self.vacant.clear();
        self.count = 0;

        self.set_capacity_exact(self.base_capacity.get());
    }

    /// Iterates over the occupied slots in ascending slot order, yielding the slot index and the
    /// record stored there.
    #[inline]
    pub fn iter(&self) -> OccupiedSlots<'_, T> {
        OccupiedSlots {
            inner: self.slots.iter().zip(self.occupied.iter()).enumerate(),
        }
    }

    /// Drops all trailing vacant slots, lowering the high watermark to one past the highest
    /// occupied slot, then shrinks the capacity if the list has become sparse.
    fn trim_vacant_tail(&mut self) {
        let previous_high_watermark = self.high_watermark();

        while self.occupied.last() == Some(&false) {
            self.occupied.pop();
            self.slots.pop();
        }

        let high_watermark = self.high_watermark();

        // If anything below the previous top slot was trimmed, the vacant set now refers to
        // slots that no longer exist.
        if high_watermark.wrapping_add(1) < previous_high_watermark {
            self.vacant.retain(|Reverse(slot)| *slot < high_watermark);
        }

        if let Some(capacity) = capacity::shrunk(high_watermark, self.capacity, self.base_capacity)
        {
            self.set_capacity_exact(capacity);
        }
    }

    fn set_capacity_exact(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.slots.len());

        // Cannot underflow because capacity is never below the high watermark.
        let additional = capacity.wrapping_sub(self.slots.len());

        if capacity > self.slots.capacity() {
            self.slots.reserve_exact(additional);
        } else {
            self.slots.shrink_to(capacity);
        }

        if capacity > self.occupied.capacity() {
            self.occupied.reserve_exact(additional);
        } else {
            self.occupied.shrink_to(capacity);
        }

        self.capacity = capacity;
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    #[allow(
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "integrity check needs array access"
    )]
    pub(crate) fn integrity_check(&self) {
        let high_watermark = self.slots.len();

        assert_eq!(
            self.occupied.len(),
            high_watermark,
            "SparseFreeList has {} occupancy flags for {} slots",
            self.occupied.len(),
            high_watermark
        );

        assert!(
            high_watermark <= self.capacity,
            "SparseFreeList high watermark {high_watermark} exceeds its capacity {}",
            self.capacity
        );

        assert!(
            self.capacity >= self.base_capacity.get(),
            "SparseFreeList capacity {} is below its base capacity {}",
            self.capacity,
            self.base_capacity
        );

        assert!(
            self.occupied.last().is_none_or(|occupied| *occupied),
            "SparseFreeList slot {} below the high watermark is vacant",
            high_watermark.saturating_sub(1)
        );

        let observed_count = self.occupied.iter().filter(|occupied| **occupied).count();

        assert_eq!(
            self.count, observed_count,
            "SparseFreeList count {} does not match the observed occupied count {}",
            self.count, observed_count
        );

        let mut observed_vacant = vec![false; high_watermark];

        for Reverse(slot) in &self.vacant {
            assert!(
                *slot < high_watermark,
                "SparseFreeList vacant slot {slot} is at or above the high watermark {high_watermark}"
            );

            assert!(
                !self.occupied[*slot],
                "SparseFreeList vacant set contains occupied slot {slot}"
            );

            assert!(
                !observed_vacant[*slot],
                "SparseFreeList vacant set contains slot {slot} more than once"
            );

            observed_vacant[*slot] = true;
        }

        assert_eq!(
            self.vacant.len(),
            high_watermark - observed_count,
            "SparseFreeList vacant set does not cover all vacant slots"
        );
    }
}

impl<T: Copy> Default for SparseFreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Copy> IntoIterator for &'a SparseFreeList<T> {
    type Item = (usize, &'a T);
    type IntoIter = OccupiedSlots<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the occupied slots of a [`SparseFreeList`], created by
/// [`SparseFreeList::iter()`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct OccupiedSlots<'a, T> {
    inner: Enumerate<Zip<slice::Iter<'a, T>, slice::Iter<'a, bool>>>,
}

impl<'a, T> Iterator for OccupiedSlots<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find_map(|(slot, (value, occupied))| occupied.then_some((slot, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<T> FusedIterator for OccupiedSlots<'_, T> {}

#[cold]
#[track_caller]
fn beyond_high_watermark(slot: usize, high_watermark: usize) -> ! {
    panic!("slot {slot} is beyond the high watermark {high_watermark} of SparseFreeList");
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SparseFreeList<u32>: Send, Sync, Debug, Clone);

    fn list_of(count: u32) -> SparseFreeList<u32> {
        let mut list = SparseFreeList::new();

        for value in 0..count {
            list.add(value);
        }

        list
    }

    #[test]
    fn smoke_test() {
        let mut list = SparseFreeList::new();

        assert!(list.is_empty());
        assert_eq!(list.high_watermark(), 0);

        let a = list.add(100_u64);
        let b = list.add(200);

        assert_eq!(list.len(), 2);
        assert_eq!(list.high_watermark(), 2);
        assert_eq!(list.get(a), Some(&100));
        assert_eq!(*list.at(b), 200);

        *list.at_mut(b) = 201;
        assert_eq!(list.get(b), Some(&201));

        assert_eq!(list.remove(a), Some(100));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(a), None);
        assert!(!list.is_occupied(a));
        assert!(list.is_occupied(b));
    }

    #[test]
    fn add_fills_slots_in_order() {
        let mut list = SparseFreeList::new();

        for expected in 0..12 {
            assert_eq!(list.add(expected * 10), expected);
        }
    }

    #[test]
    fn reuses_lowest_vacant_slot_first() {
        let mut list = list_of(8);

        list.remove(5);
        list.remove(1);
        list.remove(3);

        assert_eq!(list.add(101), 1);
        assert_eq!(list.add(103), 3);
        assert_eq!(list.add(105), 5);
        assert_eq!(list.add(108), 8);

        assert_eq!(list.get(1), Some(&101));
        assert_eq!(list.get(3), Some(&103));
        assert_eq!(list.get(5), Some(&105));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut list = list_of(3);

        assert_eq!(list.remove(1), Some(1));
        assert_eq!(list.remove(1), None);
        assert_eq!(list.remove(99), None);

        assert_eq!(list.len(), 2);
        assert_eq!(list.high_watermark(), 3);
    }

    #[test]
    fn removing_top_slot_trims_trailing_vacant_slots() {
        let mut list = list_of(6);

        list.remove(2);
        list.remove(4);
        list.remove(3);
        assert_eq!(list.high_watermark(), 6);

        list.remove(5);
        assert_eq!(list.high_watermark(), 2);

        // Trimmed slots are no longer vacant below the watermark, so new records extend it.
        assert_eq!(list.add(20), 2);
        assert_eq!(list.add(30), 3);
        assert_eq!(list.high_watermark(), 4);
    }

    #[test]
    fn removing_all_empties_the_list() {
        let mut list = list_of(4);

        for slot in 0..4 {
            list.remove(slot);
        }

        assert!(list.is_empty());
        assert_eq!(list.high_watermark(), 0);
        assert_eq!(list.add(7), 0);
    }

    #[test]
    fn capacity_grows_and_shrinks() {
        let mut list = SparseFreeList::with_base_capacity(nz!(2));

        for value in 0..16_u32 {
            list.add(value);
        }
        assert_eq!(list.capacity(), 16);

        // Vacating low slots does not lower the watermark, so the capacity stays.
        for slot in 0..15 {
            list.remove(slot);
        }
        assert_eq!(list.capacity(), 16);
        assert_eq!(list.high_watermark(), 16);

        list.remove(15);
        assert_eq!(list.high_watermark(), 0);
        assert_eq!(list.capacity(), 8);
    }

    #[test]
    fn at_returns_stale_record_of_vacant_slot() {
        let mut list = list_of(3);

        list.remove(1);

        assert_eq!(*list.at(1), 1);
        assert_eq!(list.get(1), None);
        assert_eq!(list.get_mut(1), None);
    }

    #[test]
    #[should_panic]
    fn at_beyond_high_watermark_panics() {
        let list = list_of(3);

        _ = list.at(3);
    }

    #[test]
    fn get_beyond_high_watermark_is_none() {
        let list = list_of(3);

        assert_eq!(list.get(3), None);
        assert_eq!(list.get(usize::MAX), None);
    }

    #[test]
    fn set_capacity_reserves() {
        let mut list = list_of(3);

        list.set_capacity(64);
        assert_eq!(list.capacity(), 64);

        for value in 3..64 {
            list.add(value);
        }
        assert_eq!(list.capacity(), 64);
    }

    #[test]
    fn set_capacity_below_watermark_discards_slots() {
        let mut list = list_of(10);

        list.remove(1);
        list.remove(6);

        list.set_capacity(7);

        assert_eq!(list.capacity(), 7);
        assert_eq!(list.high_watermark(), 6);
        assert_eq!(list.len(), 5);
        assert_eq!(list.get(7), None);

        // Slot 1 is still vacant and is reused first, then the list extends from slot 6.
        assert_eq!(list.add(11), 1);
        assert_eq!(list.add(12), 6);
    }

    #[test]
    fn set_capacity_never_below_base() {
        let mut list = list_of(2);

        list.set_capacity(0);

        assert_eq!(list.capacity(), DEFAULT_BASE_CAPACITY.get());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn iter_visits_occupied_slots_only() {
        let mut list = list_of(5);

        list.remove(0);
        list.remove(3);

        let visited: Vec<(usize, u32)> = list.iter().map(|(slot, value)| (slot, *value)).collect();
        assert_eq!(visited, vec![(1, 1), (2, 2), (4, 4)]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut list = list_of(30);

        list.remove(3);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.high_watermark(), 0);
        assert_eq!(list.capacity(), DEFAULT_BASE_CAPACITY.get());
        assert_eq!(list.add(1), 0);
    }

    #[test]
    #[should_panic]
    fn zero_sized_records_panic() {
        drop(SparseFreeList::<()>::new());
    }
}
