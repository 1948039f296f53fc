use std::num::NonZero;
use std::slice;

use crate::{DEFAULT_BASE_CAPACITY, Dump, capacity};

/// A contiguous, growable sequence of fixed-size records with O(1) indexed access.
///
/// Works similar to a `Vec` but manages its capacity with an explicit policy shared with
/// [`SparseFreeList`][crate::SparseFreeList]: the capacity doubles when a record is pushed into a
/// full store and halves when, after a removal, fewer than a quarter of the capacity is in use.
/// The capacity never drops below the base capacity of the store (by default
/// [`DEFAULT_BASE_CAPACITY`]).
///
/// Two removal flavors are offered:
///
/// * [`remove()`](Self::remove) preserves the order of the remaining records by shifting the
///   tail of the store, costing O(n).
/// * [`swap_remove()`](Self::swap_remove) moves the last record into the vacated position,
///   costing O(1) but changing the order.
///
/// Records are `Copy`. They are moved around by copying and are never dropped.
///
/// # Panics
///
/// Accessing a position outside `[0, len)` through the unchecked accessors is a programming
/// error and panics. Use [`get()`](Self::get) when the position may be out of bounds.
///
/// # Examples
///
/// ```
/// use slot_map::DenseStore;
///
/// let mut store = DenseStore::new();
///
/// store.push('a');
/// store.push('b');
/// store.push('c');
///
/// assert_eq!(store.swap_remove(0), 'a');
/// assert_eq!(store.as_slice(), &['c', 'b']);
///
/// assert_eq!(store.remove(0), 'c');
/// assert_eq!(store.as_slice(), &['b']);
/// ```
#[derive(Clone, Debug)]
pub struct DenseStore<T> {
    items: Vec<T>,

    /// The logical capacity, as governed by the resize policy. The backing `Vec` may have
    /// allocated more than this but never less.
    capacity: usize,

    base_capacity: NonZero<usize>,
}

impl<T: Copy> DenseStore<T> {
    /// Creates an empty store with the [default base capacity][DEFAULT_BASE_CAPACITY].
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_capacity(DEFAULT_BASE_CAPACITY)
    }

    /// Creates an empty store that starts with, and never shrinks below, `base_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn with_base_capacity(base_capacity: NonZero<usize>) -> Self {
        assert!(
            size_of::<T>() > 0,
            "DenseStore must have non-zero item size"
        );

        Self {
            items: Vec::with_capacity(base_capacity.get()),
            capacity: base_capacity.get(),
            base_capacity,
        }
    }

    /// The number of records in the store.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The number of records the store can hold before it needs to grow.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The capacity the store starts with and never shrinks below.
    #[must_use]
    #[inline]
    pub fn base_capacity(&self) -> NonZero<usize> {
        self.base_capacity
    }

    /// Returns the record at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    #[inline]
    pub fn at(&self, index: usize) -> &T {
        let len = self.len();

        self.items
            .get(index)
            .unwrap_or_else(|| out_of_bounds(index, len))
    }

    /// Returns an exclusive reference to the record at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();

        self.items
            .get_mut(index)
            .unwrap_or_else(|| out_of_bounds(index, len))
    }

    /// Returns the record at `index` or `None` if `index` is out of bounds.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns an exclusive reference to the record at `index` or `None` if `index` is out
    /// of bounds.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Appends a record at the end of the store, doubling the capacity first if the store is full.
    ///
    /// The new record is at position `len() - 1` until the next mutation of the store.
    pub fn push(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.set_capacity_exact(capacity::grown(self.capacity));
        }

        self.items.push(value);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Removes and returns the last record, or `None` if the store is empty.
    pub fn pop(&mut self) -> Option<T> {
        let value = self.items.pop()?;
        self.shrink_if_sparse();

        Some(value)
    }

    /// Removes the record at `index`, shifting all records after it one position to the left.
    ///
    /// This preserves the order of the remaining records and costs O(n - index).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> T {
        self.assert_in_bounds(index);

        let value = self.items.remove(index);
        self.shrink_if_sparse();

        value
    }

    /// Removes the record at `index`, moving the last record into its place.
    ///
    /// Costs O(1) but does not preserve the order of the remaining records. If `index` is the
    /// last position, nothing is moved.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn swap_remove(&mut self, index: usize) -> T {
        self.assert_in_bounds(index);

        let value = self.items.swap_remove(index);
        self.shrink_if_sparse();

        value
    }

    /// Exchanges the records at two positions.
    ///
    /// # Panics
    ///
    /// Panics if either position is out of bounds.
    pub fn swap(&mut self, index_a: usize, index_b: usize) {
        self.assert_in_bounds(index_a);
        self.assert_in_bounds(index_b);

        self.items.swap(index_a, index_b);
    }

    /// Sets the length of the store to `len`.
    ///
    /// New positions are filled with copies of `fill`. The store grows as needed to fit and
    /// shrinks according to its resize policy if records were cut off.
    pub fn resize(&mut self, len: usize, fill: T) {
        if len > self.capacity {
            self.set_capacity_exact(capacity::grown_to_fit(self.capacity, len));
        }

        self.items.resize(len, fill);
        self.shrink_if_sparse();

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Shortens the store to `len` records, keeping the first `len`.
    ///
    /// Has no effect if the store is already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
        self.shrink_if_sparse();
    }

    /// Removes all records and returns the store to its base capacity.
    pub fn clear(&mut self) {
        self.items.clear();
        self.set_capacity_exact(self.base_capacity.get());
    }

    /// Sets the capacity of the store.
    ///
    /// The resulting capacity is never less than the current length or the base capacity, so
    /// this can be used both to reserve room ahead of time and to release unused memory.
    pub fn set_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(self.len()).max(self.base_capacity.get());
        self.set_capacity_exact(capacity);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// The records of the store, in order.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The records of the store, in order.
    #[must_use]
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Iterates over the records of the store, in order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates over exclusive references to the records of the store, in order.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Returns a formatter that prints the records of the store.
    #[inline]
    pub fn dump(&self) -> Dump<'_, T> {
        Dump::new(&self.items)
    }

    fn assert_in_bounds(&self, index: usize) {
        let len = self.len();

        if index >= len {
            out_of_bounds(index, len);
        }
    }

    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    fn shrink_if_sparse(&mut self) {
        if let Some(capacity) = capacity::shrunk(self.len(), self.capacity, self.base_capacity) {
            self.set_capacity_exact(capacity);
        }
    }

    fn set_capacity_exact(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.items.len());

        if capacity > self.items.capacity() {
            // Cannot underflow because capacity is never below the length.
            self.items
                .reserve_exact(capacity.wrapping_sub(self.items.len()));
        } else {
            self.items.shrink_to(capacity);
        }

        self.capacity = capacity;
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        assert!(
            self.items.len() <= self.capacity,
            "DenseStore length {} exceeds its capacity {}",
            self.items.len(),
            self.capacity
        );

        assert!(
            self.capacity >= self.base_capacity.get(),
            "DenseStore capacity {} is below its base capacity {}",
            self.capacity,
            self.base_capacity
        );

        assert!(
            self.items.capacity() >= self.capacity,
            "DenseStore backing allocation of {} records is smaller than its capacity {}",
            self.items.capacity(),
            self.capacity
        );
    }
}

impl<T: Copy> Default for DenseStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Copy> IntoIterator for &'a DenseStore<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Copy> IntoIterator for &'a mut DenseStore<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cold]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} out of bounds in DenseStore of length {len}");
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

    assert_impl_all!(DenseStore<u32>: Send, Sync, Debug, Clone);

    fn store_of(values: impl IntoIterator<Item = u32>) -> DenseStore<u32> {
        let mut store = DenseStore::new();

        for value in values {
            store.push(value);
        }

        store
    }

    #[test]
    fn smoke_test() {
        let mut store = DenseStore::new();

        assert!(store.is_empty());
        assert_eq!(store.capacity(), DEFAULT_BASE_CAPACITY.get());

        store.push(10_u64);
        store.push(20);
        store.push(30);

        assert_eq!(store.len(), 3);
        assert_eq!(*store.at(0), 10);
        assert_eq!(*store.at(1), 20);
        assert_eq!(*store.at(2), 30);

        *store.at_mut(1) += 1;
        assert_eq!(store.get(1), Some(&21));
        assert_eq!(store.get(3), None);
    }

    #[test]
    fn push_doubles_capacity_when_full() {
        let mut store = DenseStore::with_base_capacity(nz!(2));

        store.push(1_u8);
        store.push(2);
        assert_eq!(store.capacity(), 2);

        store.push(3);
        assert_eq!(store.capacity(), 4);

        store.push(4);
        store.push(5);
        assert_eq!(store.capacity(), 8);
        assert_eq!(store.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn remove_preserves_order() {
        let mut store = store_of(0..6);

        assert_eq!(store.remove(2), 2);
        assert_eq!(store.as_slice(), &[0, 1, 3, 4, 5]);

        assert_eq!(store.remove(4), 5);
        assert_eq!(store.as_slice(), &[0, 1, 3, 4]);
    }

    #[test]
    fn swap_remove_moves_last_into_hole() {
        let mut store = store_of(0..6);

        assert_eq!(store.swap_remove(1), 1);
        assert_eq!(store.as_slice(), &[0, 5, 2, 3, 4]);
    }

    #[test]
    fn swap_remove_of_last_moves_nothing() {
        let mut store = store_of(0..3);

        assert_eq!(store.swap_remove(2), 2);
        assert_eq!(store.as_slice(), &[0, 1]);
    }

    #[test]
    fn shrinks_below_quarter_load() {
        let mut store = DenseStore::with_base_capacity(nz!(2));

        for value in 0..16_u32 {
            store.push(value);
        }
        assert_eq!(store.capacity(), 16);

        // 16 / 4 = 4, shrinking starts once we drop below 4 records.
        while store.len() > 4 {
            store.swap_remove(0);
        }
        assert_eq!(store.capacity(), 16);

        store.remove(0);
        assert_eq!(store.capacity(), 8);

        store.remove(0);
        store.remove(0);
        store.remove(0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn never_shrinks_below_base_capacity() {
        let mut store = store_of(0..3);

        store.remove(0);
        store.remove(0);
        store.remove(0);

        assert_eq!(store.capacity(), DEFAULT_BASE_CAPACITY.get());
    }

    #[test]
    fn swap_exchanges_records() {
        let mut store = store_of(0..4);

        store.swap(0, 3);
        assert_eq!(store.as_slice(), &[3, 1, 2, 0]);

        store.swap(2, 2);
        assert_eq!(store.as_slice(), &[3, 1, 2, 0]);
    }

    #[test]
    fn resize_grows_with_fill_and_shrinks() {
        let mut store = store_of(0..2);

        store.resize(12, 7);
        assert_eq!(store.len(), 12);
        assert_eq!(store.capacity(), 20);
        assert_eq!(&store.as_slice()[..3], &[0, 1, 7]);

        store.resize(1, 0);
        assert_eq!(store.as_slice(), &[0]);
        assert_eq!(store.capacity(), 10);
    }

    #[test]
    fn set_capacity_reserves_and_releases() {
        let mut store = store_of(0..3);

        store.set_capacity(100);
        assert_eq!(store.capacity(), 100);

        for value in 3..100 {
            store.push(value);
        }
        assert_eq!(store.capacity(), 100);

        store.truncate(3);
        store.set_capacity(0);
        assert_eq!(store.capacity(), DEFAULT_BASE_CAPACITY.get());
        assert_eq!(store.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn set_capacity_never_cuts_off_records() {
        let mut store = store_of(0..8);

        store.set_capacity(2);
        assert_eq!(store.capacity(), 8);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn pop_and_clear() {
        let mut store = store_of(0..20);

        assert_eq!(store.pop(), Some(19));
        assert_eq!(store.len(), 19);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), DEFAULT_BASE_CAPACITY.get());
        assert_eq!(store.pop(), None);
    }

    #[test]
    fn iterates_in_order() {
        let mut store = store_of([5, 6, 7]);

        for value in &mut store {
            *value *= 2;
        }

        let collected: Vec<u32> = store.iter().copied().collect();
        assert_eq!(collected, vec![10, 12, 14]);
        assert_eq!((&store).into_iter().count(), 3);
    }

    #[test]
    fn dump_prints_records() {
        let store = store_of([1, 2, 3]);

        assert_eq!(store.dump().to_string(), "{ 1, 2, 3 }");
    }

    #[test]
    #[should_panic]
    fn at_out_of_bounds_panics() {
        let store = store_of(0..3);

        _ = store.at(3);
    }

    #[test]
    #[should_panic]
    fn remove_out_of_bounds_panics() {
        let mut store = store_of(0..3);

        store.remove(3);
    }

    #[test]
    #[should_panic]
    fn swap_remove_on_empty_panics() {
        let mut store = DenseStore::<u32>::new();

        store.swap_remove(0);
    }

    #[test]
    #[should_panic]
    fn swap_out_of_bounds_panics() {
        let mut store = store_of(0..3);

        store.swap(0, 5);
    }

    #[test]
    #[should_panic]
    fn zero_sized_records_panic() {
        drop(DenseStore::<()>::new());
    }
}
