use std::marker::PhantomData;
use std::num::NonZero;

use crate::{DEFAULT_BASE_CAPACITY, SlotMap};

/// Builder for creating an instance of [`SlotMap`].
///
/// All settings are optional. A map built without changing any settings is equivalent to
/// [`SlotMap::new()`].
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use slot_map::SlotMap;
///
/// let mut map = SlotMap::builder()
///     .base_capacity(nz!(64))
///     .capacity(256)
///     .build();
///
/// let id = map.insert(1.5_f32);
/// assert_eq!(map[id], 1.5);
/// assert_eq!(map.capacity(), 256);
/// ```
#[derive(Debug)]
#[must_use]
pub struct SlotMapBuilder<T> {
    base_capacity: NonZero<usize>,
    capacity: usize,

    _records: PhantomData<fn() -> T>,
}

impl<T: Copy> SlotMapBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            base_capacity: DEFAULT_BASE_CAPACITY,
            capacity: 0,
            _records: PhantomData,
        }
    }

    /// Sets the capacity the map never shrinks below, regardless of how few records it holds.
    ///
    /// Defaults to [`DEFAULT_BASE_CAPACITY`].
    #[inline]
    pub fn base_capacity(mut self, base_capacity: NonZero<usize>) -> Self {
        self.base_capacity = base_capacity;
        self
    }

    /// Sets the number of records to reserve room for up front.
    ///
    /// Values below the base capacity have no effect. The reservation is not sticky: like any
    /// other capacity above the base capacity, it is halved by the first removal that leaves the
    /// map less than a quarter full. Use the base capacity for a lower bound that is kept.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the map.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    #[inline]
    pub fn build(self) -> SlotMap<T> {
        SlotMap::new_inner(self.base_capacity, self.capacity)
    }
}

impl<T: Copy> Default for SlotMapBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use new_zealand::nz;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SlotMapBuilder<u32>: Send, Sync);

    #[test]
    fn default_matches_new() {
        let built = SlotMapBuilder::<u64>::default().build();
        let new = SlotMap::<u64>::new();

        assert_eq!(built.capacity(), new.capacity());
        assert_eq!(built.capacity(), DEFAULT_BASE_CAPACITY.get());
    }

    #[test]
    fn capacity_below_base_is_ignored() {
        let map = SlotMap::<u8>::builder()
            .base_capacity(nz!(10))
            .capacity(3)
            .build();

        assert_eq!(map.capacity(), 10);
    }

    #[test]
    fn later_settings_override_earlier() {
        let map = SlotMap::<u8>::builder().capacity(100).capacity(20).build();

        assert_eq!(map.capacity(), 20);
    }

    #[test]
    fn reserved_capacity_is_released_by_removal() {
        let mut map = SlotMap::<u8>::builder().capacity(1000).build();

        let id = map.insert(1);
        map.remove(id);

        assert_eq!(map.capacity(), 500);
    }

    #[test]
    fn base_capacity_survives_removal() {
        let mut map = SlotMap::<u8>::builder().base_capacity(nz!(1000)).build();

        let id = map.insert(1);
        map.remove(id);

        assert_eq!(map.capacity(), 1000);
    }

    #[test]
    fn small_base_capacity_lets_map_shrink_further() {
        let mut map = SlotMap::builder().base_capacity(nz!(1)).build();
        let ids: Vec<_> = (0..64_u32).map(|i| map.insert(i)).collect();

        for id in ids {
            map.remove(id);
        }

        assert!(map.is_empty());
        assert!(map.capacity() < DEFAULT_BASE_CAPACITY.get());
    }
}
