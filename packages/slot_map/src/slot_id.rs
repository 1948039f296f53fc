use std::fmt;

/// Counts how many times a slot of a [`SlotMap`][crate::SlotMap] has been vacated.
///
/// Generations start at zero and increase by one every time the item in a slot is removed. The
/// counter wraps around on overflow, at which point a very old handle may again compare equal to
/// a live one. At one removal per nanosecond this takes several hundred years for a single slot.
pub type Generation = u64;

/// A handle to an item stored in a [`SlotMap`][crate::SlotMap].
///
/// A handle stays valid for as long as the item it was issued for is in the map, regardless of how
/// other items are inserted, removed or moved around. Once the item is removed, the handle is dead
/// forever, even if its slot is later reused for another item: the reused slot carries a newer
/// generation, so the old handle no longer matches.
///
/// Handles are plain values. They can be copied, compared, hashed and discarded freely and carry
/// no reference to the map that issued them. Using a handle with a different map than the one
/// that issued it is not detected and resolves to whatever item that map has in the same slot.
///
/// # Examples
///
/// ```
/// use slot_map::SlotMap;
///
/// let mut map = SlotMap::new();
///
/// let id = map.insert(42_u32);
/// let copy = id;
///
/// assert_eq!(map[copy], 42);
/// assert_eq!(id.generation(), 0);
///
/// map.remove(id);
/// assert!(!map.contains(copy));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SlotId {
    index: usize,
    generation: Generation,
}

impl SlotId {
    #[must_use]
    #[inline]
    pub(crate) const fn new(index: usize, generation: Generation) -> Self {
        Self { index, generation }
    }

    /// Recreates a handle from the parts returned by [`into_parts()`](Self::into_parts).
    ///
    /// This is meant for callers that need to store handles outside of Rust types, for example as
    /// a pair of integers. A handle made up from arbitrary parts is safe to use: it is either
    /// live or reported as invalid by the map.
    #[must_use]
    #[inline]
    pub const fn from_parts(index: usize, generation: Generation) -> Self {
        Self::new(index, generation)
    }

    /// Splits the handle into its slot index and generation.
    #[must_use]
    #[inline]
    pub const fn into_parts(self) -> (usize, Generation) {
        (self.index, self.generation)
    }

    /// The sparse slot this handle refers to.
    ///
    /// The slot index never changes while the item is alive, unlike the position of the item in
    /// the densely packed value storage.
    #[must_use]
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The generation of the slot at the time this handle was issued.
    #[must_use]
    #[inline]
    pub const fn generation(&self) -> Generation {
        self.generation
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;
    use std::fmt::{Debug, Display};
    use std::hash::Hash;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(SlotId: Copy, Send, Sync, Debug, Display, Eq, Ord, Hash);

    #[test]
    fn parts_round_trip() {
        let id = SlotId::from_parts(7, 3);

        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert_eq!(id.into_parts(), (7, 3));
    }

    #[test]
    fn same_slot_different_generation_is_different_handle() {
        let old = SlotId::new(2, 0);
        let new = SlotId::new(2, 1);

        assert_ne!(old, new);
        assert!(old < new);

        let set: HashSet<SlotId> = [old, new, old].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_shows_index_and_generation() {
        assert_eq!(SlotId::new(12, 4).to_string(), "12v4");
    }
}
