use std::num::NonZero;

use new_zealand::nz;

/// Factor by which a store grows when it is full and shrinks when it is sparsely used.
pub const RESIZE_FACTOR: usize = 2;

/// The capacity a store starts with and never shrinks below, unless configured otherwise.
pub const DEFAULT_BASE_CAPACITY: NonZero<usize> = nz!(5);

/// A store shrinks once its length drops below `capacity / SHRINK_DIVISOR`.
const SHRINK_DIVISOR: usize = RESIZE_FACTOR * RESIZE_FACTOR;

/// Returns the capacity a full store of the given capacity grows to.
///
/// # Panics
///
/// Panics if the new capacity would not fit in `usize`.
#[must_use]
pub(crate) fn grown(capacity: usize) -> usize {
    capacity
        .checked_mul(RESIZE_FACTOR)
        .expect("store capacity cannot exceed the size of virtual memory")
}

/// Returns the capacity to shrink to if a store holding `len` items is using less than a quarter
/// of its `capacity`, or `None` if the store should keep its current capacity.
///
/// The result is never below `base`.
#[must_use]
#[allow(
    clippy::integer_division,
    reason = "capacity thresholds are meant to round down"
)]
pub(crate) fn shrunk(len: usize, capacity: usize, base: NonZero<usize>) -> Option<usize> {
    if len < capacity / SHRINK_DIVISOR && capacity > base.get() {
        Some((capacity / RESIZE_FACTOR).max(base.get()))
    } else {
        None
    }
}

/// Returns the capacity a store should grow to in order to hold `required` items, doubling from
/// `capacity` until it fits.
#[must_use]
pub(crate) fn grown_to_fit(capacity: usize, required: usize) -> usize {
    let mut capacity = capacity;

    while capacity < required {
        capacity = grown(capacity);
    }

    capacity
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn grows_by_resize_factor() {
        assert_eq!(grown(5), 10);
        assert_eq!(grown(1), 2);
    }

    #[test]
    #[should_panic]
    fn grow_overflow_panics() {
        _ = grown(usize::MAX);
    }

    #[test]
    fn shrinks_only_below_quarter_load() {
        let base = nz!(5);

        // 40 / 4 = 10, so 10 items is not yet sparse enough.
        assert_eq!(shrunk(10, 40, base), None);
        assert_eq!(shrunk(9, 40, base), Some(20));
        assert_eq!(shrunk(0, 40, base), Some(20));
    }

    #[test]
    fn never_shrinks_below_base() {
        let base = nz!(5);

        assert_eq!(shrunk(0, 5, base), None);
        assert_eq!(shrunk(0, 8, base), Some(5));
    }

    #[test]
    fn grown_to_fit_doubles_until_large_enough() {
        assert_eq!(grown_to_fit(5, 3), 5);
        assert_eq!(grown_to_fit(5, 5), 5);
        assert_eq!(grown_to_fit(5, 6), 10);
        assert_eq!(grown_to_fit(5, 21), 40);
    }
}
