use std::result;

use thiserror::Error;

use crate::SlotId;

/// Errors returned by the checked (`try_`) operations of [`SlotMap`][crate::SlotMap].
///
/// The unchecked counterparts of these operations panic with the same message instead.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The handle does not refer to a live item. Either the item has been removed since the
    /// handle was issued or the handle was never issued by this map.
    #[error("slot map handle {id} does not refer to a live item")]
    InvalidHandle {
        /// The handle that failed to resolve.
        id: SlotId,
    },

    /// A position in the densely packed value storage was out of bounds.
    #[error("dense index {index} is out of bounds in slot map of length {len}")]
    DenseIndexOutOfBounds {
        /// The requested position.
        index: usize,

        /// The number of items in the map at the time of the request.
        len: usize,
    },
}

/// A specialized `Result` type for slot map operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = result::Result<T, Error>;
