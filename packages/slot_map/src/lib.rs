#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A generational slot map that keeps `Copy` records densely packed while handing out stable,
//! generation-checked handles to them.
//!
//! This crate provides [`SlotMap`], an arena in which every inserted record is addressed by a
//! [`SlotId`]. The records themselves live contiguously in insertion order, so bulk processing
//! over [`SlotMap::values()`] runs at slice speed, while the handles stay valid no matter how the
//! records are moved around underneath them. Once a record is removed, all copies of its handle
//! are detected as dead, even after its slot has been reused for a different record.
//!
//! # Key Features
//!
//! - **Stable handles**: A [`SlotId`] keeps resolving to its record across insertions and
//!   removals of other records
//! - **Use-after-removal detection**: Every slot carries a generation counter that is bumped on
//!   removal, so stale handles fail to resolve instead of silently reading another record
//! - **Dense storage**: Records are packed without gaps; removal is O(1) by moving the last
//!   record into the hole, or O(n) with [`SlotMap::remove_shift()`] when order matters
//! - **Lowest-slot reuse**: New handles reuse the lowest vacant slot first
//! - **Checked and unchecked access**: Panicking accessors for handles the caller knows to be
//!   live, `try_` variants returning [`Error`] for handles that may have gone stale
//! - **Predictable capacity**: Storage grows by doubling and shrinks by halving when it becomes
//!   sparse, never below a configurable base capacity
//!
//! # Building blocks
//!
//! The map is composed of two collections that are also usable on their own:
//!
//! - [`DenseStore`] is a contiguous store with the growth and shrink policy described above.
//! - [`SparseFreeList`] is a slot table that keeps records at stable slot indexes and recycles
//!   vacated slots lowest-first.
//!
//! # Examples
//!
//! ```
//! use slot_map::SlotMap;
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! struct Enemy {
//!     health: u32,
//!     speed: f32,
//! }
//!
//! let mut enemies = SlotMap::new();
//!
//! let grunt = enemies.insert(Enemy { health: 10, speed: 1.0 });
//! let boss = enemies.insert(Enemy { health: 500, speed: 0.5 });
//!
//! // Process all records as a plain slice.
//! for enemy in enemies.values_mut() {
//!     enemy.health -= 5;
//! }
//!
//! assert_eq!(enemies[grunt].health, 5);
//!
//! enemies.remove(grunt);
//!
//! // The handle is dead, even though its slot will be reused.
//! let minion = enemies.insert(Enemy { health: 1, speed: 2.0 });
//! assert_eq!(minion.index(), grunt.index());
//! assert!(!enemies.contains(grunt));
//! assert!(enemies.try_get(grunt).is_err());
//!
//! assert_eq!(enemies[boss].health, 495);
//! assert_eq!(enemies[minion].health, 1);
//! ```
//!
//! Iterating over handles and records together:
//!
//! ```
//! use slot_map::SlotMap;
//!
//! let mut map = SlotMap::new();
//! let a = map.insert('a');
//! let b = map.insert('b');
//!
//! for (id, value) in &map {
//!     assert_eq!(map[id], *value);
//! }
//!
//! assert_eq!(map.ids().collect::<Vec<_>>(), vec![a, b]);
//! ```

mod builder;
mod capacity;
mod dense_store;
mod dump;
mod error;
mod map;
mod slot_id;
mod sparse_free_list;

pub use builder::*;
pub use capacity::{DEFAULT_BASE_CAPACITY, RESIZE_FACTOR};
pub use dense_store::DenseStore;
pub use dump::Dump;
pub use error::{Error, Result};
pub use map::{Iter, SlotMap};
pub use slot_id::{Generation, SlotId};
pub use sparse_free_list::{OccupiedSlots, SparseFreeList};
