//! Integration tests for the `slot_map` package.
//!
//! These tests exercise `SlotMap` through its public API only, covering handle liveness and
//! invalidation, slot reuse, the consistency of the dense storage with the handles that refer to
//! it and a randomized comparison against a `HashMap` model.

#![allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::modulo_arithmetic,
    reason = "panic is fine in tests"
)]

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slot_map::{Error, Generation, SlotId, SlotMap};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Record {
    f: i32,
    y: f64,
}

impl Record {
    fn new(x: i32) -> Self {
        Self {
            f: x,
            y: f64::from(x) * 0.5,
        }
    }
}

/// Every live handle resolves to a dense position that maps back to the same handle.
fn assert_handles_consistent<T: Copy>(map: &SlotMap<T>, live: impl IntoIterator<Item = SlotId>) {
    for id in live {
        assert!(map.contains(id), "{id} should be live");
        assert_eq!(map.id_at(map.index_of(id)), id);
    }

    for dense_index in 0..map.len() {
        let id = map.id_at(dense_index);
        assert_eq!(map.index_of(id), dense_index);
    }
}

#[test]
fn inserted_record_is_live_and_unmodified() {
    let mut map = SlotMap::new();

    for x in 0..50 {
        let id = map.insert(Record::new(x));

        assert!(map.contains(id));
        assert_eq!(map[id], Record::new(x));
        assert_eq!(map.try_get(id), Ok(&Record::new(x)));
    }
}

#[test]
fn removed_handle_stays_dead_forever() {
    let mut map = SlotMap::new();

    let removed = map.insert(Record::new(1));
    let kept = map.insert(Record::new(2));

    assert_eq!(map.remove(removed), Some(Record::new(1)));
    assert!(!map.contains(removed));

    // Churn through the freed slot many times.
    for x in 0..100 {
        let id = map.insert(Record::new(x));
        assert!(!map.contains(removed));
        map.remove(id);
        assert!(!map.contains(removed));
    }

    assert_eq!(
        map.try_get(removed),
        Err(Error::InvalidHandle { id: removed })
    );
    assert_eq!(map[kept], Record::new(2));
}

#[test]
fn reused_slot_has_greater_generation() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..4).map(|x| map.insert(x)).collect();
    let old = ids[2];

    map.remove(old);

    // Lowest vacant slot is reused first.
    let reused = map.insert(99);

    assert_eq!(reused.index(), old.index());
    assert!(reused.generation() > old.generation());
    assert!(!map.contains(old));
    assert_eq!(map[reused], 99);
}

#[test]
fn lowest_vacant_slot_is_reused_first() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..8).map(|x| map.insert(x)).collect();

    map.remove(ids[5]);
    map.remove(ids[1]);
    map.remove(ids[3]);

    assert_eq!(map.insert(10).index(), 1);
    assert_eq!(map.insert(11).index(), 3);
    assert_eq!(map.insert(12).index(), 5);
    assert_eq!(map.insert(13).index(), 8);
}

#[test]
fn swapping_twice_restores_records() {
    let mut map = SlotMap::new();

    let a = map.insert(Record::new(1));
    let b = map.insert(Record::new(2));

    map.swap_elements(a, b);
    assert_eq!(map[a], Record::new(2));
    assert_eq!(map[b], Record::new(1));

    map.swap_elements(a, b);
    assert_eq!(map[a], Record::new(1));
    assert_eq!(map[b], Record::new(2));

    assert_handles_consistent(&map, [a, b]);
}

#[test]
fn removal_relocates_only_the_last_record() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..6).map(|x| map.insert(Record::new(x))).collect();
    let positions_before: Vec<usize> = ids.iter().map(|id| map.index_of(*id)).collect();

    map.remove(ids[2]);

    // The former last record now occupies the vacated position.
    assert_eq!(map.index_of(ids[5]), positions_before[2]);
    assert_eq!(map.values()[positions_before[2]], Record::new(5));

    // Everything else stayed where it was, with the same data.
    for i in [0, 1, 3, 4] {
        assert_eq!(map.index_of(ids[i]), positions_before[i]);
        assert_eq!(map[ids[i]], Record::new(i32::try_from(i).unwrap()));
    }

    assert_handles_consistent(&map, ids.iter().copied().filter(|id| *id != ids[2]));
}

#[test]
fn ten_records_remove_odd() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..10).map(|x| map.insert(Record::new(x))).collect();

    for id in ids.iter().skip(1).step_by(2) {
        map.remove(*id);
    }

    assert_eq!(map.len(), 5);

    for (x, id) in ids.iter().enumerate() {
        if x % 2 == 0 {
            assert_eq!(map[*id].f, i32::try_from(x).unwrap());
        } else {
            assert!(!map.contains(*id));
        }
    }

    let mut surviving: Vec<i32> = map.values().iter().map(|record| record.f).collect();
    surviving.sort_unstable();
    assert_eq!(surviving, vec![0, 2, 4, 6, 8]);

    let extra = Record { f: 777, y: -1.25 };
    let extra_id = map.insert(extra);

    assert_eq!(map[extra_id], extra);
    assert_handles_consistent(&map, ids.iter().copied().step_by(2).chain([extra_id]));
}

#[test]
fn five_cycles_on_one_slot() {
    let mut map = SlotMap::new();
    let mut previous: Vec<SlotId> = Vec::new();

    for expected in 0..5 {
        let id = map.insert(Record::new(expected));

        assert_eq!(id.index(), 0);
        assert_eq!(id.generation(), Generation::try_from(expected).unwrap());
        assert!(previous.iter().all(|old| !map.contains(*old)));

        map.remove(id);
        previous.push(id);

        assert!(previous.iter().all(|old| !map.contains(*old)));
    }
}

#[test]
fn order_preserving_removal() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..5).map(|x| map.insert(x)).collect();

    assert_eq!(map.remove_shift(ids[0]), Some(0));
    assert_eq!(map.values(), &[1, 2, 3, 4]);
    assert_eq!(map.ids().collect::<Vec<_>>(), ids[1..].to_vec());

    assert_handles_consistent(&map, ids[1..].iter().copied());
}

#[test]
fn shrinking_resize_evicts_from_the_high_end() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..20).map(|x| map.insert(x)).collect();
    for id in ids.iter().step_by(3) {
        map.remove(*id);
    }

    let dense_ids: Vec<SlotId> = map.ids().collect();
    let dense_values: Vec<i32> = map.values().to_vec();

    let evicted = map.resize(4);

    let expected_evicted: Vec<i32> = dense_values[4..].iter().rev().copied().collect();
    assert_eq!(evicted, expected_evicted);
    assert_eq!(map.values(), &dense_values[..4]);

    assert!(dense_ids[4..].iter().all(|id| !map.contains(*id)));
    assert_handles_consistent(&map, dense_ids[..4].iter().copied());

    // The map keeps working normally afterwards.
    let id = map.insert(1000);
    assert_eq!(map[id], 1000);
    assert_handles_consistent(&map, dense_ids[..4].iter().copied().chain([id]));
}

#[test]
fn clear_then_reuse() {
    let mut map = SlotMap::new();

    let ids: Vec<SlotId> = (0..10).map(|x| map.insert(x)).collect();
    map.clear();

    assert!(map.is_empty());

    let fresh: Vec<SlotId> = (0..10).map(|x| map.insert(x)).collect();

    for (old, new) in ids.iter().zip(&fresh) {
        assert!(!map.contains(*old));
        assert!(map.contains(*new));
        assert_eq!(old.index(), new.index());
        assert!(new.generation() > old.generation());
    }
}

#[test]
fn handles_round_trip_through_parts() {
    let mut map = SlotMap::new();

    let id = map.insert('z');
    let (index, generation) = id.into_parts();

    assert_eq!(map[SlotId::from_parts(index, generation)], 'z');
    assert!(!map.contains(SlotId::from_parts(index, generation + 1)));
}

#[test]
fn randomized_against_hash_map_model() {
    const OPERATIONS: usize = 3000;

    let mut rng = StdRng::seed_from_u64(0x5107_3a9b);

    let mut map = SlotMap::new();
    let mut model: HashMap<SlotId, u64> = HashMap::new();
    let mut dead: Vec<SlotId> = Vec::new();
    let mut last_generation: HashMap<usize, Generation> = HashMap::new();
    let mut next_value = 0_u64;

    for _ in 0..OPERATIONS {
        match rng.random_range(0..100) {
            0..45 => {
                let value = next_value;
                next_value += 1;

                let id = map.insert(value);

                if let Some(previous) = last_generation.insert(id.index(), id.generation()) {
                    assert!(id.generation() > previous);
                }

                assert!(model.insert(id, value).is_none());
            }
            45..65 if !map.is_empty() => {
                let id = map.id_at(rng.random_range(0..map.len()));
                let expected = model.remove(&id);

                let removed = if rng.random_bool(0.5) {
                    map.remove(id)
                } else {
                    map.remove_shift(id)
                };

                assert_eq!(removed, expected);
                dead.push(id);
            }
            65..72 if !dead.is_empty() => {
                let id = dead[rng.random_range(0..dead.len())];

                assert_eq!(map.remove(id), None);
                assert_eq!(map.remove_shift(id), None);
            }
            72..84 if map.len() >= 2 => {
                let a = map.id_at(rng.random_range(0..map.len()));
                let b = map.id_at(rng.random_range(0..map.len()));

                if rng.random_bool(0.5) {
                    map.swap_elements(a, b);

                    let value_a = model[&a];
                    let value_b = model[&b];
                    model.insert(a, value_b);
                    model.insert(b, value_a);
                } else {
                    map.swap_positions(a, b);
                }
            }
            84..92 if !map.is_empty() => {
                let id = map.id_at(rng.random_range(0..map.len()));
                let value = next_value;
                next_value += 1;

                *map.get_mut(id) = value;
                model.insert(id, value);
            }
            92..97 => {
                let target = rng.random_range(0..=map.len() + 5);
                let dense_ids: Vec<SlotId> = map.ids().collect();

                let evicted = if rng.random_bool(0.5) {
                    map.resize(target)
                } else {
                    map.truncate(target)
                };

                let evicted_ids: Vec<SlotId> =
                    dense_ids.iter().skip(target).rev().copied().collect();
                assert_eq!(evicted.len(), evicted_ids.len());

                for (id, value) in evicted_ids.iter().zip(&evicted) {
                    assert_eq!(model.remove(id), Some(*value));
                    dead.push(*id);
                }
            }
            97..99 => {
                let additional = rng.random_range(0..50);
                map.reserve(additional);

                assert!(map.capacity() >= map.len() + additional);
            }
            99 => {
                dead.extend(model.drain().map(|(id, _)| id));
                map.clear();
            }
            _ => {}
        }

        assert_eq!(map.len(), model.len());
        assert!(map.capacity() >= map.len());

        for (id, value) in &model {
            assert_eq!(map.try_get(*id), Ok(value));
        }

        for id in &dead {
            assert!(!map.contains(*id));
        }

        assert_handles_consistent(&map, model.keys().copied());
    }
}
