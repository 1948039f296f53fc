//! Basic benchmarks for the `slot_map` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use slot_map::{SlotId, SlotMap};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

#[derive(Clone, Copy)]
struct TestItem {
    position: [f32; 3],
    velocity: [f32; 3],
}

const TEST_VALUE: TestItem = TestItem {
    position: [1.0, 2.0, 3.0],
    velocity: [0.5, 0.0, -0.5],
};

/// Number of items in the maps used by the bulk operations.
const BULK_SIZE: usize = 1000;

fn filled_map() -> (SlotMap<TestItem>, Vec<SlotId>) {
    let mut map = SlotMap::new();
    let ids = iter::repeat_with(|| map.insert(TEST_VALUE))
        .take(BULK_SIZE)
        .collect();

    (map, ids)
}

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("slot_map_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(SlotMap::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_one");
    group.bench_function("insert_one", |b| {
        b.iter_custom(|iters| {
            let mut maps = iter::repeat_with(SlotMap::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for map in &mut maps {
                _ = black_box(map.insert(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one");
    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut map = SlotMap::new();
            let id = map.insert(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(map.get(black_box(id)).position);
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("contains_stale");
    group.bench_function("contains_stale", |b| {
        b.iter_custom(|iters| {
            let mut map = SlotMap::new();
            let stale = map.insert(TEST_VALUE);
            map.remove(stale);
            _ = map.insert(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(map.contains(black_box(stale)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_remove_cycle");
    group.bench_function("insert_remove_cycle", |b| {
        b.iter_custom(|iters| {
            let (mut map, _ids) = filled_map();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let id = map.insert(black_box(TEST_VALUE));
                _ = black_box(map.remove(id));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("remove_all_swap");
    group.bench_function("remove_all_swap", |b| {
        b.iter_custom(|iters| {
            let mut filled = iter::repeat_with(filled_map)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for (map, ids) in &mut filled {
                for id in ids.iter() {
                    _ = black_box(map.remove(*id));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("remove_all_shift");
    group.bench_function("remove_all_shift", |b| {
        b.iter_custom(|iters| {
            let mut filled = iter::repeat_with(filled_map)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for (map, ids) in &mut filled {
                for id in ids.iter() {
                    _ = black_box(map.remove_shift(*id));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("update_all_values");
    group.bench_function("update_all_values", |b| {
        b.iter_custom(|iters| {
            let (mut map, _ids) = filled_map();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                for item in map.values_mut() {
                    for (position, velocity) in item.position.iter_mut().zip(item.velocity) {
                        *position += velocity;
                    }
                }

                _ = black_box(&mut map);
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
