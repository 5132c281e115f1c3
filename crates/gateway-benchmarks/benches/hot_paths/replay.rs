//! # Replay Benchmarks
//!
//! A full window must evict in constant time, and devices must not
//! contend with one another.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use gw_01_message_validation::{ReplayCache, ReplayWindow};
use std::sync::Arc;
use std::thread;

pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for capacity in [100usize, 1_000, 10_000] {
        let ids: Vec<String> = (0..capacity * 2).map(|i| format!("msg-{i}")).collect();
        group.bench_with_input(
            BenchmarkId::new("window_insert_full", capacity),
            &capacity,
            |b, &capacity| {
                let mut window = ReplayWindow::new(capacity);
                for id in &ids[..capacity] {
                    window.check_and_insert(id);
                }
                let mut next = 0usize;
                b.iter(|| {
                    let id = &ids[next % ids.len()];
                    next += 1;
                    black_box(window.check_and_insert(id))
                });
            },
        );
    }

    let cache = ReplayCache::new(1_000);
    for i in 0..1_000 {
        cache.record("sensor_001", &format!("msg-{i}"));
    }
    group.bench_function("is_replay/hit", |b| {
        b.iter(|| cache.is_replay(black_box("sensor_001"), black_box("msg-500")))
    });
    group.bench_function("is_replay/unknown_device", |b| {
        b.iter(|| cache.is_replay(black_box("sensor_404"), black_box("msg-500")))
    });

    for devices in [1usize, 8] {
        let per_device = 1_000usize;
        group.throughput(Throughput::Elements((devices * per_device) as u64));
        group.bench_with_input(
            BenchmarkId::new("concurrent_record", devices),
            &devices,
            |b, &devices| {
                b.iter(|| {
                    let cache = Arc::new(ReplayCache::new(256));
                    let handles: Vec<_> = (0..devices)
                        .map(|d| {
                            let cache = Arc::clone(&cache);
                            thread::spawn(move || {
                                let device_id = format!("sensor_{d:03}");
                                for i in 0..per_device {
                                    cache.record(&device_id, &format!("msg-{i}"));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    cache.device_count()
                });
            },
        );
    }

    group.finish();
}
