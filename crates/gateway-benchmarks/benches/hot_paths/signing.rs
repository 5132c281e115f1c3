//! # Signing Benchmarks
//!
//! Canonicalization and HMAC cost as the payload grows.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use gateway_benchmarks::fixtures::{temperature_payload, wide_payload, SECRET};
use shared_types::{canonical_json, compute_mac, sign_message, verify_mac};

pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("signing");

    let reading = temperature_payload();
    group.bench_function("compute_mac/reading", |b| {
        b.iter(|| {
            compute_mac(
                black_box("sensor_001"),
                black_box(1_700_000_000),
                black_box("0b6e3c1a-9d1f-4d58-a4a5-2f0c9d1e7b11"),
                black_box(&reading),
                SECRET,
            )
        })
    });

    let message = sign_message(
        "sensor_001",
        1_700_000_000,
        "0b6e3c1a-9d1f-4d58-a4a5-2f0c9d1e7b11",
        reading,
        SECRET,
    );
    group.bench_function("verify_mac/reading", |b| {
        b.iter(|| {
            verify_mac(
                &message.device_id,
                message.timestamp,
                &message.message_id,
                black_box(&message.payload),
                SECRET,
                black_box(&message.signature),
            )
        })
    });

    for fields in [10usize, 100, 1_000] {
        let payload = wide_payload(fields);
        group.throughput(Throughput::Elements(fields as u64));
        group.bench_with_input(
            BenchmarkId::new("canonical_json", fields),
            &payload,
            |b, payload| b.iter(|| canonical_json(black_box(payload))),
        );
    }

    group.finish();
}
