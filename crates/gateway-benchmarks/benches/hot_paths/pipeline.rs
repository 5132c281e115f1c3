//! # Pipeline Benchmarks
//!
//! Cost of one `validate` call for accepted messages and for the cheap
//! early rejections.

use criterion::{black_box, Criterion};
use gateway_benchmarks::fixtures::{signed_wire, temperature_payload, SECRET};
use gw_01_message_validation::{
    InMemoryCredentialStore, MessageValidationApi, MessageValidationService, ValidationConfig,
};
use shared_types::SharedSecret;
use tokio::runtime::Runtime;

pub fn register_benchmarks(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let store = InMemoryCredentialStore::new();
    store.register("sensor_001", SharedSecret::new(SECRET));
    let service = MessageValidationService::new(ValidationConfig::default(), store)
        .expect("default config is valid");

    let mut group = c.benchmark_group("pipeline");

    group.bench_function("validate/accepted", |b| {
        b.iter_batched(
            || signed_wire("sensor_001", temperature_payload()),
            |raw| rt.block_on(service.validate("sensor_001", black_box(&raw))),
            criterion::BatchSize::SmallInput,
        )
    });

    let replayed = signed_wire("sensor_001", temperature_payload());
    let _ = rt.block_on(service.validate("sensor_001", &replayed));
    group.bench_function("validate/replay_rejected", |b| {
        b.iter(|| rt.block_on(service.validate("sensor_001", black_box(&replayed))))
    });

    let impostor = signed_wire("sensor_002", temperature_payload());
    group.bench_function("validate/identity_rejected", |b| {
        b.iter(|| rt.block_on(service.validate("sensor_001", black_box(&impostor))))
    });

    group.bench_function("validate/malformed", |b| {
        b.iter(|| rt.block_on(service.validate("sensor_001", black_box(b"{\"device_id\":"))))
    });

    group.finish();
}
