//! # Validation Pipeline Tests (gw-01)
//!
//! End-to-end checks through `MessageValidationApi::validate`.
//!
//! ## Test Categories
//!
//! 1. **Scenarios** - accept, replay, stale, identity mismatch
//! 2. **Check Ordering** - earliest failing check wins
//! 3. **Replay Window** - eviction, per-device scoping, no mutation on reject
//! 4. **Tampering** - any signed field changed breaks the MAC
//! 5. **Infrastructure** - store outages are retryable and leave no state
//! 6. **Concurrency** - duplicate nonces race to a single acceptance

use async_trait::async_trait;
use gw_01_message_validation::{
    CredentialStore, CredentialStoreError, InMemoryCredentialStore, MessageValidationApi,
    MessageValidationService, TimeSource, ValidationConfig, ValidationError, ValidationObserver,
};
use serde_json::{json, Value};
use shared_types::{sign_message, DeviceMessage, RejectionKind, RejectionReason, SharedSecret};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// TEST HELPERS
// =============================================================================

const NOW: i64 = 1_700_000_000;
const SECRET: &str = "supersecretkey123";

#[derive(Clone)]
struct FixedClock(Arc<AtomicI64>);

impl FixedClock {
    fn at(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wraps the in-memory store, counting lookups and optionally failing them.
#[derive(Default)]
struct ProbeStore {
    inner: InMemoryCredentialStore,
    lookups: AtomicUsize,
    down: AtomicBool,
}

#[async_trait]
impl CredentialStore for ProbeStore {
    async fn lookup(&self, device_id: &str) -> Result<Option<SharedSecret>, CredentialStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(CredentialStoreError::Unavailable("connection refused".into()));
        }
        self.inner.lookup(device_id).await
    }
}

#[derive(Default)]
struct CountingObserver {
    received: AtomicUsize,
    accepted: AtomicUsize,
    rejected: AtomicUsize,
    infra: AtomicUsize,
}

impl ValidationObserver for CountingObserver {
    fn on_received(&self) {
        self.received.fetch_add(1, Ordering::SeqCst);
    }
    fn on_accepted(&self, _device_id: &str) {
        self.accepted.fetch_add(1, Ordering::SeqCst);
    }
    fn on_rejected(&self, _reason: &RejectionReason) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }
    fn on_infrastructure_error(&self) {
        self.infra.fetch_add(1, Ordering::SeqCst);
    }
}

type Service = MessageValidationService<Arc<ProbeStore>, FixedClock>;

fn make_service_with(config: ValidationConfig) -> (Service, Arc<ProbeStore>, FixedClock) {
    let store = Arc::new(ProbeStore::default());
    store.inner.register("sensor_001", SECRET);
    store.inner.register("sensor_002", "anothersecret456");
    let clock = FixedClock::at(NOW);
    let service =
        MessageValidationService::with_clock(config, Arc::clone(&store), clock.clone()).unwrap();
    (service, store, clock)
}

fn make_service() -> (Service, Arc<ProbeStore>, FixedClock) {
    make_service_with(ValidationConfig::default())
}

fn signed(device_id: &str, timestamp: i64, message_id: &str, payload: Value) -> DeviceMessage {
    let secret = if device_id == "sensor_002" {
        "anothersecret456"
    } else {
        SECRET
    };
    sign_message(device_id, timestamp, message_id, payload, secret.as_bytes())
}

fn wire(message: &DeviceMessage) -> Vec<u8> {
    message.to_wire().unwrap()
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn rejection_kind(result: Result<impl std::fmt::Debug, ValidationError>) -> RejectionKind {
    match result {
        Err(ValidationError::Rejected(reason)) => reason.kind(),
        other => panic!("expected rejection, got {other:?}"),
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_valid_message_accepted() {
    let (service, _, _) = make_service();
    let message_id = fresh_id();
    let msg = signed("sensor_001", NOW, &message_id, json!({"temperature": 22.5}));

    let accepted = service.validate("sensor_001", &wire(&msg)).await.unwrap();

    assert_eq!(accepted.device_id, "sensor_001");
    assert_eq!(accepted.message_id, message_id);
    assert_eq!(accepted.timestamp, NOW);
    assert_eq!(accepted.payload, json!({"temperature": 22.5}));
    assert!(service.replay_cache().is_replay("sensor_001", &message_id));
}

#[tokio::test]
async fn test_verbatim_replay_rejected() {
    let (service, _, _) = make_service();
    let raw = wire(&signed("sensor_001", NOW, &fresh_id(), json!({"temperature": 22.5})));

    assert!(service.validate("sensor_001", &raw).await.is_ok());
    let second = service.validate("sensor_001", &raw).await;
    assert_eq!(rejection_kind(second), RejectionKind::ReplayDetected);
}

#[tokio::test]
async fn test_stale_timestamp_rejected() {
    let (service, _, _) = make_service();
    let msg = signed("sensor_001", NOW - 600, &fresh_id(), json!({"temperature": 22.5}));

    let result = service.validate("sensor_001", &wire(&msg)).await;
    match result {
        Err(ValidationError::Rejected(RejectionReason::StaleOrFutureTimestamp {
            skew_secs,
            tolerance_secs,
            ..
        })) => {
            assert_eq!(skew_secs, 600);
            assert_eq!(tolerance_secs, 300);
        }
        other => panic!("expected stale rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_future_timestamp_rejected() {
    let (service, _, _) = make_service();
    let msg = signed("sensor_001", NOW + 301, &fresh_id(), json!({"temperature": 22.5}));
    let result = service.validate("sensor_001", &wire(&msg)).await;
    assert_eq!(rejection_kind(result), RejectionKind::StaleOrFutureTimestamp);
}

#[tokio::test]
async fn test_tolerance_boundary_accepted() {
    let (service, _, _) = make_service();
    for ts in [NOW - 300, NOW + 300] {
        let msg = signed("sensor_001", ts, &fresh_id(), json!({"temperature": 22.5}));
        assert!(service.validate("sensor_001", &wire(&msg)).await.is_ok());
    }
}

#[tokio::test]
async fn test_identity_mismatch_has_no_side_effects() {
    let (service, store, _) = make_service();
    let message_id = fresh_id();
    let msg = signed("sensor_001", NOW, &message_id, json!({"temperature": 22.5}));

    let result = service.validate("sensor_002", &wire(&msg)).await;

    assert_eq!(rejection_kind(result), RejectionKind::IdentityMismatch);
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    assert_eq!(service.replay_cache().device_count(), 0);
}

#[tokio::test]
async fn test_unknown_device_rejected() {
    let (service, store, _) = make_service();
    let msg = sign_message(
        "sensor_999",
        NOW,
        &fresh_id(),
        json!({"temperature": 22.5}),
        b"whatever",
    );
    let result = service.validate("sensor_999", &wire(&msg)).await;
    assert_eq!(rejection_kind(result), RejectionKind::UnknownDevice);
    assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    assert_eq!(service.replay_cache().device_count(), 0);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let (service, _, _) = make_service();
    let msg = sign_message(
        "sensor_001",
        NOW,
        &fresh_id(),
        json!({"temperature": 22.5}),
        b"not-the-secret",
    );
    let result = service.validate("sensor_001", &wire(&msg)).await;
    assert_eq!(rejection_kind(result), RejectionKind::SignatureInvalid);
}

#[tokio::test]
async fn test_malformed_inputs() {
    let (service, store, _) = make_service();
    let inputs: [&[u8]; 4] = [
        b"not json at all",
        b"[]",
        b"{}",
        br#"{"device_id":"sensor_001","timestamp":1700000000,"message_id":"m","payload":{},"signature":"ab"}"#,
    ];
    for raw in inputs {
        let result = service.validate("sensor_001", raw).await;
        assert_eq!(rejection_kind(result), RejectionKind::Malformed);
    }
    assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
}

// =============================================================================
// CHECK ORDERING
// =============================================================================

#[tokio::test]
async fn test_identity_reported_before_bad_signature() {
    let (service, _, _) = make_service();
    let mut msg = signed("sensor_001", NOW, &fresh_id(), json!({"temperature": 22.5}));
    msg.signature = "00".repeat(32);
    let result = service.validate("sensor_002", &wire(&msg)).await;
    assert_eq!(rejection_kind(result), RejectionKind::IdentityMismatch);
}

#[tokio::test]
async fn test_identity_reported_before_stale() {
    let (service, _, _) = make_service();
    let msg = signed("sensor_001", NOW - 10_000, &fresh_id(), json!({"t": 1}));
    let result = service.validate("sensor_002", &wire(&msg)).await;
    assert_eq!(rejection_kind(result), RejectionKind::IdentityMismatch);
}

#[tokio::test]
async fn test_stale_reported_before_replay() {
    let (service, _, clock) = make_service();
    let raw = wire(&signed("sensor_001", NOW, &fresh_id(), json!({"t": 1})));
    service.validate("sensor_001", &raw).await.unwrap();

    clock.0.store(NOW + 1_000, Ordering::SeqCst);
    let result = service.validate("sensor_001", &raw).await;
    assert_eq!(rejection_kind(result), RejectionKind::StaleOrFutureTimestamp);
}

#[tokio::test]
async fn test_replay_reported_before_bad_signature() {
    let (service, store, _) = make_service();
    let message_id = fresh_id();
    let original = signed("sensor_001", NOW, &message_id, json!({"t": 1}));
    service.validate("sensor_001", &wire(&original)).await.unwrap();
    let lookups_after_accept = store.lookups.load(Ordering::SeqCst);

    let mut forged = original.clone();
    forged.payload = json!({"t": 2});
    let result = service.validate("sensor_001", &wire(&forged)).await;

    assert_eq!(rejection_kind(result), RejectionKind::ReplayDetected);
    assert_eq!(store.lookups.load(Ordering::SeqCst), lookups_after_accept);
}

#[tokio::test]
async fn test_malformed_reported_before_identity() {
    let (service, _, _) = make_service();
    let raw = br#"{"device_id":"sensor_001","timestamp":1700000000,"message_id":"m"}"#;
    let result = service.validate("sensor_002", raw).await;
    assert_eq!(rejection_kind(result), RejectionKind::Malformed);
}

// =============================================================================
// REPLAY WINDOW
// =============================================================================

#[tokio::test]
async fn test_rejected_message_leaves_cache_unchanged() {
    let (service, _, _) = make_service();
    let message_id = fresh_id();
    let mut msg = signed("sensor_001", NOW, &message_id, json!({"t": 1}));
    msg.signature = "ff".repeat(32);

    let result = service.validate("sensor_001", &wire(&msg)).await;
    assert_eq!(rejection_kind(result), RejectionKind::SignatureInvalid);
    assert!(!service.replay_cache().is_replay("sensor_001", &message_id));
    assert_eq!(service.replay_cache().window_len("sensor_001"), 0);

    // The legitimate message with that id is still accepted afterwards.
    let genuine = signed("sensor_001", NOW, &message_id, json!({"t": 1}));
    assert!(service.validate("sensor_001", &wire(&genuine)).await.is_ok());
}

#[tokio::test]
async fn test_eviction_after_capacity_plus_one() {
    let config = ValidationConfig {
        replay_cache_capacity: 4,
        ..ValidationConfig::default()
    };
    let (service, _, _) = make_service_with(config);

    let ids: Vec<String> = (0..5).map(|i| format!("msg-{i}")).collect();
    let mut first_raw = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        let raw = wire(&signed("sensor_001", NOW, id, json!({"seq": i + 1})));
        service.validate("sensor_001", &raw).await.unwrap();
        if i == 0 {
            first_raw = raw;
        }
    }

    assert_eq!(service.replay_cache().window_len("sensor_001"), 4);
    assert!(!service.replay_cache().is_replay("sensor_001", "msg-0"));
    assert!(service.validate("sensor_001", &first_raw).await.is_ok());

    let raw = wire(&signed("sensor_001", NOW, "msg-4", json!({"seq": 5})));
    let result = service.validate("sensor_001", &raw).await;
    assert_eq!(rejection_kind(result), RejectionKind::ReplayDetected);
}

#[tokio::test]
async fn test_same_nonce_on_different_devices() {
    let (service, _, _) = make_service();
    let shared_id = "shared-nonce";
    let a = signed("sensor_001", NOW, shared_id, json!({"t": 1}));
    let b = signed("sensor_002", NOW, shared_id, json!({"t": 1}));

    assert!(service.validate("sensor_001", &wire(&a)).await.is_ok());
    assert!(service.validate("sensor_002", &wire(&b)).await.is_ok());
}

#[tokio::test]
async fn test_zero_capacity_config_rejected() {
    let store = Arc::new(ProbeStore::default());
    let config = ValidationConfig {
        replay_cache_capacity: 0,
        ..ValidationConfig::default()
    };
    assert!(MessageValidationService::new(config, store).is_err());
}

// =============================================================================
// TAMPERING
// =============================================================================

#[tokio::test]
async fn test_tampered_fields_rejected() {
    let (service, _, _) = make_service();
    let base = signed(
        "sensor_001",
        NOW,
        "tamper-base",
        json!({"temperature": 22.5, "humidity": 55}),
    );

    let mut payload = base.clone();
    payload.payload = json!({"temperature": 22.6, "humidity": 55});

    let mut timestamp = base.clone();
    timestamp.timestamp = NOW - 1;

    let mut message_id = base.clone();
    message_id.message_id = "tamper-basf".into();

    let mut signature = base.clone();
    let flipped = if signature.signature.starts_with('0') { "1" } else { "0" };
    signature.signature.replace_range(0..1, flipped);

    for forged in [payload, timestamp, message_id, signature] {
        let result = service.validate("sensor_001", &wire(&forged)).await;
        assert_eq!(rejection_kind(result), RejectionKind::SignatureInvalid);
    }
    assert_eq!(service.replay_cache().window_len("sensor_001"), 0);
}

#[tokio::test]
async fn test_key_order_does_not_affect_verification() {
    let (service, _, _) = make_service();
    let msg = signed(
        "sensor_001",
        NOW,
        "order",
        json!({"temperature": 22.5, "humidity": 55}),
    );
    let raw = format!(
        r#"{{"signature":"{}","payload":{{"humidity":55,"temperature":22.5}},"message_id":"order","timestamp":{},"device_id":"sensor_001"}}"#,
        msg.signature, NOW
    );
    assert!(service.validate("sensor_001", raw.as_bytes()).await.is_ok());
}

// =============================================================================
// INFRASTRUCTURE
// =============================================================================

#[tokio::test]
async fn test_store_outage_is_retryable_and_stateless() {
    let (service, store, _) = make_service();
    let observer = Arc::new(CountingObserver::default());
    let service = service.with_observer(observer.clone());
    let message_id = fresh_id();
    let raw = wire(&signed("sensor_001", NOW, &message_id, json!({"t": 1})));

    store.down.store(true, Ordering::SeqCst);
    let error = service.validate("sensor_001", &raw).await.unwrap_err();
    assert!(error.is_retryable());
    assert!(error.rejection().is_none());
    assert!(!service.replay_cache().is_replay("sensor_001", &message_id));

    store.down.store(false, Ordering::SeqCst);
    assert!(service.validate("sensor_001", &raw).await.is_ok());

    assert_eq!(observer.received.load(Ordering::SeqCst), 2);
    assert_eq!(observer.infra.load(Ordering::SeqCst), 1);
    assert_eq!(observer.accepted.load(Ordering::SeqCst), 1);
    assert_eq!(observer.rejected.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_observer_sees_rejections() {
    let (service, _, _) = make_service();
    let observer = Arc::new(CountingObserver::default());
    let service = service.with_observer(observer.clone());

    let _ = service.validate("sensor_001", b"garbage").await;
    let _ = service.validate("sensor_001", b"{}").await;

    assert_eq!(observer.received.load(Ordering::SeqCst), 2);
    assert_eq!(observer.rejected.load(Ordering::SeqCst), 2);
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicates_single_acceptance() {
    let (service, _, _) = make_service();
    let service = Arc::new(service);
    let raw = Arc::new(wire(&signed("sensor_001", NOW, "race", json!({"t": 1}))));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = Arc::clone(&service);
            let raw = Arc::clone(&raw);
            tokio::spawn(async move { service.validate("sensor_001", &raw).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert_eq!(e.rejection().map(|r| r.kind()), Some(RejectionKind::ReplayDetected)),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(service.replay_cache().window_len("sensor_001"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_devices_all_accepted() {
    let (service, _, _) = make_service();
    let service = Arc::new(service);

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let service = Arc::clone(&service);
            let device = if i % 2 == 0 { "sensor_001" } else { "sensor_002" };
            let raw = wire(&signed(device, NOW, &format!("c-{i}"), json!({"seq": i})));
            tokio::spawn(async move { service.validate(device, &raw).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(service.replay_cache().window_len("sensor_001"), 25);
    assert_eq!(service.replay_cache().window_len("sensor_002"), 25);
}
