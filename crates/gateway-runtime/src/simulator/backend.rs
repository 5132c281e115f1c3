//! # Mock Backend
//!
//! Acknowledges forwarded readings on `POST /device/{device_id}/data` and
//! flags temperatures outside the normal band.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use shared_types::current_timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Readings above this are `HIGH_TEMPERATURE`.
pub const HIGH_TEMPERATURE_THRESHOLD: f64 = 30.0;
/// Readings below this are `LOW_TEMPERATURE`.
pub const LOW_TEMPERATURE_THRESHOLD: f64 = 10.0;

/// Shared backend counters.
#[derive(Debug, Default)]
pub struct BackendState {
    received: AtomicU64,
}

impl BackendState {
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

/// Alert label for a payload carrying a numeric `temperature`.
pub fn alert_for(payload: &Value) -> Option<&'static str> {
    let temperature = payload.get("temperature")?.as_f64()?;
    Some(if temperature > HIGH_TEMPERATURE_THRESHOLD {
        "HIGH_TEMPERATURE"
    } else if temperature < LOW_TEMPERATURE_THRESHOLD {
        "LOW_TEMPERATURE"
    } else {
        "NORMAL"
    })
}

/// Router serving the backend endpoint.
pub fn mock_backend_router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/device/:device_id/data", post(receive))
        .with_state(state)
}

async fn receive(
    Path(device_id): Path<String>,
    State(state): State<Arc<BackendState>>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let total = state.received.fetch_add(1, Ordering::Relaxed) + 1;
    info!(device_id = %device_id, total, "[backend] Received {}", payload);

    let mut response = json!({
        "status": "received",
        "message": "Data processed successfully",
        "timestamp": current_timestamp(),
    });
    if let Some(alert) = alert_for(&payload) {
        info!(device_id = %device_id, alert, "[backend] Temperature check");
        response["alert"] = json!(alert);
    }
    Json(response)
}
