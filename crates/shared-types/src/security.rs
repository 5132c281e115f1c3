//! # Message Signer/Verifier
//!
//! Computes the message authentication code shared by devices and the
//! gateway.
//!
//! ## MAC Input (format contract)
//!
//! ```text
//! device_id ‖ decimal(timestamp) ‖ message_id ‖ canonical_json(payload)
//! ```
//!
//! Fields are concatenated as UTF-8 with no separators. Field boundaries are
//! implicit; changing the order or adding delimiters breaks every deployed
//! device.
//!
//! ## Security Properties
//!
//! - **HMAC-SHA256** keyed with the device's shared secret
//! - **Constant-time comparison** via `Mac::verify_slice`
//! - **Deterministic**: same inputs always produce the same MAC

use crate::canonical::canonical_json;
use crate::envelope::DeviceMessage;
use crate::errors::SignerError;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const MAC_LEN: usize = 32;

/// Raw MAC bytes.
pub type MacBytes = [u8; MAC_LEN];

/// Builds the exact byte sequence that is MAC'd.
pub fn mac_input(device_id: &str, timestamp: i64, message_id: &str, payload: &Value) -> Vec<u8> {
    let mut input = String::with_capacity(device_id.len() + message_id.len() + 64);
    input.push_str(device_id);
    input.push_str(&timestamp.to_string());
    input.push_str(message_id);
    input.push_str(&canonical_json(payload));
    input.into_bytes()
}

fn keyed_mac(
    device_id: &str,
    timestamp: i64,
    message_id: &str,
    payload: &Value,
    secret: &[u8],
) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(&mac_input(device_id, timestamp, message_id, payload));
    mac
}

/// Computes the MAC over a message's signed fields.
pub fn compute_mac(
    device_id: &str,
    timestamp: i64,
    message_id: &str,
    payload: &Value,
    secret: &[u8],
) -> MacBytes {
    let tag = keyed_mac(device_id, timestamp, message_id, payload, secret)
        .finalize()
        .into_bytes();
    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(&tag);
    out
}

/// Computes the MAC for any serializable payload.
///
/// # Errors
///
/// `SignerError::MalformedPayload` if the payload cannot be represented as
/// JSON (for example a map with non-string keys).
pub fn compute_mac_for<T: Serialize + ?Sized>(
    device_id: &str,
    timestamp: i64,
    message_id: &str,
    payload: &T,
    secret: &[u8],
) -> Result<MacBytes, SignerError> {
    let value =
        serde_json::to_value(payload).map_err(|e| SignerError::MalformedPayload(e.to_string()))?;
    Ok(compute_mac(device_id, timestamp, message_id, &value, secret))
}

/// Verifies a hex-encoded signature against the message's signed fields.
///
/// Returns `false` for undecodable or wrong-length signatures. The tag
/// comparison is constant-time.
pub fn verify_mac(
    device_id: &str,
    timestamp: i64,
    message_id: &str,
    payload: &Value,
    secret: &[u8],
    signature_hex: &str,
) -> bool {
    let Ok(claimed) = hex::decode(signature_hex) else {
        return false;
    };
    if claimed.len() != MAC_LEN {
        return false;
    }

    keyed_mac(device_id, timestamp, message_id, payload, secret)
        .verify_slice(&claimed)
        .is_ok()
}

/// Produces a complete signed message, as a device would.
pub fn sign_message(
    device_id: &str,
    timestamp: i64,
    message_id: &str,
    payload: Value,
    secret: &[u8],
) -> DeviceMessage {
    let mac = compute_mac(device_id, timestamp, message_id, &payload, secret);
    DeviceMessage {
        device_id: device_id.to_string(),
        timestamp,
        message_id: message_id.to_string(),
        payload,
        signature: hex::encode(mac),
    }
}

/// A loggable prefix of a signature (at most 16 characters).
pub fn signature_prefix(signature: &str) -> &str {
    match signature.char_indices().nth(16) {
        Some((end, _)) => &signature[..end],
        None => signature,
    }
}

/// Returns the current Unix timestamp in seconds.
///
/// Returns 0 if the system clock is before the epoch.
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// =============================================================================
// TESTS
// =============================================================================
