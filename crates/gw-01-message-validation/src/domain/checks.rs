//! # Stateless Checks
//!
//! The structural, identity and freshness checks. None of them touches the
//! replay cache or the credential store.

use serde_json::{Map, Value};
use shared_types::{DeviceMessage, RejectionReason};

/// Envelope fields, in wire order.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "device_id",
    "timestamp",
    "message_id",
    "payload",
    "signature",
];

/// Whether a field value counts as present.
///
/// Devices in the field treat null, `false`, zero, empty strings and empty
/// containers as absent, so the gateway does the same.
#[must_use]
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => !is_zero(n),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    if let Some(i) = n.as_i64() {
        return i == 0;
    }
    if let Some(u) = n.as_u64() {
        return u == 0;
    }
    n.as_f64().is_some_and(|f| f == 0.0)
}

fn string_field(object: &Map<String, Value>, name: &str) -> Result<String, RejectionReason> {
    match object.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(RejectionReason::malformed(format!(
            "field '{name}' must be a string"
        ))),
    }
}

/// Check 1: decodes raw bytes into a `DeviceMessage`.
///
/// # Errors
///
/// `Malformed` if the bytes are not a JSON object, any required field is
/// absent or empty, or a field has the wrong type.
pub fn parse_message(raw: &[u8]) -> Result<DeviceMessage, RejectionReason> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| RejectionReason::malformed(format!("invalid JSON: {e}")))?;

    let Value::Object(object) = value else {
        return Err(RejectionReason::malformed("message is not a JSON object"));
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !is_present(object.get(*field)))
        .collect();
    if !missing.is_empty() {
        return Err(RejectionReason::malformed(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let device_id = string_field(&object, "device_id")?;
    let message_id = string_field(&object, "message_id")?;
    let signature = string_field(&object, "signature")?;

    let timestamp = object
        .get("timestamp")
        .and_then(Value::as_i64)
        .ok_or_else(|| RejectionReason::malformed("field 'timestamp' must be an integer"))?;

    let payload = object.get("payload").cloned().unwrap_or(Value::Null);

    Ok(DeviceMessage {
        device_id,
        timestamp,
        message_id,
        payload,
        signature,
    })
}

/// Check 2: binds the claimed sender to the authenticated transport peer.
///
/// # Errors
///
/// `IdentityMismatch` unless the two are byte-equal.
pub fn check_identity(claimed: &str, peer_identity: &str) -> Result<(), RejectionReason> {
    if claimed == peer_identity {
        Ok(())
    } else {
        Err(RejectionReason::IdentityMismatch {
            claimed: claimed.to_string(),
            peer: peer_identity.to_string(),
        })
    }
}

/// Check 3: `|now - timestamp| <= tolerance`, symmetric in past and future.
///
/// Returns the observed skew on success.
///
/// # Errors
///
/// `StaleOrFutureTimestamp` when the skew exceeds `tolerance_secs`.
pub fn check_freshness(
    timestamp: i64,
    now: i64,
    tolerance_secs: u64,
) -> Result<u64, RejectionReason> {
    let skew_secs = now.abs_diff(timestamp);
    if skew_secs > tolerance_secs {
        return Err(RejectionReason::StaleOrFutureTimestamp {
            timestamp,
            now,
            skew_secs,
            tolerance_secs,
        });
    }
    Ok(skew_secs)
}
