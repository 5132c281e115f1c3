//! Fixtures shared by the gateway benchmarks.

pub mod fixtures {
    use rand::Rng;
    use serde_json::{json, Value};
    use shared_types::{current_timestamp, sign_message};
    use uuid::Uuid;

    pub const SECRET: &[u8] = b"supersecretkey123";

    /// A DHT22-style reading.
    pub fn temperature_payload() -> Value {
        let mut rng = rand::thread_rng();
        json!({
            "temperature": (rng.gen_range(15.0..=35.0_f64) * 10.0).round() / 10.0,
            "humidity": rng.gen_range(40..=80),
            "sensor_type": "DHT22",
        })
    }

    /// A payload with `fields` nested entries.
    pub fn wide_payload(fields: usize) -> Value {
        let readings: serde_json::Map<String, Value> = (0..fields)
            .map(|i| (format!("channel_{i:04}"), json!({"value": i, "unit": "mV"})))
            .collect();
        json!({ "readings": readings, "sensor_type": "ADC" })
    }

    /// A freshly signed wire message for `device_id`.
    pub fn signed_wire(device_id: &str, payload: Value) -> Vec<u8> {
        sign_message(
            device_id,
            current_timestamp(),
            &Uuid::new_v4().to_string(),
            payload,
            SECRET,
        )
        .to_wire()
        .unwrap_or_default()
    }
}
