//! Random sensor readings.

use clap::ValueEnum;
use rand::Rng;
use serde_json::{json, Value};

/// Kind of reading a simulated device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SensorKind {
    /// DHT22 temperature and humidity.
    #[default]
    Temperature,
    /// PIR motion with a confidence score.
    Motion,
    /// A single integer value.
    Generic,
}

/// Generates one payload of the given kind.
pub fn reading<R: Rng>(kind: SensorKind, rng: &mut R) -> Value {
    match kind {
        SensorKind::Temperature => {
            let temperature = (rng.gen_range(15.0..=35.0_f64) * 10.0).round() / 10.0;
            json!({
                "temperature": temperature,
                "humidity": rng.gen_range(40..=80),
                "sensor_type": "DHT22",
            })
        }
        SensorKind::Motion => json!({
            "motion_detected": rng.gen_bool(0.5),
            "confidence": rng.gen_range(70..=100),
        }),
        SensorKind::Generic => json!({ "value": rng.gen_range(0..=100) }),
    }
}
