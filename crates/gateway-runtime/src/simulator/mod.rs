//! # Simulator
//!
//! Test doubles for both ends of the gateway: a device that signs sensor
//! readings, and an HTTP backend that acknowledges them.

pub mod backend;
pub mod device;
pub mod readings;

pub use backend::{alert_for, mock_backend_router, BackendState};
pub use device::SimulatedDevice;
pub use readings::{reading, SensorKind};
