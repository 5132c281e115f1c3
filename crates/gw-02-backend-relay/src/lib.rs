//! # Backend Relay Subsystem (GW-02)
//!
//! Delivers accepted device payloads to the application backend.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): relay config, response and errors
//! - **Ports Layer** (`ports/`): the `BackendRelay` trait the runtime drives
//! - **Adapters** (`adapters/`): `HttpBackendRelay` over reqwest
//!
//! ## Contract
//!
//! `POST {url_template with device_id}` with the payload as the JSON body.
//! The backend's status and body are returned as-is. A failed request is
//! reported once and never retried here.

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-export public API
pub use adapters::http::HttpBackendRelay;
pub use domain::config::{RelayConfig, DEFAULT_URL_TEMPLATE, DEVICE_ID_PLACEHOLDER};
pub use domain::entities::BackendResponse;
pub use domain::errors::RelayError;
pub use ports::BackendRelay;
