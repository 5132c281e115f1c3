//! # Gateway Runtime Library
//!
//! Wires the validation and relay subsystems into a running gateway and
//! exposes the pieces the binaries and integration tests share.
//!
//! ## Modules
//!
//! - `container/` - configuration and service construction
//! - `adapters/` - credentials file, transport framing, response publisher,
//!   statistics and the metrics endpoint
//! - `handlers/` - per-event processing and the worker pool
//! - `simulator/` - simulated device and mock backend
//! - `runtime` - task lifecycle and shutdown
//!
//! ## Event Flow
//!
//! ```text
//! stdin frames ──→ ingress ──→ mpsc ──→ workers ──→ gw-01 validate
//!                                                       │
//!                                   gw-02 forward ←─────┘
//!                                        │
//!                 stdout reply frame ←───┘ (backend status 200)
//! ```

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;
pub mod simulator;

pub use container::{ContainerError, GatewayConfig, GatewayContainer};
pub use handlers::{EventHandler, EventOutcome};
pub use runtime::{GatewayRuntime, RunningGateway};
