//! # Message Validation Subsystem (GW-01)
//!
//! Turns a raw device message plus the transport-authenticated peer identity
//! into an accept/reject verdict, maintaining per-device anti-replay state.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): checks, replay window and cache, config
//! - **Ports Layer** (`ports/`): inbound validation API, outbound credential
//!   store, clock and observer
//! - **Adapters** (`adapters/`): in-memory credential store, system clock
//! - **Service Layer** (`service.rs`): the ordered validation pipeline
//!
//! ## Check Order
//!
//! ```text
//! raw bytes ──→ 1. parse/required fields ──→ 2. identity binding
//!           ──→ 3. freshness ──→ 4. replay ──→ 5. authenticity ──→ record nonce
//! ```
//!
//! The first failing check decides the rejection reason. The replay cache is
//! only written after every check has passed.
//!
//! ## Concurrency
//!
//! - Each device's replay window has its own lock; devices never contend.
//! - No lock is held across the credential lookup.
//! - Recording the nonce is an atomic check-and-insert, so concurrent
//!   duplicates resolve to exactly one acceptance.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{InMemoryCredentialStore, SystemTimeSource};
pub use domain::config::{ConfigError, ValidationConfig};
pub use domain::entities::AcceptedMessage;
pub use domain::errors::{CredentialStoreError, ValidationError};
pub use domain::replay_cache::ReplayCache;
pub use domain::replay_window::ReplayWindow;
pub use ports::inbound::MessageValidationApi;
pub use ports::outbound::{CredentialStore, NoopObserver, TimeSource, ValidationObserver};
pub use service::MessageValidationService;
