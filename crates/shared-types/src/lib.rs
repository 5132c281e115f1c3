//! # Shared Types Crate
//!
//! Types shared by the gateway and by device-side tooling.
//!
//! ## Contents
//!
//! - **Envelope**: `DeviceMessage`, the five-field wire shape every device publishes.
//! - **Entities**: `DeviceCredential` and the zeroizing `SharedSecret`.
//! - **Errors**: the six-way `RejectionReason` taxonomy and `SignerError`.
//! - **Security**: canonical payload serialization and the HMAC-SHA256
//!   signer/verifier.
//!
//! ## Design Principles
//!
//! - **One MAC implementation**: the simulator signs and the gateway verifies
//!   through the same `compute_mac`, so the concatenation order cannot drift.
//! - **No secret leakage**: `SharedSecret` redacts itself in `Debug` and no
//!   error variant carries a signature or secret.

pub mod canonical;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod security;

pub use canonical::canonical_json;
pub use entities::{DeviceCredential, SharedSecret};
pub use envelope::DeviceMessage;
pub use errors::{RejectionKind, RejectionReason, SignerError};
pub use security::{
    compute_mac, compute_mac_for, current_timestamp, mac_input, sign_message, signature_prefix,
    verify_mac, MacBytes, MAC_LEN,
};
