//! # Adapters
//!
//! In-process implementations of the outbound ports.

pub mod clock;
pub mod memory_store;

pub use clock::SystemTimeSource;
pub use memory_store::InMemoryCredentialStore;
