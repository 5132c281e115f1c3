//! # Event Handlers
//!
//! Worker-side processing of transport events.

pub mod event;
pub mod workers;

pub use event::{EventHandler, EventOutcome};
pub use workers::spawn_workers;
