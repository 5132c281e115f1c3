//! # Domain Layer
//!
//! Pure validation logic with no I/O.

pub mod checks;
pub mod config;
pub mod entities;
pub mod errors;
pub mod replay_cache;
pub mod replay_window;
