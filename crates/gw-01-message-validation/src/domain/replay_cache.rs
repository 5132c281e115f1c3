//! # Replay Cache
//!
//! Maps each `device_id` to its own locked `ReplayWindow`.
//!
//! ## Locking
//!
//! - The outer `DashMap` is sharded, so looking up different devices does
//!   not contend.
//! - Each window sits behind its own `parking_lot::Mutex`; the map shard
//!   lock is released before the window lock is taken.
//! - `record` is the only writer and performs check-and-insert under one
//!   window lock, so two concurrent messages with the same id for the same
//!   device cannot both be recorded.
//!
//! Windows are created on the first accepted message for a device and live
//! for the lifetime of the process. Nonces are scoped per device; the same
//! `message_id` from two devices is not a collision.

use crate::domain::replay_window::ReplayWindow;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Per-device anti-replay state.
#[derive(Debug)]
pub struct ReplayCache {
    windows: DashMap<String, Arc<Mutex<ReplayWindow>>>,
    capacity: usize,
}

impl ReplayCache {
    /// Creates an empty cache whose windows hold `capacity` ids each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: DashMap::new(),
            capacity,
        }
    }

    fn window(&self, device_id: &str) -> Option<Arc<Mutex<ReplayWindow>>> {
        self.windows.get(device_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether `message_id` was already accepted for `device_id`.
    ///
    /// Read-only: never creates a window.
    #[must_use]
    pub fn is_replay(&self, device_id: &str, message_id: &str) -> bool {
        self.window(device_id)
            .is_some_and(|window| window.lock().contains(message_id))
    }

    /// Records an accepted `message_id`, creating the device window on first
    /// use.
    ///
    /// Returns `false` if the id was already present, which means a
    /// concurrent validation recorded it first.
    pub fn record(&self, device_id: &str, message_id: &str) -> bool {
        let window = match self.window(device_id) {
            Some(window) => window,
            None => {
                let capacity = self.capacity;
                let entry = self
                    .windows
                    .entry(device_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(ReplayWindow::new(capacity))));
                Arc::clone(entry.value())
            }
        };
        let mut guard = window.lock();
        guard.check_and_insert(message_id)
    }

    /// Number of devices with a window.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.windows.len()
    }

    /// Number of ids remembered for `device_id` (0 if it has no window).
    #[must_use]
    pub fn window_len(&self, device_id: &str) -> usize {
        self.window(device_id).map_or(0, |window| window.lock().len())
    }

    /// Configured per-device capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
