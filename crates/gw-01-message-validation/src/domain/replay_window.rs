//! # Per-Device Replay Window
//!
//! A fixed-capacity ring of the most recently accepted `message_id` values,
//! with a hash index for O(1) membership.
//!
//! ## Layout
//!
//! ```text
//! slots: [ m4 | m5 | m2 | m3 ]     index: {m2, m3, m4, m5}
//!                   ↑ head (oldest, next to be overwritten)
//! ```
//!
//! Once full, each insertion overwrites the slot at `head` and removes the
//! evicted id from the index. Membership ignores age: an id stays a replay
//! until it is evicted.

use std::collections::HashSet;
use std::sync::Arc;

/// Bounded FIFO set of accepted message ids for one device.
#[derive(Debug)]
pub struct ReplayWindow {
    slots: Vec<Arc<str>>,
    index: HashSet<Arc<str>>,
    head: usize,
    capacity: usize,
}

impl ReplayWindow {
    /// Creates an empty window holding at most `capacity` ids.
    ///
    /// A capacity of zero is clamped to one; `ValidationConfig::validate`
    /// rejects zero before a window is ever built.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity.min(1024)),
            index: HashSet::with_capacity(capacity.min(1024)),
            head: 0,
            capacity,
        }
    }

    /// Whether `message_id` is currently remembered.
    #[must_use]
    pub fn contains(&self, message_id: &str) -> bool {
        self.index.contains(message_id)
    }

    /// Records `message_id` unless already present.
    ///
    /// Returns `false` (and changes nothing) if the id was already in the
    /// window. Evicts the oldest id when full.
    pub fn check_and_insert(&mut self, message_id: &str) -> bool {
        if self.index.contains(message_id) {
            return false;
        }

        let id: Arc<str> = Arc::from(message_id);
        if self.slots.len() < self.capacity {
            self.slots.push(Arc::clone(&id));
        } else {
            let evicted = std::mem::replace(&mut self.slots[self.head], Arc::clone(&id));
            self.index.remove(&evicted);
            self.head = (self.head + 1) % self.capacity;
        }
        self.index.insert(id);
        true
    }

    /// Number of ids currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no id has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of ids remembered.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The oldest remembered id, next in line for eviction.
    #[must_use]
    pub fn oldest(&self) -> Option<&str> {
        if self.slots.len() < self.capacity {
            self.slots.first().map(AsRef::as_ref)
        } else {
            self.slots.get(self.head).map(AsRef::as_ref)
        }
    }
}
