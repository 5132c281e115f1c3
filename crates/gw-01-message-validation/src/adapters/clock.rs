//! System clock adapter.

use crate::ports::outbound::TimeSource;

/// System time implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> i64 {
        shared_types::current_timestamp()
    }
}
