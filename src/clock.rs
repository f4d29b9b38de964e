//! Injected time source
//!
//! Timestamps and TTL checks go through a clock handle so tests can
//! steer time instead of sleeping.

use chrono::Utc;
use std::sync::Arc;

/// Millisecond-resolution wall clock.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Shorthand for the default clock handle.
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
