//! Monotonic millisecond clock abstraction for testable time-dependent logic
//!
//! Message timestamps, TTL expiry and the admission gate's stale-holder
//! reclamation all read time through [`Clock`]. Production code uses
//! [`SteadyClock`]; tests and simulations drive a [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of a steady, non-decreasing millisecond counter
///
/// The epoch is arbitrary. Implementations must never go backwards and
/// must never consult wall-clock or calendar time.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock's epoch
    fn now_ms(&self) -> u64;
}

/// Production clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SteadyClock {
    origin: Instant,
}

impl SteadyClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SteadyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SteadyClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually driven clock for deterministic tests
///
/// Clones share the same counter, so a test can keep one copy and hand
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward by `ms` milliseconds
    pub fn advance(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to an absolute time; values earlier than the current time are ignored
    pub fn set(&self, ms: u64) {
        self.current_ms.fetch_max(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

/// Shared clock handle as held by the dispatcher components
pub type SharedClock = Arc<dyn Clock>;

/// Default clock for components constructed without an explicit one
pub fn steady() -> SharedClock {
    Arc::new(SteadyClock::new())
}
