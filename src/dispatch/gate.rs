//! Timed counting admission gate
//!
//! [`TimedCountLock`] is a counting semaphore with time-based reclamation
//! of stale holders. It is NOT a mutex: [`add`](TimedCountLock::add)
//! always succeeds and can push the count above one, and
//! [`try_acquire`](TimedCountLock::try_acquire) only waits for the count
//! to read zero. A holder that never releases is dropped once the gate
//! has seen no activity for its timeout, so a crashed critical section
//! cannot block admission forever.

use crate::core::clock::{self, SharedClock};
use crate::core::sync::lock_recovering;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

/// Sleep between availability checks in [`TimedCountLock::try_acquire`]
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Upper bound on how long an acquisition may wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "RawWait")]
pub enum MaxWait {
    /// Wait until the gate becomes available
    #[default]
    Forever,
    /// Give up after this many milliseconds; 0 checks once without waiting
    Millis(u64),
}

impl MaxWait {
    pub fn is_forever(&self) -> bool {
        matches!(self, MaxWait::Forever)
    }
}

impl fmt::Display for MaxWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxWait::Forever => write!(f, "forever"),
            MaxWait::Millis(ms) => write!(f, "{}ms", ms),
        }
    }
}

impl FromStr for MaxWait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("forever") {
            return Ok(MaxWait::Forever);
        }
        trimmed
            .trim_end_matches("ms")
            .parse::<u64>()
            .map(MaxWait::Millis)
            .map_err(|_| format!("'{}' is not a wait time (milliseconds or \"forever\")", s))
    }
}

// TOML accepts either `post_wait_ms = 50` or `post_wait_ms = "forever"`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawWait {
    Millis(u64),
    Word(String),
}

impl TryFrom<RawWait> for MaxWait {
    type Error = String;

    fn try_from(raw: RawWait) -> Result<Self, Self::Error> {
        match raw {
            RawWait::Millis(ms) => Ok(MaxWait::Millis(ms)),
            RawWait::Word(word) => word.parse(),
        }
    }
}

#[derive(Debug)]
struct GateState {
    holders: u32,
    last_activity_ms: u64,
}

/// Counting admission gate with stale-holder reclamation
pub struct TimedCountLock {
    timeout_ms: u64,
    state: Mutex<GateState>,
    clock: SharedClock,
}

impl TimedCountLock {
    /// Gate on the steady clock; holders idle longer than `timeout_ms` are reclaimed
    pub fn new(timeout_ms: u64) -> Self {
        Self::with_clock(timeout_ms, clock::steady())
    }

    pub fn with_clock(timeout_ms: u64, clock: SharedClock) -> Self {
        Self {
            timeout_ms,
            state: Mutex::new(GateState {
                holders: 0,
                last_activity_ms: 0,
            }),
            clock,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Current holder count (diagnostic only)
    pub fn count(&self) -> u32 {
        lock_recovering(self.state.lock()).holders
    }

    /// Register a holder without checking availability
    pub fn add(&self) {
        let mut state = lock_recovering(self.state.lock());
        state.holders = state.holders.saturating_add(1);
        state.last_activity_ms = self.clock.now_ms();
        log::trace!("gate add: {} holder(s)", state.holders);
    }

    /// Drop one holder
    ///
    /// Returns true when the count reached zero, false when other holders
    /// remain or the gate was already free.
    pub fn release(&self) -> bool {
        let mut state = lock_recovering(self.state.lock());
        if state.holders == 0 {
            log::trace!("gate release with no holders");
            return false;
        }
        state.holders -= 1;
        log::trace!("gate release: {} holder(s)", state.holders);
        state.holders == 0
    }

    /// Wait until the gate reads free, then take it
    ///
    /// Polls every [`POLL_INTERVAL`]. Each poll first reclaims one stale
    /// holder if the gate has been idle past its timeout. The internal
    /// mutex is released while sleeping so other threads can `release`.
    pub fn try_acquire(&self, max_wait: MaxWait) -> bool {
        let start_ms = self.clock.now_ms();
        let mut polls: u64 = 0;

        loop {
            {
                let mut state = lock_recovering(self.state.lock());
                let now_ms = self.clock.now_ms();
                self.reclaim_stale(&mut state, now_ms);

                if state.holders == 0 {
                    state.holders = 1;
                    state.last_activity_ms = now_ms;
                    log::trace!("gate acquired after {} poll(s)", polls);
                    return true;
                }
            }

            if let MaxWait::Millis(limit_ms) = max_wait {
                // Every poll sleeps at least POLL_INTERVAL, whatever the clock says
                let waited_ms = self
                    .clock
                    .now_ms()
                    .saturating_sub(start_ms)
                    .max(polls * POLL_INTERVAL.as_millis() as u64);
                if waited_ms >= limit_ms {
                    log::trace!("gate busy, gave up after {}ms", waited_ms);
                    return false;
                }
            }

            std::thread::sleep(POLL_INTERVAL);
            polls += 1;
        }
    }

    fn reclaim_stale(&self, state: &mut GateState, now_ms: u64) {
        if state.holders > 0 && now_ms > state.last_activity_ms.saturating_add(self.timeout_ms) {
            state.holders -= 1;
            state.last_activity_ms = now_ms;
            log::debug!(
                "gate reclaimed a stale holder idle past {}ms, {} remaining",
                self.timeout_ms,
                state.holders
            );
        }
    }
}

impl fmt::Debug for TimedCountLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedCountLock")
            .field("timeout_ms", &self.timeout_ms)
            .field("holders", &self.count())
            .finish()
    }
}
