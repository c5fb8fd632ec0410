//! Tunables for an [`EventManager`](super::EventManager)

use crate::dispatch::gate::MaxWait;
use crate::message::DEFAULT_MAX_DISCARDS;
use serde::Deserialize;

/// Stale-holder timeout used when none is configured
pub const DEFAULT_GATE_TIMEOUT_MS: u64 = 300;
/// Admission wait used by producers that take it from settings
pub const DEFAULT_POST_WAIT: MaxWait = MaxWait::Millis(50);

/// `[manager]` table of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerSettings {
    /// Idle time after which a gate holder is considered stale
    pub gate_timeout_ms: u64,
    /// How long `post_message` waits for the gate
    pub post_wait_ms: MaxWait,
    /// Failed processing attempts before a message is discarded
    pub max_discards: u8,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            gate_timeout_ms: DEFAULT_GATE_TIMEOUT_MS,
            post_wait_ms: DEFAULT_POST_WAIT,
            max_discards: DEFAULT_MAX_DISCARDS,
        }
    }
}

impl ManagerSettings {
    /// Check value ranges; the error names the offending field
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if self.gate_timeout_ms == 0 {
            return Err((
                "gate_timeout_ms",
                "must be greater than 0 (a zero timeout reclaims every holder immediately)"
                    .to_string(),
            ));
        }
        if self.max_discards == 0 {
            return Err(("max_discards", "must be at least 1".to_string()));
        }
        Ok(())
    }
}
