//! Public API for the dispatcher
//!
//! External modules should import from here rather than from the
//! individual dispatch modules.

// Orchestration
pub use crate::dispatch::manager::{DispatchStats, EventManager};
pub use crate::dispatch::settings::ManagerSettings;

// Admission gate
pub use crate::dispatch::gate::{MaxWait, TimedCountLock};

// Ordered storage
pub use crate::dispatch::store::{Prioritized, PriorityStore};

// Error handling
pub use crate::dispatch::error::{DispatchError, DispatchResult};

// Message capability set, re-exported for callers that only depend on dispatch
pub use crate::message::{Message, MessageHandle, MessageHeader, MessageId};
