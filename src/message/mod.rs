//! Message entities scheduled by the dispatcher
//!
//! A message is any type implementing [`Message`]: it owns a
//! [`MessageHeader`] (identity, priority, TTL, discard counters) and reacts
//! to four lifecycle callbacks. [`MessageGroup`] fans those callbacks out
//! to child messages and [`SystemMessage`] covers internal, non-expiring
//! work.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──post──▶ Queued ──pass──┬──▶ ProcessedOK ──sweep──▶ Removed
//!                     ▲            ├──▶ Expired ──────sweep──▶ Removed
//!                     └─ retry ────┤
//!                     (discards    └──▶ Discarded ────────────▶ Removed
//!                      below max)       (discards reached max)
//! ```

mod group;
mod header;
mod id;
mod system;
mod traits;

pub use group::MessageGroup;
pub use header::{
    MessageFactory, MessageHeader, DEFAULT_MAX_DISCARDS, DEFAULT_PRIORITY, DEFAULT_TTL_MS,
};
pub use id::{IdSequence, MessageId, Origin};
pub use system::SystemMessage;
pub use traits::{Message, MessageHandle};
