//! Prioritised Event Dispatcher
//!
//! Producers post messages through a timed admission gate into a store
//! kept in ascending priority order. A consumer opens a processing
//! bracket, runs one or more passes over a priority range and closes the
//! bracket, which sweeps out everything that was handled or expired.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  post_message(max_wait)   ┌──────────────────────────┐
//! │  Producer  │ ────────────────────────▶ │ TimedCountLock (gate)    │
//! └────────────┘   on_post(admitted)       └────────────┬─────────────┘
//!                                                       │ insert
//!                                                       ▼
//! ┌────────────┐  begin / process / end    ┌──────────────────────────┐
//! │  Consumer  │ ────────────────────────▶ │ PriorityStore (0 first)  │
//! └────────────┘                           │ ┌───┬───┬───┬───┬───┐    │
//!                                          │ │ 0 │ 1 │ 1 │ 4 │ 9 │    │
//!                                          │ └───┴───┴───┴───┴───┘    │
//!                                          └────────────┬─────────────┘
//!                                                       │ discard limit
//!                                                       ▼
//!                                          ┌──────────────────────────┐
//!                                          │ discard history          │
//!                                          └──────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use ses::dispatch::{EventManager, MaxWait};
//! use ses::message::{Message, MessageHandle, MessageHeader};
//!
//! struct Ping {
//!     header: MessageHeader,
//! }
//!
//! impl Message for Ping {
//!     fn header(&self) -> &MessageHeader {
//!         &self.header
//!     }
//!     fn header_mut(&mut self) -> &mut MessageHeader {
//!         &mut self.header
//!     }
//!     fn on_post(&mut self, _sender: &EventManager, _admitted: bool) {}
//!     fn on_process(&mut self, _sender: &EventManager) -> bool {
//!         true
//!     }
//!     fn on_discard(&mut self, _sender: &EventManager, _timestamp_ms: u64) {}
//!     fn on_expired(&mut self, _sender: &EventManager, _timestamp_ms: u64) {}
//! }
//!
//! # fn main() -> Result<(), ses::dispatch::DispatchError> {
//! let manager = EventManager::new(300);
//! let ping = Ping {
//!     header: manager.factory().header(1, 0),
//! };
//! assert!(manager.post_message(MessageHandle::new(ping), MaxWait::Millis(50))?);
//!
//! manager.begin_messages();
//! manager.process_messages(0, 9)?;
//! manager.end_process_messages()?;
//! assert_eq!(manager.message_count()?, 0);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub(crate) mod error;
mod gate;
mod manager;
mod settings;
mod store;

pub use error::{DispatchError, DispatchResult};
pub use gate::{MaxWait, TimedCountLock, POLL_INTERVAL};
pub use manager::{DispatchStats, EventManager};
pub use settings::{ManagerSettings, DEFAULT_GATE_TIMEOUT_MS, DEFAULT_POST_WAIT};
pub use store::{by_priority, Comparator, Prioritized, PriorityStore};

#[cfg(test)]
mod tests;
