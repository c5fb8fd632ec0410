//! Per-message lifecycle state shared by every message kind

use crate::core::clock::SharedClock;
use crate::message::id::{IdSequence, MessageId, Origin};
use std::fmt;

/// Priority assigned when a producer does not choose one
pub const DEFAULT_PRIORITY: u8 = 5;
/// Time-to-live assigned when a producer does not choose one
pub const DEFAULT_TTL_MS: u32 = 1000;
/// Failed processing attempts tolerated before a message is discarded
pub const DEFAULT_MAX_DISCARDS: u8 = 5;

/// Identity, scheduling attributes and lifecycle counters of a message
///
/// The id is fixed at construction. The discard counter only grows and
/// the processed mark only goes from unset to set; the dispatcher is the
/// only writer of either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    id: MessageId,
    priority: u8,
    timestamp_ms: u64,
    ttl_ms: u32,
    discards: u8,
    max_discards: u8,
    marked: bool,
}

impl MessageHeader {
    /// `priority` 0 is the most urgent; `ttl_ms` 0 never expires
    pub fn new(id: MessageId, timestamp_ms: u64, priority: u8, ttl_ms: u32) -> Self {
        Self {
            id,
            priority,
            timestamp_ms,
            ttl_ms,
            discards: 0,
            max_discards: DEFAULT_MAX_DISCARDS,
            marked: false,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn ttl_ms(&self) -> u32 {
        self.ttl_ms
    }

    pub fn discards(&self) -> u8 {
        self.discards
    }

    pub fn max_discards(&self) -> u8 {
        self.max_discards
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn set_priority(&mut self, priority: u8) {
        self.priority = priority;
    }

    pub fn set_ttl_ms(&mut self, ttl_ms: u32) {
        self.ttl_ms = ttl_ms;
    }

    pub fn set_max_discards(&mut self, max_discards: u8) {
        self.max_discards = max_discards;
    }

    pub fn set_timestamp_ms(&mut self, timestamp_ms: u64) {
        self.timestamp_ms = timestamp_ms;
    }

    /// True once `now_ms` is strictly past creation time plus TTL
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.ttl_ms > 0 && now_ms > self.timestamp_ms.saturating_add(u64::from(self.ttl_ms))
    }

    pub fn is_max_discard(&self) -> bool {
        self.discards >= self.max_discards
    }

    pub(crate) fn record_discard(&mut self) {
        self.discards = self.discards.saturating_add(1);
    }

    pub(crate) fn mark_processed(&mut self) {
        self.marked = true;
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message {} (prio {}, ttl {}ms, discards {}/{})",
            self.id, self.priority, self.ttl_ms, self.discards, self.max_discards
        )
    }
}

/// Mints message headers from an owned id sequence and a clock
///
/// Each [`EventManager`](crate::dispatch::EventManager) owns one factory
/// sharing its clock, so message timestamps and expiry checks agree.
pub struct MessageFactory {
    ids: IdSequence,
    clock: SharedClock,
    max_discards: u8,
}

impl MessageFactory {
    pub fn new(clock: SharedClock) -> Self {
        Self::with_max_discards(clock, DEFAULT_MAX_DISCARDS)
    }

    /// Factory whose headers start with `max_discards` instead of the default
    pub fn with_max_discards(clock: SharedClock, max_discards: u8) -> Self {
        Self {
            ids: IdSequence::new(),
            clock,
            max_discards,
        }
    }

    /// Header for a producer message
    pub fn header(&self, priority: u8, ttl_ms: u32) -> MessageHeader {
        self.mint(Origin::Producer, false, priority, ttl_ms)
    }

    /// Header carrying the group flag
    pub fn group_header(&self, priority: u8, ttl_ms: u32) -> MessageHeader {
        self.mint(Origin::Producer, true, priority, ttl_ms)
    }

    /// Header for an internal message; system messages never expire
    pub fn system_header(&self, priority: u8) -> MessageHeader {
        self.mint(Origin::System, false, priority, 0)
    }

    /// Header with the default priority and TTL
    pub fn default_header(&self) -> MessageHeader {
        self.header(DEFAULT_PRIORITY, DEFAULT_TTL_MS)
    }

    pub fn ids(&self) -> &IdSequence {
        &self.ids
    }

    pub fn max_discards(&self) -> u8 {
        self.max_discards
    }

    fn mint(&self, origin: Origin, group: bool, priority: u8, ttl_ms: u32) -> MessageHeader {
        let id = self.ids.next(origin, group);
        let mut header = MessageHeader::new(id, self.clock.now_ms(), priority, ttl_ms);
        header.set_max_discards(self.max_discards);
        header
    }
}

impl fmt::Debug for MessageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFactory")
            .field("next_sequence", &self.ids.peek())
            .field("max_discards", &self.max_discards)
            .finish()
    }
}
