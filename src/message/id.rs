//! Packed message identity and the counter that mints it

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

const INTERNAL_BIT: u32 = 0b01;
const GROUP_BIT: u32 = 0b10;
const SEQUENCE_SHIFT: u32 = 2;
const SEQUENCE_MASK: u32 = (1 << 30) - 1;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Submitted by application code
    Producer,
    /// Generated by the event system itself
    System,
}

/// 32-bit message identity
///
/// Layout: bit 0 internal flag, bit 1 group flag, bits 2..32 a 30-bit
/// sequence. Equality, ordering and hashing compare the packed value only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u32);

impl MessageId {
    /// Pack an id; sequences wider than 30 bits are truncated
    pub fn new(sequence: u32, origin: Origin, group: bool) -> Self {
        let mut raw = (sequence & SEQUENCE_MASK) << SEQUENCE_SHIFT;
        if origin == Origin::System {
            raw |= INTERNAL_BIT;
        }
        if group {
            raw |= GROUP_BIT;
        }
        Self(raw)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn is_internal(&self) -> bool {
        self.0 & INTERNAL_BIT != 0
    }

    pub fn is_group(&self) -> bool {
        self.0 & GROUP_BIT != 0
    }

    pub fn origin(&self) -> Origin {
        if self.is_internal() {
            Origin::System
        } else {
            Origin::Producer
        }
    }

    pub fn sequence(&self) -> u32 {
        (self.0 >> SEQUENCE_SHIFT) & SEQUENCE_MASK
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = if self.is_internal() { 's' } else { 'u' };
        if self.is_group() {
            write!(f, "{}{}g", self.sequence(), origin)
        } else {
            write!(f, "{}{}", self.sequence(), origin)
        }
    }
}

/// Monotonic source of message sequences
///
/// Starts at 0. Owned by a [`MessageFactory`](super::MessageFactory)
/// rather than living in a static, so each manager (and each test) gets
/// its own numbering. Ids are therefore unique per sequence only.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: AtomicU32,
}

impl IdSequence {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// Mint the next id
    pub fn next(&self, origin: Origin, group: bool) -> MessageId {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed);
        MessageId::new(sequence, origin, group)
    }

    /// Sequence the next call to [`next`](Self::next) will use
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}
