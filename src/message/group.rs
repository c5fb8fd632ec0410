//! Composite message that fans lifecycle callbacks out to its children

use crate::dispatch::EventManager;
use crate::message::header::MessageHeader;
use crate::message::traits::{Message, MessageHandle};

/// A message scheduled as one unit on behalf of several children
///
/// Only the group's own id lives in the dispatcher's store. Each
/// callback is forwarded to every child in insertion order; the group is
/// expired and prioritised by its own header exactly like a leaf message.
///
/// # Example
///
/// ```rust,no_run
/// # use ses::dispatch::{EventManager, MaxWait};
/// # use ses::message::{MessageGroup, MessageHandle};
/// # fn example(manager: &EventManager, a: MessageHandle, b: MessageHandle) {
/// let header = manager.factory().group_header(1, 0);
/// let mut group = MessageGroup::new(header, "startup");
/// group.add_sub_message(a);
/// group.add_sub_message(b);
///
/// manager.post_message(group.into(), MaxWait::Forever).unwrap();
/// # }
/// ```
pub struct MessageGroup {
    header: MessageHeader,
    source: String,
    children: Vec<MessageHandle>,
}

impl MessageGroup {
    pub fn new(header: MessageHeader, source: impl Into<String>) -> Self {
        Self {
            header,
            source: source.into(),
            children: Vec::new(),
        }
    }

    /// Label of the component that assembled the group
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn add_sub_message(&mut self, message: MessageHandle) {
        self.children.push(message);
    }

    pub fn children(&self) -> &[MessageHandle] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    // Children are user messages; a poisoned one is skipped, not fatal
    fn for_each_child(&self, mut callback: impl FnMut(&mut (dyn Message + 'static))) {
        for child in &self.children {
            match child.lock() {
                Ok(mut guard) => callback(&mut *guard),
                Err(e) => log::warn!(
                    "group {} ({}): skipping child {}: {}",
                    self.header.id(),
                    self.source,
                    child.id(),
                    e
                ),
            }
        }
    }
}

impl Message for MessageGroup {
    fn header(&self) -> &MessageHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    fn on_post(&mut self, sender: &EventManager, admitted: bool) {
        self.for_each_child(|child| child.on_post(sender, admitted));
    }

    /// Processes every child; the group itself always reports success
    fn on_process(&mut self, sender: &EventManager) -> bool {
        let group_id = self.header.id();
        self.for_each_child(|child| {
            if !child.on_process(sender) {
                log::debug!(
                    "group {}: child {} reported failure",
                    group_id,
                    child.header().id()
                );
            }
        });
        true
    }

    fn on_discard(&mut self, sender: &EventManager, timestamp_ms: u64) {
        self.for_each_child(|child| child.on_discard(sender, timestamp_ms));
    }

    fn on_expired(&mut self, sender: &EventManager, timestamp_ms: u64) {
        self.for_each_child(|child| child.on_expired(sender, timestamp_ms));
    }
}
