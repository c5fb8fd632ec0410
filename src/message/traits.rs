//! The message capability set and the shared handle the dispatcher stores

use crate::core::sync::handle_mutex_poison;
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::EventManager;
use crate::message::header::MessageHeader;
use crate::message::id::MessageId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

/// Unit of work scheduled by an [`EventManager`]
///
/// Implementors own a [`MessageHeader`] and react to the four lifecycle
/// callbacks. The manager is passed as sender context so a callback can
/// query it or post follow-up messages.
///
/// # Example Implementation
///
/// ```rust
/// use ses::dispatch::EventManager;
/// use ses::message::{Message, MessageHeader};
///
/// struct Greeting {
///     header: MessageHeader,
/// }
///
/// impl Message for Greeting {
///     fn header(&self) -> &MessageHeader {
///         &self.header
///     }
///
///     fn header_mut(&mut self) -> &mut MessageHeader {
///         &mut self.header
///     }
///
///     fn on_post(&mut self, _sender: &EventManager, _admitted: bool) {}
///
///     fn on_process(&mut self, _sender: &EventManager) -> bool {
///         println!("Hello World!");
///         true
///     }
///
///     fn on_discard(&mut self, _sender: &EventManager, _timestamp_ms: u64) {}
///
///     fn on_expired(&mut self, _sender: &EventManager, _timestamp_ms: u64) {}
/// }
/// ```
pub trait Message: Send {
    fn header(&self) -> &MessageHeader;

    fn header_mut(&mut self) -> &mut MessageHeader;

    /// Called exactly once per post; `admitted` is false when the
    /// admission gate timed out and the message was not stored
    fn on_post(&mut self, sender: &EventManager, admitted: bool);

    /// Handle the message; `false` counts as one discard
    fn on_process(&mut self, sender: &EventManager) -> bool;

    /// Called once, when the discard threshold is reached
    fn on_discard(&mut self, sender: &EventManager, timestamp_ms: u64);

    /// Called once, when the TTL has run out
    fn on_expired(&mut self, sender: &EventManager, timestamp_ms: u64);

    fn is_expired(&self, now_ms: u64) -> bool {
        self.header().is_expired(now_ms)
    }
}

/// Cloneable shared reference to a boxed [`Message`]
///
/// The id is cached at construction, so equality and hashing never take
/// the message lock.
#[derive(Clone)]
pub struct MessageHandle {
    id: MessageId,
    inner: Arc<Mutex<dyn Message>>,
}

impl MessageHandle {
    pub fn new<M: Message + 'static>(message: M) -> Self {
        let id = message.header().id();
        Self {
            id,
            inner: Arc::new(Mutex::new(message)),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Lock the message for reading or mutation
    ///
    /// Fails only if a previous callback panicked while holding the lock.
    pub fn lock(&self) -> DispatchResult<MutexGuard<'_, dyn Message + 'static>> {
        handle_mutex_poison(self.inner.lock(), |message| {
            DispatchError::Synchronisation { message }
        })
    }

    /// Copy of the message's header
    pub fn header(&self) -> DispatchResult<MessageHeader> {
        Ok(self.lock()?.header().clone())
    }

    /// True when both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for MessageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageHandle {}

impl Hash for MessageHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHandle").field("id", &self.id).finish()
    }
}

impl<M: Message + 'static> From<M> for MessageHandle {
    fn from(message: M) -> Self {
        Self::new(message)
    }
}
