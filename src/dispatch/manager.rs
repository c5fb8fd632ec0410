//! Event manager: admission, prioritised processing passes and sweeping
//!
//! A processing session is bracketed by [`EventManager::begin_messages`]
//! and [`EventManager::end_process_messages`]. Inside the bracket any
//! number of [`EventManager::process_messages`] passes walk the store in
//! ascending priority order; messages that were handled or expired are
//! marked and swept out when the bracket ends.
//!
//! # Locking
//!
//! Three locks are involved: the admission gate, the store mutex and each
//! message's own mutex. The store mutex and a message mutex are never held
//! at the same time. A pass snapshots the handles under the store lock and
//! then visits them one by one, so message callbacks may call back into
//! the manager.
//!
//! Message ids come from the manager's own sequence, so they are unique
//! per manager only. Sweeping and discarding match store entries by
//! handle allocation, never by id.
//!
//! Posting from inside a callback waits on the gate, which the bracket
//! holds. Such a post only goes through once the gate reclaims the
//! bracket's holder as stale, so callbacks should post with a short wait.

use crate::core::clock::{self, SharedClock};
use crate::core::sync::handle_mutex_poison;
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::gate::{MaxWait, TimedCountLock};
use crate::dispatch::settings::ManagerSettings;
use crate::dispatch::store::{Prioritized, PriorityStore};
use crate::message::{MessageFactory, MessageHandle, MessageId, DEFAULT_MAX_DISCARDS};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Store entry; the priority is captured at admission
#[derive(Debug, Clone)]
struct QueuedMessage {
    priority: u8,
    handle: MessageHandle,
}

impl Prioritized for QueuedMessage {
    fn priority(&self) -> u8 {
        self.priority
    }
}

impl PartialEq for QueuedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

/// Point-in-time counters of a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchStats {
    pub live: usize,
    pub discarded: usize,
    pub gate_holders: u32,
}

impl fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} live, {} discarded, {} gate holder(s)",
            self.live, self.discarded, self.gate_holders
        )
    }
}

/// Counts of what one processing pass did
#[derive(Debug, Default)]
struct PassTally {
    visited: usize,
    processed: usize,
    failed: usize,
    expired: usize,
    discarded: usize,
}

/// Owns the live store, the discard history and the admission gate
pub struct EventManager {
    gate: TimedCountLock,
    store: Mutex<PriorityStore<QueuedMessage>>,
    discards: Mutex<Vec<MessageHandle>>,
    factory: MessageFactory,
    clock: SharedClock,
}

impl EventManager {
    /// Manager on the steady clock
    pub fn new(gate_timeout_ms: u64) -> Self {
        Self::with_clock(gate_timeout_ms, clock::steady())
    }

    /// Manager reading time from `clock`; its gate and factory share it
    pub fn with_clock(gate_timeout_ms: u64, clock: SharedClock) -> Self {
        Self::build(gate_timeout_ms, DEFAULT_MAX_DISCARDS, clock)
    }

    pub fn from_settings(settings: &ManagerSettings) -> Self {
        Self::build(
            settings.gate_timeout_ms,
            settings.max_discards,
            clock::steady(),
        )
    }

    fn build(gate_timeout_ms: u64, max_discards: u8, clock: SharedClock) -> Self {
        Self {
            gate: TimedCountLock::with_clock(gate_timeout_ms, clock.clone()),
            store: Mutex::new(PriorityStore::new()),
            discards: Mutex::new(Vec::new()),
            factory: MessageFactory::with_max_discards(clock.clone(), max_discards),
            clock,
        }
    }

    /// Header factory sharing this manager's clock
    pub fn factory(&self) -> &MessageFactory {
        &self.factory
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    fn lock_store(&self) -> DispatchResult<MutexGuard<'_, PriorityStore<QueuedMessage>>> {
        handle_mutex_poison(self.store.lock(), |message| {
            DispatchError::Synchronisation { message }
        })
    }

    fn lock_discards(&self) -> DispatchResult<MutexGuard<'_, Vec<MessageHandle>>> {
        handle_mutex_poison(self.discards.lock(), |message| {
            DispatchError::Synchronisation { message }
        })
    }

    /// Submit a message through the admission gate
    ///
    /// `on_post` fires exactly once: with `true` before the message is
    /// stored, or with `false` when the gate stayed busy for `max_wait`.
    /// Returns whether the message was admitted.
    pub fn post_message(&self, message: MessageHandle, max_wait: MaxWait) -> DispatchResult<bool> {
        if !self.gate.try_acquire(max_wait) {
            log::warn!(
                "message {} rejected: admission gate busy for {}",
                message.id(),
                max_wait
            );
            message.lock()?.on_post(self, false);
            return Ok(false);
        }

        let admitted = self.admit(message);
        self.gate.release();
        admitted.map(|_| true)
    }

    fn admit(&self, message: MessageHandle) -> DispatchResult<()> {
        let priority = {
            let mut guard = message.lock()?;
            guard.on_post(self, true);
            guard.header().priority()
        };

        let mut store = self.lock_store()?;
        log::debug!(
            "posted message {} at priority {} ({} queued)",
            message.id(),
            priority,
            store.len() + 1
        );
        store.insert(QueuedMessage {
            priority,
            handle: message,
        });
        Ok(())
    }

    /// Empty the live store and the discard history
    ///
    /// Waits for the gate without limit.
    pub fn clear_messages(&self) -> DispatchResult<bool> {
        self.gate.try_acquire(MaxWait::Forever);
        let cleared = self.clear_locked();
        self.gate.release();
        cleared
    }

    fn clear_locked(&self) -> DispatchResult<bool> {
        let mut store = self.lock_store()?;
        let mut discards = self.lock_discards()?;
        log::debug!(
            "clearing {} live and {} discarded message(s)",
            store.len(),
            discards.len()
        );
        store.clear();
        discards.clear();
        Ok(true)
    }

    /// Live message count; does not touch the gate
    pub fn message_count(&self) -> DispatchResult<usize> {
        Ok(self.lock_store()?.len())
    }

    /// First live message with `id`, without removing it
    ///
    /// Returns `None` when absent or when the gate stayed busy for
    /// `max_wait`. The gate is released again before returning.
    pub fn get_by_id(
        &self,
        id: MessageId,
        max_wait: MaxWait,
    ) -> DispatchResult<Option<MessageHandle>> {
        if !self.gate.try_acquire(max_wait) {
            log::debug!("lookup of {} gave up: gate busy for {}", id, max_wait);
            return Ok(None);
        }

        let found = self.lock_store().map(|store| {
            store
                .iter()
                .find(|entry| entry.handle.id() == id)
                .map(|entry| entry.handle.clone())
        });
        self.gate.release();
        found
    }

    /// Open a processing bracket; always succeeds
    pub fn begin_messages(&self) -> bool {
        self.gate.add();
        match self.lock_store() {
            Ok(store) => log::debug!(
                "begin processing: {} message(s), {} gate holder(s)",
                store.len(),
                self.gate.count()
            ),
            Err(e) => log::warn!(
                "begin processing with {} gate holder(s): {}",
                self.gate.count(),
                e
            ),
        }
        true
    }

    /// Run one pass over priorities `from..=to`
    ///
    /// Returns `Ok(false)` without doing anything when no bracket is open.
    /// Every unmarked message is first checked for expiry, then processed
    /// if its priority is in range. A message failing `on_process` counts
    /// one discard and is retired once it reaches its threshold.
    pub fn process_messages(&self, from: u8, to: u8) -> DispatchResult<bool> {
        if self.gate.count() == 0 {
            log::debug!("process pass refused: no open bracket");
            return Ok(false);
        }

        let now_ms = self.clock.now_ms();
        let snapshot: Vec<MessageHandle> = self
            .lock_store()?
            .iter()
            .map(|entry| entry.handle.clone())
            .collect();

        let mut tally = PassTally::default();
        for handle in snapshot {
            let mut message = match handle.lock() {
                Ok(message) => message,
                Err(e) => {
                    log::warn!("skipping message {}: {}", handle.id(), e);
                    continue;
                }
            };
            if message.header().is_marked() {
                continue;
            }
            tally.visited += 1;

            if message.is_expired(now_ms) {
                log::info!("{} expired", message.header());
                message.on_expired(self, now_ms);
                message.header_mut().mark_processed();
                tally.expired += 1;
                continue;
            }

            let priority = message.header().priority();
            if priority < from || priority > to {
                continue;
            }

            if message.on_process(self) {
                message.header_mut().mark_processed();
                tally.processed += 1;
            } else {
                drop(message);
                tally.failed += 1;
                if self.discard_message(&handle)? {
                    tally.discarded += 1;
                }
            }
        }

        log::debug!(
            "pass {}..={}: visited {}, processed {}, failed {}, expired {}, discarded {}",
            from,
            to,
            tally.visited,
            tally.processed,
            tally.failed,
            tally.expired,
            tally.discarded
        );
        Ok(true)
    }

    /// Single-priority pass, same as `process_messages(priority, priority)`
    pub fn process_priority(&self, priority: u8) -> DispatchResult<bool> {
        self.process_messages(priority, priority)
    }

    /// Close a processing bracket
    ///
    /// Sweeps every marked message out of the store, then releases the
    /// holder added by [`begin_messages`](Self::begin_messages). A message
    /// whose lock was poisoned by a panicking callback is swept as well.
    pub fn end_process_messages(&self) -> DispatchResult<bool> {
        let swept = self.sweep_marked();
        self.gate.release();
        swept.map(|_| true)
    }

    fn sweep_marked(&self) -> DispatchResult<()> {
        let snapshot: Vec<MessageHandle> = self
            .lock_store()?
            .iter()
            .map(|entry| entry.handle.clone())
            .collect();

        // Matched by allocation: ids are only unique per sequence
        let mut finished: Vec<MessageHandle> = Vec::new();
        for handle in snapshot {
            let done = match handle.lock() {
                Ok(message) => message.header().is_marked(),
                Err(e) => {
                    log::warn!("dropping message {}: {}", handle.id(), e);
                    true
                }
            };
            if done {
                finished.push(handle);
            }
        }

        if finished.is_empty() {
            return Ok(());
        }

        let mut store = self.lock_store()?;
        let removed =
            store.retain(|entry| !finished.iter().any(|done| done.ptr_eq(&entry.handle)));
        log::debug!("swept {} message(s), {} remain", removed, store.len());
        Ok(())
    }

    /// Record one failed attempt; retire the message at its threshold
    ///
    /// A retired message moves to the discard history, leaves the live
    /// store and gets `on_discard` with the current time. Returns whether
    /// the message was retired.
    pub(crate) fn discard_message(&self, handle: &MessageHandle) -> DispatchResult<bool> {
        {
            let mut message = handle.lock()?;
            message.header_mut().record_discard();
            if !message.header().is_max_discard() {
                log::debug!("{} failed, will retry", message.header());
                return Ok(false);
            }
            log::warn!("{} reached its discard limit", message.header());
        }

        self.lock_discards()?.push(handle.clone());
        {
            let mut store = self.lock_store()?;
            if let Some(index) = store.position(|entry| entry.handle.ptr_eq(handle)) {
                store.remove_at(index);
            }
        }

        let now_ms = self.clock.now_ms();
        handle.lock()?.on_discard(self, now_ms);
        Ok(true)
    }

    /// Number of messages retired by the discard threshold
    pub fn discarded_count(&self) -> DispatchResult<usize> {
        Ok(self.lock_discards()?.len())
    }

    /// Retired messages, oldest first
    pub fn discard_history(&self) -> DispatchResult<Vec<MessageHandle>> {
        Ok(self.lock_discards()?.clone())
    }

    /// Live messages in store order
    pub fn snapshot(&self) -> DispatchResult<Vec<MessageHandle>> {
        Ok(self
            .lock_store()?
            .iter()
            .map(|entry| entry.handle.clone())
            .collect())
    }

    pub fn gate_holders(&self) -> u32 {
        self.gate.count()
    }

    pub fn stats(&self) -> DispatchResult<DispatchStats> {
        Ok(DispatchStats {
            live: self.message_count()?,
            discarded: self.discarded_count()?,
            gate_holders: self.gate_holders(),
        })
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("gate", &self.gate)
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}
