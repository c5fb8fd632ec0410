//! Message that records every lifecycle callback it receives

use ses::dispatch::EventManager;
use ses::message::{Message, MessageHandle, MessageHeader};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Callback counters shared between a test and its message
#[derive(Debug, Default)]
pub struct Record {
    pub admitted: AtomicUsize,
    pub rejected: AtomicUsize,
    pub process_attempts: AtomicUsize,
    pub processed: AtomicUsize,
    pub discarded: AtomicUsize,
    pub expired: AtomicUsize,
    pub last_failure_ms: AtomicU64,
    pub discard_ms: AtomicU64,
}

/// Read a counter
pub fn load(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Outcome script for `on_process`: the first `failures` calls fail
pub struct Recording {
    header: MessageHeader,
    record: Arc<Record>,
    failures: usize,
    order_log: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Recording {
    pub fn new(header: MessageHeader, failures: usize) -> (Self, Arc<Record>) {
        let record = Arc::new(Record::default());
        let message = Self {
            header,
            record: Arc::clone(&record),
            failures,
            order_log: None,
        };
        (message, record)
    }

    /// Push this message's priority into `log` on every successful process
    pub fn with_order_log(mut self, log: Arc<Mutex<Vec<u8>>>) -> Self {
        self.order_log = Some(log);
        self
    }

    pub fn handle(self) -> MessageHandle {
        MessageHandle::new(self)
    }
}

impl Message for Recording {
    fn header(&self) -> &MessageHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    fn on_post(&mut self, _sender: &EventManager, admitted: bool) {
        let counter = if admitted {
            &self.record.admitted
        } else {
            &self.record.rejected
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn on_process(&mut self, sender: &EventManager) -> bool {
        self.record.process_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures > 0 {
            self.failures -= 1;
            self.record
                .last_failure_ms
                .store(sender.clock().now_ms(), Ordering::SeqCst);
            return false;
        }
        if let Some(log) = &self.order_log {
            log.lock().unwrap().push(self.header.priority());
        }
        self.record.processed.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn on_discard(&mut self, _sender: &EventManager, timestamp_ms: u64) {
        self.record.discarded.fetch_add(1, Ordering::SeqCst);
        self.record.discard_ms.store(timestamp_ms, Ordering::SeqCst);
    }

    fn on_expired(&mut self, _sender: &EventManager, _timestamp_ms: u64) {
        self.record.expired.fetch_add(1, Ordering::SeqCst);
    }
}
