//! Dispatcher guarantees
//!
//! Ordering of the store, TTL boundaries, discard thresholds and
//! admission gate behaviour.

use crate::common::recording::{load, Recording};
use ses::core::clock::ManualClock;
use ses::dispatch::{EventManager, MaxWait};
use ses::message::MessageHandle;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn manual_manager(gate_timeout_ms: u64) -> (EventManager, ManualClock) {
    let clock = ManualClock::new(1_000);
    let manager = EventManager::with_clock(gate_timeout_ms, Arc::new(clock.clone()));
    (manager, clock)
}

fn store_priorities(manager: &EventManager) -> Vec<u8> {
    manager
        .snapshot()
        .unwrap()
        .iter()
        .map(|handle| handle.header().unwrap().priority())
        .collect()
}

fn run_bracket(manager: &EventManager, from: u8, to: u8) {
    assert!(manager.begin_messages());
    assert!(manager.process_messages(from, to).unwrap());
    assert!(manager.end_process_messages().unwrap());
}

#[test]
fn test_store_sorted_after_every_post() {
    let (manager, _) = manual_manager(300);
    let sequence = [6u8, 2, 9, 0, 2, 7, 1, 5, 5, 3, 8, 0];

    for priority in sequence {
        let (message, _) = Recording::new(manager.factory().header(priority, 0), 0);
        assert!(manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap());

        let priorities = store_priorities(&manager);
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }
    assert_eq!(manager.message_count().unwrap(), sequence.len());
}

#[test]
fn test_pass_visits_in_priority_order() {
    let (manager, _) = manual_manager(300);
    let order = Arc::new(Mutex::new(Vec::new()));

    for priority in [4u8, 0, 3, 1, 2] {
        let (message, _) = Recording::new(manager.factory().header(priority, 0), 0);
        let handle = message.with_order_log(Arc::clone(&order)).handle();
        manager.post_message(handle, MaxWait::Millis(0)).unwrap();
    }
    run_bracket(&manager, 0, 9);

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_zero_ttl_never_expires() {
    let (manager, clock) = manual_manager(u64::MAX / 2);
    let (message, record) = Recording::new(manager.factory().header(5, 0), 0);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    clock.advance(u64::MAX / 4);
    run_bracket(&manager, 9, 9);

    assert_eq!(load(&record.expired), 0);
    assert_eq!(manager.message_count().unwrap(), 1);
}

#[test]
fn test_ttl_boundary() {
    let (manager, clock) = manual_manager(300);
    let (message, record) = Recording::new(manager.factory().header(5, 200), 0);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    // Exactly at created + ttl is not yet expired
    clock.advance(200);
    run_bracket(&manager, 9, 9);
    assert_eq!(load(&record.expired), 0);
    assert_eq!(manager.message_count().unwrap(), 1);

    clock.advance(1);
    run_bracket(&manager, 9, 9);
    assert_eq!(load(&record.expired), 1);
    assert_eq!(load(&record.processed), 0);
    assert_eq!(manager.message_count().unwrap(), 0);
}

#[test]
fn test_failures_below_threshold_then_success() {
    let (manager, clock) = manual_manager(300);
    let (message, record) = Recording::new(manager.factory().header(1, 0), 4);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    for _ in 0..5 {
        clock.advance(10);
        run_bracket(&manager, 0, 9);
    }

    assert_eq!(load(&record.process_attempts), 5);
    assert_eq!(load(&record.processed), 1);
    assert_eq!(load(&record.discarded), 0);
    assert_eq!(manager.discarded_count().unwrap(), 0);
    assert_eq!(manager.message_count().unwrap(), 0);
}

#[test]
fn test_failures_reaching_threshold_discard_once() {
    let (manager, clock) = manual_manager(300);
    let (message, record) = Recording::new(manager.factory().header(1, 0), usize::MAX);
    let handle: MessageHandle = message.handle();
    manager.post_message(handle.clone(), MaxWait::Millis(0)).unwrap();

    for _ in 0..8 {
        clock.advance(10);
        run_bracket(&manager, 0, 9);
    }

    // Default threshold is 5; later brackets no longer see the message
    assert_eq!(load(&record.process_attempts), 5);
    assert_eq!(load(&record.discarded), 1);
    assert_eq!(manager.discard_history().unwrap(), vec![handle]);
    assert_eq!(manager.message_count().unwrap(), 0);
    assert!(
        record.discard_ms.load(Ordering::SeqCst) >= record.last_failure_ms.load(Ordering::SeqCst)
    );
}

#[test]
fn test_forever_post_admits_once_holder_goes_stale() {
    let manager = EventManager::new(30);
    manager.begin_messages();

    let (message, record) = Recording::new(manager.factory().header(1, 0), 0);
    let started = Instant::now();
    assert!(manager.post_message(message.handle(), MaxWait::Forever).unwrap());

    assert!(started.elapsed() >= Duration::from_millis(25));
    assert_eq!(load(&record.admitted), 1);
    assert_eq!(manager.message_count().unwrap(), 1);
}

#[test]
fn test_zero_wait_under_held_gate_rejects() {
    let (manager, _) = manual_manager(60_000);
    manager.begin_messages();

    for _ in 0..3 {
        let (message, record) = Recording::new(manager.factory().header(1, 0), 0);
        assert!(!manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap());
        assert_eq!(load(&record.rejected), 1);
        assert_eq!(load(&record.admitted), 0);
    }

    assert_eq!(manager.message_count().unwrap(), 0);
    manager.end_process_messages().unwrap();
}

#[test]
fn test_bracket_leaves_gate_count_unchanged() {
    let (manager, _) = manual_manager(300);
    let (message, _) = Recording::new(manager.factory().header(3, 0), 0);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    let before = manager.gate_holders();
    run_bracket(&manager, 3, 3);

    assert_eq!(manager.gate_holders(), before);
}

#[test]
fn test_get_by_id_does_not_leak_gate() {
    let (manager, _) = manual_manager(60_000);
    let (message, _) = Recording::new(manager.factory().header(3, 0), 0);
    let handle = message.handle();
    manager.post_message(handle.clone(), MaxWait::Millis(0)).unwrap();

    for _ in 0..10 {
        let found = manager.get_by_id(handle.id(), MaxWait::Millis(0)).unwrap();
        assert_eq!(found, Some(handle.clone()));
    }

    // With a leaked holder this post would be rejected
    let (next, record) = Recording::new(manager.factory().header(3, 0), 0);
    assert!(manager.post_message(next.handle(), MaxWait::Millis(0)).unwrap());
    assert_eq!(load(&record.admitted), 1);
    assert_eq!(manager.gate_holders(), 0);
}

#[test]
fn test_process_outside_bracket_is_noop() {
    let (manager, _) = manual_manager(300);
    let (message, record) = Recording::new(manager.factory().header(0, 0), 0);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    assert!(!manager.process_messages(0, 9).unwrap());
    assert!(!manager.process_priority(0).unwrap());

    assert_eq!(load(&record.process_attempts), 0);
    assert_eq!(manager.message_count().unwrap(), 1);
}
