//! End-to-end processing brackets

use crate::common::recording::{load, Recording};
use ses::core::clock::ManualClock;
use ses::dispatch::{DispatchStats, EventManager, ManagerSettings, MaxWait};
use ses::message::{MessageGroup, MessageHandle};
use std::sync::Arc;

fn manual_manager() -> (EventManager, ManualClock) {
    let clock = ManualClock::new(0);
    let manager = EventManager::with_clock(300, Arc::new(clock.clone()));
    (manager, clock)
}

#[test]
fn test_two_priorities_processed_together() {
    let (manager, _) = manual_manager();
    let (first, first_record) = Recording::new(manager.factory().header(1, 0), 0);
    let (second, second_record) = Recording::new(manager.factory().header(3, 0), 0);
    manager.post_message(first.handle(), MaxWait::Millis(0)).unwrap();
    manager.post_message(second.handle(), MaxWait::Millis(0)).unwrap();

    manager.begin_messages();
    manager.process_messages(1, 3).unwrap();
    manager.end_process_messages().unwrap();

    assert_eq!(load(&first_record.processed), 1);
    assert_eq!(load(&second_record.processed), 1);
    assert_eq!(manager.message_count().unwrap(), 0);
}

#[test]
fn test_max_discards_two_over_three_passes() {
    let (manager, clock) = manual_manager();
    let mut header = manager.factory().header(2, 0);
    header.set_max_discards(2);
    let (message, record) = Recording::new(header, usize::MAX);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    for _ in 0..3 {
        clock.advance(5);
        manager.begin_messages();
        manager.process_messages(0, 9).unwrap();
        manager.end_process_messages().unwrap();
    }

    assert_eq!(load(&record.discarded), 1);
    assert_eq!(load(&record.process_attempts), 2);
    assert_eq!(manager.message_count().unwrap(), 0);
    assert_eq!(manager.discarded_count().unwrap(), 1);
}

#[test]
fn test_round_trip_single_priority() {
    let (manager, _) = manual_manager();
    let mut inside = Vec::new();
    let mut outside = Vec::new();

    for priority in [0u8, 4, 4, 7, 4, 9] {
        let (message, record) = Recording::new(manager.factory().header(priority, 0), 0);
        let handle = message.handle();
        manager.post_message(handle.clone(), MaxWait::Millis(0)).unwrap();
        if priority == 4 {
            inside.push(record);
        } else {
            outside.push((handle, record));
        }
    }

    let holders_before = manager.gate_holders();
    manager.begin_messages();
    manager.process_priority(4).unwrap();
    manager.end_process_messages().unwrap();

    assert!(inside.iter().all(|record| load(&record.processed) == 1));
    assert!(outside
        .iter()
        .all(|(_, record)| load(&record.process_attempts) == 0));
    let remaining: Vec<MessageHandle> = outside.into_iter().map(|(handle, _)| handle).collect();
    assert_eq!(manager.snapshot().unwrap(), remaining);
    assert_eq!(manager.gate_holders(), holders_before);
}

#[test]
fn test_several_passes_in_one_bracket() {
    let (manager, _) = manual_manager();
    let (urgent, urgent_record) = Recording::new(manager.factory().header(0, 0), 0);
    let (retry, retry_record) = Recording::new(manager.factory().header(5, 0), 1);
    manager.post_message(urgent.handle(), MaxWait::Millis(0)).unwrap();
    manager.post_message(retry.handle(), MaxWait::Millis(0)).unwrap();

    manager.begin_messages();
    manager.process_priority(0).unwrap();
    manager.process_messages(0, 9).unwrap();
    manager.process_messages(0, 9).unwrap();
    manager.end_process_messages().unwrap();

    assert_eq!(load(&urgent_record.process_attempts), 1);
    assert_eq!(load(&retry_record.process_attempts), 2);
    assert_eq!(load(&retry_record.processed), 1);
    assert_eq!(manager.message_count().unwrap(), 0);
}

#[test]
fn test_expired_and_failed_mix() {
    let (manager, clock) = manual_manager();
    let (stale, stale_record) = Recording::new(manager.factory().header(1, 50), 0);
    let (fresh, fresh_record) = Recording::new(manager.factory().header(2, 0), 1);
    manager.post_message(stale.handle(), MaxWait::Millis(0)).unwrap();
    manager.post_message(fresh.handle(), MaxWait::Millis(0)).unwrap();

    clock.advance(100);
    manager.begin_messages();
    manager.process_messages(0, 9).unwrap();
    manager.end_process_messages().unwrap();

    assert_eq!(load(&stale_record.expired), 1);
    assert_eq!(load(&stale_record.process_attempts), 0);
    assert_eq!(load(&fresh_record.processed), 0);
    assert_eq!(manager.message_count().unwrap(), 1);

    manager.begin_messages();
    manager.process_messages(0, 9).unwrap();
    manager.end_process_messages().unwrap();

    assert_eq!(load(&stale_record.expired), 1);
    assert_eq!(load(&fresh_record.processed), 1);
    assert_eq!(manager.message_count().unwrap(), 0);
}

#[test]
fn test_group_is_one_store_entry() {
    let (manager, _) = manual_manager();
    let mut group = MessageGroup::new(manager.factory().group_header(3, 0), "scenario");
    let mut records = Vec::new();
    for _ in 0..3 {
        let (child, record) = Recording::new(manager.factory().header(3, 0), 0);
        group.add_sub_message(child.handle());
        records.push(record);
    }
    manager.post_message(group.into(), MaxWait::Millis(0)).unwrap();

    assert_eq!(manager.message_count().unwrap(), 1);

    manager.begin_messages();
    manager.process_priority(3).unwrap();
    manager.end_process_messages().unwrap();

    for record in &records {
        assert_eq!(load(&record.admitted), 1);
        assert_eq!(load(&record.processed), 1);
    }
    assert_eq!(manager.message_count().unwrap(), 0);
}

#[test]
fn test_clear_messages() {
    let (manager, _) = manual_manager();
    let mut header = manager.factory().header(0, 0);
    header.set_max_discards(1);
    let (doomed, _) = Recording::new(header, usize::MAX);
    let (waiting, _) = Recording::new(manager.factory().header(8, 0), 0);
    manager.post_message(doomed.handle(), MaxWait::Millis(0)).unwrap();
    manager.post_message(waiting.handle(), MaxWait::Millis(0)).unwrap();

    manager.begin_messages();
    manager.process_priority(0).unwrap();
    manager.end_process_messages().unwrap();

    assert_eq!(
        manager.stats().unwrap(),
        DispatchStats {
            live: 1,
            discarded: 1,
            gate_holders: 0
        }
    );
    assert!(manager.clear_messages().unwrap());
    assert_eq!(manager.stats().unwrap(), DispatchStats::default());
}

#[test]
fn test_settings_threshold_applies_to_new_messages() {
    let manager = EventManager::from_settings(&ManagerSettings {
        max_discards: 1,
        ..Default::default()
    });
    let (message, record) = Recording::new(manager.factory().header(0, 0), usize::MAX);
    manager.post_message(message.handle(), MaxWait::Millis(0)).unwrap();

    manager.begin_messages();
    manager.process_messages(0, 9).unwrap();
    manager.end_process_messages().unwrap();

    assert_eq!(load(&record.discarded), 1);
    assert_eq!(manager.message_count().unwrap(), 0);
}
