//! Demonstration workload for the binary
//!
//! Posts a batch of greetings across all priorities, a system message and
//! a group, then runs the configured number of processing brackets.

use crate::app::config::{AppConfig, DemoSettings};
use crate::dispatch::{DispatchResult, DispatchStats, EventManager, MaxWait};
use crate::message::{Message, MessageGroup, MessageHandle, MessageHeader, SystemMessage};

/// Greeting that fails a fixed number of times before it is handled
pub struct Greeting {
    header: MessageHeader,
    text: String,
    failures_left: u8,
}

impl Greeting {
    pub fn new(header: MessageHeader, text: impl Into<String>, failures: u8) -> Self {
        Self {
            header,
            text: text.into(),
            failures_left: failures,
        }
    }
}

impl Message for Greeting {
    fn header(&self) -> &MessageHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    fn on_post(&mut self, _sender: &EventManager, admitted: bool) {
        if !admitted {
            log::warn!("greeting {} was not admitted", self.header.id());
        }
    }

    fn on_process(&mut self, _sender: &EventManager) -> bool {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            log::debug!(
                "greeting {} not ready, {} failure(s) to go",
                self.header.id(),
                self.failures_left
            );
            return false;
        }
        println!("{} [{}]", self.text, self.header.id());
        true
    }

    fn on_discard(&mut self, _sender: &EventManager, timestamp_ms: u64) {
        println!(
            "gave up on greeting {} at {}ms: {}",
            self.header.id(),
            timestamp_ms,
            self.text
        );
    }

    fn on_expired(&mut self, _sender: &EventManager, timestamp_ms: u64) {
        println!(
            "greeting {} expired at {}ms: {}",
            self.header.id(),
            timestamp_ms,
            self.text
        );
    }
}

/// Outcome of a demo run
#[derive(Debug, Default)]
pub struct DemoReport {
    pub admitted: usize,
    pub rejected: usize,
    /// Manager counters after each bracket
    pub passes: Vec<DispatchStats>,
}

/// Messages the demo posts, in posting order
pub fn build_messages(manager: &EventManager, settings: &DemoSettings) -> Vec<MessageHandle> {
    let factory = manager.factory();
    let mut messages = Vec::with_capacity(settings.messages + 2);

    for i in 0..settings.messages {
        let priority = ((i * 3) % 10) as u8;
        let failures = (i % 2) as u8;
        // Every fourth greeting never succeeds and ends up discarded
        let failures = if i % 4 == 3 { u8::MAX } else { failures };
        let greeting = Greeting::new(
            factory.header(priority, crate::message::DEFAULT_TTL_MS),
            format!("Hello World #{}", i),
            failures,
        );
        messages.push(MessageHandle::new(greeting));
    }

    let status = SystemMessage::new(factory.system_header(0), 1, |sender: &EventManager| {
        match sender.stats() {
            Ok(stats) => {
                log::info!("system status: {}", stats);
                true
            }
            Err(e) => {
                log::warn!("system status unavailable: {}", e);
                false
            }
        }
    });
    messages.push(MessageHandle::new(status));

    let mut group = MessageGroup::new(factory.group_header(2, 0), "demo");
    for text in ["Hello from a group", "Hello again from a group"] {
        group.add_sub_message(Greeting::new(factory.header(2, 0), text, 0).into());
    }
    messages.push(group.into());

    messages
}

/// Post the demo messages and run the processing brackets
pub fn run_demo(manager: &EventManager, config: &AppConfig) -> DispatchResult<DemoReport> {
    let mut report = DemoReport::default();
    let post_wait: MaxWait = config.manager.post_wait_ms;

    for message in build_messages(manager, &config.demo) {
        if manager.post_message(message, post_wait)? {
            report.admitted += 1;
        } else {
            report.rejected += 1;
        }
    }
    log::info!(
        "posted {} message(s), {} rejected",
        report.admitted,
        report.rejected
    );

    let (from, to) = (config.demo.from_priority, config.demo.to_priority);
    for pass in 1..=config.demo.passes {
        manager.begin_messages();
        let processed = manager.process_messages(from, to);
        let ended = manager.end_process_messages();
        processed?;
        ended?;

        let stats = manager.stats()?;
        log::debug!("bracket {}: {}", pass, stats);
        report.passes.push(stats);
    }

    Ok(report)
}
