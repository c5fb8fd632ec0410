//! Internal messages generated by the event system itself

use crate::dispatch::EventManager;
use crate::message::header::MessageHeader;
use crate::message::traits::Message;

/// Internal-origin message that never expires
///
/// Post, discard and expiry notifications are ignored; processing runs
/// the supplied handler.
pub struct SystemMessage<F>
where
    F: FnMut(&EventManager) -> bool + Send,
{
    header: MessageHeader,
    system_id: u32,
    handler: F,
}

impl<F> SystemMessage<F>
where
    F: FnMut(&EventManager) -> bool + Send,
{
    /// `header` should come from
    /// [`MessageFactory::system_header`](crate::message::MessageFactory::system_header)
    pub fn new(header: MessageHeader, system_id: u32, handler: F) -> Self {
        let mut header = header;
        header.set_ttl_ms(0);
        Self {
            header,
            system_id,
            handler,
        }
    }

    pub fn system_id(&self) -> u32 {
        self.system_id
    }
}

impl<F> Message for SystemMessage<F>
where
    F: FnMut(&EventManager) -> bool + Send,
{
    fn header(&self) -> &MessageHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    fn on_post(&mut self, _sender: &EventManager, _admitted: bool) {}

    fn on_process(&mut self, sender: &EventManager) -> bool {
        (self.handler)(sender)
    }

    fn on_discard(&mut self, _sender: &EventManager, _timestamp_ms: u64) {}

    fn on_expired(&mut self, _sender: &EventManager, _timestamp_ms: u64) {}

    fn is_expired(&self, _now_ms: u64) -> bool {
        false
    }
}
