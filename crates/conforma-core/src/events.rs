//! Event log and the injected event-source seam.
//!
//! Ordering-sensitive tests assert on the relative delivery order of host
//! events. The harness never reorders or buffers: [`EventLog::append`] runs
//! inside the callback that observed the event, so log order is delivery
//! order by construction.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One observed event: its tag plus its position in the delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Caller-chosen label for the event.
    pub tag: String,
    /// Zero-based sequence number assigned at append time.
    pub seq: u64,
}

/// Shared append-only log of delivered events.
///
/// Clones share the same underlying log, so a test can hand one clone to
/// each registered callback and later assert on the combined order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn append(&self, tag: impl Into<String>) -> u64 {
        let tag = tag.into();
        let mut records = self.records.lock();
        let seq = records.len() as u64;
        tracing::debug!(tag = %tag, seq, "event observed");
        records.push(EventRecord { tag, seq });
        seq
    }

    /// Tags in delivery order.
    pub fn tags(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.tag.clone()).collect()
    }

    /// Full records in delivery order.
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// Callback invoked when a subscribed event is delivered. The argument is
/// the event's tag.
pub type EventCallback = Box<dyn FnMut(&str) + Send>;

/// Injected event-delivery seam.
///
/// Production hosts satisfy this with their real event queue; the testkit
/// provides a queued implementation with deterministic ordering so the
/// harness's ordering guarantees can be exercised without a host.
pub trait EventSource {
    /// Register a callback for `tag`. Callbacks registered for the same tag
    /// run in registration order when the event is delivered.
    fn on_event(&self, tag: &str, callback: EventCallback);
}
