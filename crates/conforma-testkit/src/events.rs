//! Queued event source modeling a cooperative host queue.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use conforma_core::{EventCallback, EventSource};

#[derive(Default)]
struct QueueInner {
    handlers: HashMap<String, Vec<EventCallback>>,
    queue: VecDeque<String>,
}

/// Deterministic [`EventSource`] for ordering tests.
///
/// Delivery semantics mirror a cooperative single-threaded host: callbacks
/// for one tag run in registration order, queued events drain in FIFO order
/// across tags, and callbacks run outside the registry lock so they may
/// re-enter the source (registering or enqueueing more events).
#[derive(Default)]
pub struct QueuedEventSource {
    inner: Mutex<QueueInner>,
}

impl QueuedEventSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `tag` now, invoking its callbacks in registration order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, tag: &str) -> usize {
        let mut callbacks = {
            let mut inner = self.inner.lock();
            inner.handlers.remove(tag).unwrap_or_default()
        };
        for callback in callbacks.iter_mut() {
            callback(tag);
        }
        let count = callbacks.len();
        tracing::trace!(tag, count, "event delivered");
        // Reinstall, keeping callbacks registered during dispatch after the
        // original ones.
        let mut inner = self.inner.lock();
        let slot = inner.handlers.entry(tag.to_string()).or_default();
        let registered_during_dispatch = std::mem::take(slot);
        *slot = callbacks;
        slot.extend(registered_during_dispatch);
        count
    }

    /// Queue `tag` for a later [`drain`](Self::drain).
    pub fn enqueue(&self, tag: &str) {
        self.inner.lock().queue.push_back(tag.to_string());
    }

    /// Deliver every queued event in FIFO order, including events enqueued
    /// by the callbacks themselves. Returns the number of events delivered.
    pub fn drain(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.inner.lock().queue.pop_front();
            let Some(tag) = next else {
                return delivered;
            };
            self.dispatch(&tag);
            delivered += 1;
        }
    }
}

impl EventSource for QueuedEventSource {
    fn on_event(&self, tag: &str, callback: EventCallback) {
        self.inner
            .lock()
            .handlers
            .entry(tag.to_string())
            .or_default()
            .push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conforma_core::EventLog;

    #[test]
    fn same_tag_callbacks_run_in_registration_order() {
        let source = QueuedEventSource::new();
        let log = EventLog::new();

        let first = log.clone();
        source.on_event("tick", Box::new(move |_| {
            first.append("first");
        }));
        let second = log.clone();
        source.on_event("tick", Box::new(move |_| {
            second.append("second");
        }));

        assert_eq!(source.dispatch("tick"), 2);
        assert_eq!(log.tags(), ["first", "second"]);
    }

    #[test]
    fn drain_delivers_fifo_across_tags() {
        let source = QueuedEventSource::new();
        let log = EventLog::new();

        for tag in ["e1", "e2"] {
            let log = log.clone();
            source.on_event(tag, Box::new(move |tag| {
                log.append(tag);
            }));
        }

        source.enqueue("e1");
        source.enqueue("e2");
        assert_eq!(source.drain(), 2);
        assert_eq!(log.tags(), ["e1", "e2"]);
    }

    #[test]
    fn dispatch_without_handlers_is_a_no_op() {
        let source = QueuedEventSource::new();
        assert_eq!(source.dispatch("nobody"), 0);
    }

    #[test]
    fn callbacks_may_enqueue_more_events() {
        let source = std::sync::Arc::new(QueuedEventSource::new());
        let log = EventLog::new();

        {
            let log = log.clone();
            let chain = std::sync::Arc::clone(&source);
            source.on_event("first", Box::new(move |_| {
                log.append("first");
                chain.enqueue("chained");
            }));
        }
        {
            let log = log.clone();
            source.on_event("chained", Box::new(move |_| {
                log.append("chained");
            }));
        }

        source.enqueue("first");
        assert_eq!(source.drain(), 2);
        assert_eq!(log.tags(), ["first", "chained"]);
    }
}
