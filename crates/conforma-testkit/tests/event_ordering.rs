//! Event delivery order is the assertion surface for ordering-sensitive
//! tests: the log must reflect real callback invocation order, never a
//! reordering of it.
#![allow(missing_docs)]

use conforma_core::{EventLog, EventSource, HarnessConfig, TestStatus};
use conforma_harness::Harness;
use conforma_testkit::{init_test_logging, QueuedEventSource};

fn record_into(log: &EventLog, source: &QueuedEventSource, tag: &str) {
    let log = log.clone();
    source.on_event(
        tag,
        Box::new(move |tag| {
            log.append(tag);
        }),
    );
}

#[test]
fn delivery_order_passes_the_ordering_assertion() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let source = QueuedEventSource::new();
    let log = EventLog::new();

    record_into(&log, &source, "e1");
    record_into(&log, &source, "e2");

    let t = h.async_test("events in order").expect("register");
    // Independently queued, delivered in queue order.
    source.enqueue("e1");
    source.enqueue("e2");
    source.drain();

    t.assert_equals(
        &log.tags(),
        &vec!["e1".to_string(), "e2".to_string()],
        "events arrived as e1 then e2",
    );
    t.done();
    assert_eq!(t.status(), TestStatus::Pass);
}

#[test]
fn reversed_delivery_fails_the_ordering_assertion() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let source = QueuedEventSource::new();
    let log = EventLog::new();

    record_into(&log, &source, "e1");
    record_into(&log, &source, "e2");

    let t = h.async_test("events reversed").expect("register");
    source.enqueue("e2");
    source.enqueue("e1");
    source.drain();

    t.assert_equals(
        &log.tags(),
        &vec!["e1".to_string(), "e2".to_string()],
        "events arrived as e1 then e2",
    );
    t.done();
    assert_eq!(t.status(), TestStatus::Fail);
}

#[test]
fn callbacks_assert_directly_from_the_queue() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let source = QueuedEventSource::new();

    let t = h.async_test("callback-driven").expect("register");
    {
        let t = t.clone();
        source.on_event(
            "navigation-complete",
            Box::new(move |_| {
                t.assert_true(true, "navigation completed");
                t.done();
            }),
        );
    }
    {
        let t = t.clone();
        source.on_event(
            "navigation-error",
            Box::new(move |_| {
                t.assert_unreached("error callback fired");
                t.done();
            }),
        );
    }

    source.dispatch("navigation-complete");
    assert_eq!(t.status(), TestStatus::Pass);

    // The error path firing afterward is a late signal, not a new failure.
    source.dispatch("navigation-error");
    assert_eq!(t.status(), TestStatus::Pass);
    assert_eq!(h.diagnostics().len(), 2);
}

#[test]
fn error_callback_firing_first_fails_the_case() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let source = QueuedEventSource::new();

    let t = h.async_test("unexpected error event").expect("register");
    {
        let t = t.clone();
        source.on_event(
            "navigation-error",
            Box::new(move |_| {
                t.assert_unreached("error callback fired");
                t.done();
            }),
        );
    }

    source.dispatch("navigation-error");
    assert_eq!(t.status(), TestStatus::Fail);
}

#[test]
fn sequence_numbers_expose_relative_order() {
    init_test_logging();
    let source = QueuedEventSource::new();
    let log = EventLog::new();
    record_into(&log, &source, "load");
    record_into(&log, &source, "report");

    source.enqueue("load");
    source.enqueue("report");
    source.drain();

    let records = log.records();
    assert!(records[0].seq < records[1].seq);
    assert_eq!(records[0].tag, "load");
    assert_eq!(records[1].tag, "report");
}
