//! Lifecycle semantics: registration, completion, isolation, diagnostics.
#![allow(missing_docs)]

use conforma_core::{HarnessConfig, HarnessError, TestStatus};
use conforma_harness::{DiagnosticKind, Harness, SINGLE_TEST_NAME};
use conforma_testkit::init_test_logging;

#[test]
fn report_covers_every_registration_in_order() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());

    let a = h.async_test("a-async").expect("register a");
    h.test("b-sync", |t| {
        t.assert_true(true, "b passes");
    })
    .expect("register b");
    let c = h.async_test("c-async").expect("register c");

    // Completion order is the reverse of registration order.
    c.done();
    a.done();

    let report = h.report();
    let names: Vec<&str> = report.cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a-async", "b-sync", "c-async"]);
    assert_eq!(report.cases.len(), 3);
    assert!(report.passed());
}

#[test]
fn failing_assertion_wins_over_later_done() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let t = h.async_test("fails-then-completes").expect("register");
    t.assert_equals(&(2 + 2), &5, "arithmetic");
    t.assert_true(true, "recorded after the failure");
    t.done();
    assert_eq!(t.status(), TestStatus::Fail);

    let report = h.report();
    assert_eq!(report.cases[0].assertions.len(), 2);
    assert_eq!(
        report.cases[0].message.as_deref(),
        Some("arithmetic: expected 5, got 4")
    );
}

#[test]
fn panicking_case_does_not_abort_siblings() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());

    let status = h
        .test("panics", |t| {
            t.assert_true(true, "recorded before the panic");
            panic!("fixture data unavailable");
        })
        .expect("register");
    assert_eq!(status, TestStatus::Fail);

    let status = h
        .test("healthy sibling", |t| {
            t.assert_equals(&1, &1, "unaffected");
        })
        .expect("register");
    assert_eq!(status, TestStatus::Pass);

    let report = h.report();
    assert_eq!(report.cases[0].status, TestStatus::Fail);
    assert_eq!(
        report.cases[0].message.as_deref(),
        Some("uncaught panic: fixture data unavailable")
    );
    assert_eq!(report.cases[1].status, TestStatus::Pass);
}

#[test]
fn done_is_idempotent_and_the_second_call_is_diagnosed() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let t = h.async_test("once").expect("register");
    t.done();
    let settled = t.status();
    t.done();
    assert_eq!(t.status(), settled);

    let diagnostics = h.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::DuplicateDone);
    assert_eq!(diagnostics[0].case, "once");
}

#[test]
fn late_assertions_are_logged_not_recorded() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let t = h.async_test("finalized").expect("register");
    t.assert_true(true, "counts");
    t.done();

    t.assert_equals(&1, &2, "stray event callback");
    assert_eq!(t.status(), TestStatus::Pass);

    let report = h.report();
    assert_eq!(report.cases[0].assertions.len(), 1);
    let diagnostics = h.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::LateAssertion);
    assert_eq!(diagnostics[0].detail, "stray event callback");
}

#[test]
fn configure_applies_only_before_the_first_test() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    h.configure(HarnessConfig::default().timeout_ms(50))
        .expect("configure before start");
    assert_eq!(h.config().timeout_ms, 50);

    h.test("starts the run", |_| {}).expect("register");
    let err = h
        .configure(HarnessConfig::default().timeout_ms(10))
        .unwrap_err();
    assert!(matches!(err, HarnessError::Config { .. }));
    assert_eq!(h.config().timeout_ms, 50);
}

#[test]
fn single_test_mode_has_exactly_one_implicit_case() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default().single_test(true));

    let err = h.async_test("explicit").unwrap_err();
    assert!(matches!(err, HarnessError::Registration { .. }));

    let t = h.implicit().expect("implicit");
    t.assert_true(true, "top-level assertion");
    // A second implicit() call addresses the same case.
    let again = h.implicit().expect("implicit again");
    again.done();

    let report = h.report();
    assert_eq!(report.cases.len(), 1);
    assert_eq!(report.cases[0].name, SINGLE_TEST_NAME);
    assert_eq!(report.cases[0].status, TestStatus::Pass);
    assert_eq!(report.cases[0].assertions.len(), 1);
}

#[test]
fn report_includes_pending_cases_as_pending() {
    init_test_logging();
    let h = Harness::new(HarnessConfig::default());
    let _stuck = h.async_test("never completes").expect("register");
    h.test("done already", |_| {}).expect("register");

    let report = h.report();
    assert_eq!(report.cases.len(), 2);
    assert_eq!(report.cases[0].status, TestStatus::Pending);
    assert_eq!(report.cases[1].status, TestStatus::Pass);
}
