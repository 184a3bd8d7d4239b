//! Harness runtime: registration, completion, timeouts, diagnostics.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use uuid::Uuid;

use conforma_core::{
    AssertionResult, HarnessClock, HarnessConfig, HarnessError, TestCase, TestStatus,
};

use crate::clock::SystemClock;
use crate::report::{CaseReport, Report};

/// Name given to the implicit case in single-test mode.
pub const SINGLE_TEST_NAME: &str = "untitled";

/// Kind of harness API call that arrived after its case finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An assertion fired against an already-finalized case.
    LateAssertion,
    /// `done()` arrived after the case had timed out.
    LateDone,
    /// `done()` arrived a second time after a normal completion.
    DuplicateDone,
}

/// Record of a late or duplicate signal. Logged and retrievable, never a
/// status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the case the signal referenced.
    pub case: String,
    /// What kind of stray signal this was.
    pub kind: DiagnosticKind,
    /// Free-form detail (usually the assertion description).
    pub detail: String,
}

struct HarnessInner {
    config: HarnessConfig,
    cases: IndexMap<String, TestCase>,
    diagnostics: Vec<Diagnostic>,
    started: bool,
}

impl HarnessInner {
    fn diagnose(&mut self, case: &str, kind: DiagnosticKind, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::warn!(case, ?kind, detail = %detail, "late signal ignored");
        self.diagnostics.push(Diagnostic {
            case: case.to_string(),
            kind,
            detail,
        });
    }
}

/// The assertion harness for one test-file run.
///
/// Registers named test cases, records their assertions, finalizes them by
/// completion signal or timeout, and produces a registration-ordered report.
/// Cooperative single-threaded hosts share it through cloneable
/// [`TestHandle`]s; all mutation happens under one lock, so callbacks may
/// arrive in any interleaving without corrupting the registry.
pub struct Harness {
    inner: Arc<Mutex<HarnessInner>>,
    clock: Arc<dyn HarnessClock>,
    notify: Arc<Notify>,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    epoch_ms: u64,
}

impl Harness {
    /// Create a harness on the wall clock.
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create a harness on an injected clock (virtual clocks in tests).
    pub fn with_clock(config: HarnessConfig, clock: Arc<dyn HarnessClock>) -> Self {
        let epoch_ms = clock.now_ms();
        Self {
            inner: Arc::new(Mutex::new(HarnessInner {
                config,
                cases: IndexMap::new(),
                diagnostics: Vec::new(),
                started: false,
            })),
            clock,
            notify: Arc::new(Notify::new()),
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            epoch_ms,
        }
    }

    /// Replace the configuration.
    ///
    /// Rejected once any test has started; the configuration is read-only
    /// for the remainder of the run after that point.
    pub fn configure(&self, config: HarnessConfig) -> Result<(), HarnessError> {
        let mut inner = self.inner.lock();
        if inner.started {
            return Err(HarnessError::config(
                "configuration cannot change after a test has started",
            ));
        }
        inner.config = config;
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> HarnessConfig {
        self.inner.lock().config.clone()
    }

    fn register(&self, case: TestCase) -> Result<TestHandle, HarnessError> {
        let name = case.name.clone();
        let mut inner = self.inner.lock();
        if inner.config.single_test && name != SINGLE_TEST_NAME {
            return Err(HarnessError::registration(format!(
                "explicit registration of '{name}' is not allowed in single-test mode"
            )));
        }
        if inner.cases.contains_key(&name) {
            return Err(HarnessError::registration(format!(
                "test '{name}' is already registered"
            )));
        }
        tracing::debug!(case = %name, completion = ?case.completion, "registering test case");
        inner.started = true;
        inner.cases.insert(name.clone(), case);
        Ok(TestHandle {
            name,
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
        })
    }

    /// Register and immediately run a synchronous test case.
    ///
    /// A panic inside `body` is caught at the harness boundary and converts
    /// to `Fail` with the panic payload in the message; sibling cases are
    /// unaffected. Otherwise the case finalizes `Pass` when no recorded
    /// assertion failed and `Fail` when one did.
    pub fn test<F>(&self, name: &str, body: F) -> Result<TestStatus, HarnessError>
    where
        F: FnOnce(&TestHandle),
    {
        let handle = self.register(TestCase::new_sync(name, self.clock.now_ms()))?;
        let outcome = catch_unwind(AssertUnwindSafe(|| body(&handle)));
        let mut inner = self.inner.lock();
        let case = inner
            .cases
            .get_mut(name)
            .ok_or_else(|| HarnessError::registration(format!("test '{name}' vanished")))?;
        let status = match outcome {
            Ok(()) => {
                if case.has_failure() {
                    TestStatus::Fail
                } else {
                    TestStatus::Pass
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                case.message
                    .get_or_insert(format!("uncaught panic: {message}"));
                TestStatus::Fail
            }
        };
        case.finalize(status, None);
        Ok(status)
    }

    /// Register an asynchronous test case.
    ///
    /// The case stays pending until [`TestHandle::done`] is called or
    /// `timeout_ms` elapses on the harness clock, whichever comes first.
    pub fn async_test(&self, name: &str) -> Result<TestHandle, HarnessError> {
        let timeout_ms = self.inner.lock().config.timeout_ms;
        self.register(TestCase::new_async(name, self.clock.now_ms(), timeout_ms))
    }

    /// Handle to the implicit case in single-test mode, activating it on
    /// first use.
    ///
    /// Errors when the harness is not configured for single-test mode.
    pub fn implicit(&self) -> Result<TestHandle, HarnessError> {
        {
            let inner = self.inner.lock();
            if !inner.config.single_test {
                return Err(HarnessError::registration(
                    "implicit test requires single-test mode",
                ));
            }
            if inner.cases.contains_key(SINGLE_TEST_NAME) {
                return Ok(TestHandle {
                    name: SINGLE_TEST_NAME.to_string(),
                    inner: Arc::clone(&self.inner),
                    notify: Arc::clone(&self.notify),
                });
            }
        }
        let timeout_ms = self.inner.lock().config.timeout_ms;
        self.register(TestCase::new_async(
            SINGLE_TEST_NAME,
            self.clock.now_ms(),
            timeout_ms,
        ))
    }

    /// Finalize every pending case whose deadline has passed as `Timeout`.
    ///
    /// Returns the number of cases finalized. A case is never expired
    /// before its deadline.
    pub fn expire_overdue(&self) -> usize {
        let now = self.clock.now_ms();
        let mut expired = 0;
        {
            let mut inner = self.inner.lock();
            let timeout_ms = inner.config.timeout_ms;
            for case in inner.cases.values_mut() {
                if case.is_terminal() {
                    continue;
                }
                if let Some(deadline) = case.deadline_ms {
                    if now >= deadline {
                        case.finalize(
                            TestStatus::Timeout,
                            Some(format!("test timed out after {timeout_ms}ms")),
                        );
                        expired += 1;
                    }
                }
            }
        }
        if expired > 0 {
            self.notify.notify_waiters();
        }
        expired
    }

    /// Whether every registered case has reached a terminal status.
    pub fn all_terminal(&self) -> bool {
        self.inner.lock().cases.values().all(|c| c.is_terminal())
    }

    /// Drive the run until every case is terminal.
    ///
    /// Waits on completion signals and on the earliest pending deadline;
    /// overdue cases are finalized as `Timeout` as their deadlines pass.
    /// The deadline sleep bounds any missed completion wakeup, so the loop
    /// always makes progress.
    pub async fn settle(&self) {
        loop {
            let next_deadline = {
                let inner = self.inner.lock();
                let pending: Vec<&TestCase> =
                    inner.cases.values().filter(|c| !c.is_terminal()).collect();
                if pending.is_empty() {
                    return;
                }
                pending.iter().filter_map(|c| c.deadline_ms).min()
            };
            let Some(deadline) = next_deadline else {
                // Sync cases finalize at registration and async cases always
                // carry a deadline; nothing to wait for but a signal.
                self.notify.notified().await;
                continue;
            };
            let now = self.clock.now_ms();
            if deadline <= now {
                self.expire_overdue();
                continue;
            }
            let notified = self.notify.notified();
            tokio::select! {
                _ = notified => {}
                _ = self.clock.sleep_ms(deadline - now) => {
                    self.expire_overdue();
                }
            }
        }
    }

    /// Late and duplicate signals observed so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.lock().diagnostics.clone()
    }

    /// Current status of a registered case, if it exists.
    pub fn status_of(&self, name: &str) -> Option<TestStatus> {
        self.inner.lock().cases.get(name).map(|c| c.status)
    }

    /// Complete, registration-ordered account of every registered case.
    ///
    /// Always returns every case regardless of how many failed or timed
    /// out; cases still pending at report time appear as `Pending`.
    pub fn report(&self) -> Report {
        let inner = self.inner.lock();
        let cases = inner
            .cases
            .values()
            .map(|case| CaseReport {
                name: case.name.clone(),
                status: case.status,
                message: case.message.clone(),
                assertions: case.assertions.clone(),
            })
            .collect();
        Report {
            run_id: self.run_id,
            started_at: self.started_at,
            duration_ms: self.clock.now_ms().saturating_sub(self.epoch_ms),
            cases,
        }
    }
}

/// Cloneable handle to one registered test case.
///
/// Host callbacks keep a clone and call assertions or [`done`](Self::done)
/// from whatever interleaving the event queue produces; once the case is
/// terminal every further call degrades to a logged diagnostic.
#[derive(Clone)]
pub struct TestHandle {
    pub(crate) name: String,
    pub(crate) inner: Arc<Mutex<HarnessInner>>,
    pub(crate) notify: Arc<Notify>,
}

impl std::fmt::Debug for TestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TestHandle {
    /// Name of the case this handle refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status of the case.
    pub fn status(&self) -> TestStatus {
        self.inner
            .lock()
            .cases
            .get(&self.name)
            .map(|c| c.status)
            .unwrap_or(TestStatus::Pending)
    }

    /// Record an assertion result against this case, or a late-assertion
    /// diagnostic when the case has already finalized.
    pub(crate) fn record(&self, result: AssertionResult) -> bool {
        let passed = result.passed;
        let mut inner = self.inner.lock();
        let Some(case) = inner.cases.get_mut(&self.name) else {
            return passed;
        };
        if !case.record(result.clone()) {
            let name = self.name.clone();
            inner.diagnose(&name, DiagnosticKind::LateAssertion, result.description);
        }
        passed
    }

    /// Signal that this asynchronous case has finished.
    ///
    /// Transitions `Pending → Pass` when no recorded assertion failed and
    /// `Pending → Fail` otherwise. Calling it again is a diagnostic no-op:
    /// the settled status never changes.
    pub fn done(&self) {
        let mut inner = self.inner.lock();
        let Some(case) = inner.cases.get_mut(&self.name) else {
            return;
        };
        match case.status {
            TestStatus::Pending => {
                let status = if case.has_failure() {
                    TestStatus::Fail
                } else {
                    TestStatus::Pass
                };
                case.finalize(status, None);
                drop(inner);
                self.notify.notify_waiters();
            }
            TestStatus::Timeout => {
                let name = self.name.clone();
                inner.diagnose(&name, DiagnosticKind::LateDone, "done() after timeout");
            }
            TestStatus::Pass | TestStatus::Fail => {
                let name = self.name.clone();
                inner.diagnose(&name, DiagnosticKind::DuplicateDone, "done() after completion");
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "test panicked".to_string()
    }
}
