//! Test case records and assertion results.

use serde::{Deserialize, Serialize};

use crate::status::TestStatus;

/// How a test case signals completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// The test body runs to completion immediately; returning without a
    /// failure finalizes the case.
    Sync,
    /// The case stays pending until an explicit completion signal or the
    /// configured timeout.
    Async,
}

/// Outcome of a single assertion invocation.
///
/// Created once per call and never mutated afterward. `actual` and
/// `expected` carry printable renderings of the compared values; they are
/// absent for assertions with nothing useful to print (e.g. an
/// unreached-code marker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionResult {
    /// Caller-supplied description of what was being checked.
    pub description: String,
    /// Whether the check held.
    pub passed: bool,
    /// Printable rendering of the observed value, if any.
    pub actual: Option<String>,
    /// Printable rendering of the expected value, if any.
    pub expected: Option<String>,
}

impl AssertionResult {
    /// Record a passing check.
    pub fn pass(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            passed: true,
            actual: None,
            expected: None,
        }
    }

    /// Record a failing check with the compared values' renderings.
    pub fn fail(
        description: impl Into<String>,
        actual: Option<String>,
        expected: Option<String>,
    ) -> Self {
        Self {
            description: description.into(),
            passed: false,
            actual,
            expected,
        }
    }

    /// Human-readable failure message for this result.
    ///
    /// Returns `None` for passing results.
    pub fn failure_message(&self) -> Option<String> {
        if self.passed {
            return None;
        }
        match (&self.actual, &self.expected) {
            (Some(actual), Some(expected)) => Some(format!(
                "{}: expected {expected}, got {actual}",
                self.description
            )),
            _ => Some(self.description.clone()),
        }
    }
}

/// One named unit of verification with a terminal status.
///
/// Created at registration, mutated by assertion recording and by the
/// completion signal, and frozen once the status leaves
/// [`TestStatus::Pending`]. The mutating methods reject calls against a
/// finalized case so the runtime can turn them into diagnostics instead of
/// silently corrupting a settled result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique name of the case within its harness.
    pub name: String,
    /// Current lifecycle status.
    pub status: TestStatus,
    /// Completion discipline for this case.
    pub completion: CompletionMode,
    /// Recorded assertions, in invocation order.
    pub assertions: Vec<AssertionResult>,
    /// First failure message, or the panic/timeout message.
    pub message: Option<String>,
    /// Clock reading at registration, in milliseconds.
    pub registered_at_ms: u64,
    /// Absolute deadline for async cases; `None` for sync cases.
    pub deadline_ms: Option<u64>,
}

impl TestCase {
    /// Create a synchronous case.
    pub fn new_sync(name: impl Into<String>, now_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Pending,
            completion: CompletionMode::Sync,
            assertions: Vec::new(),
            message: None,
            registered_at_ms: now_ms,
            deadline_ms: None,
        }
    }

    /// Create an asynchronous case with its timeout deadline.
    pub fn new_async(name: impl Into<String>, now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Pending,
            completion: CompletionMode::Async,
            assertions: Vec::new(),
            message: None,
            registered_at_ms: now_ms,
            deadline_ms: Some(now_ms.saturating_add(timeout_ms)),
        }
    }

    /// Whether the case has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether any recorded assertion failed.
    pub fn has_failure(&self) -> bool {
        self.assertions.iter().any(|a| !a.passed)
    }

    /// Append an assertion result.
    ///
    /// Returns `false` without recording anything when the case is already
    /// terminal. The first failing result also sets the case message.
    pub fn record(&mut self, result: AssertionResult) -> bool {
        if self.is_terminal() {
            return false;
        }
        if self.message.is_none() {
            if let Some(message) = result.failure_message() {
                self.message = Some(message);
            }
        }
        self.assertions.push(result);
        true
    }

    /// Transition the case to a terminal status.
    ///
    /// Returns `false` when the case is already terminal; the settled status
    /// and message are left untouched in that event.
    pub fn finalize(&mut self, status: TestStatus, message: Option<String>) -> bool {
        debug_assert!(status.is_terminal());
        if self.is_terminal() {
            return false;
        }
        tracing::debug!(case = %self.name, status = %status, "finalizing test case");
        self.status = status;
        if let Some(message) = message {
            self.message.get_or_insert(message);
        }
        true
    }
}
