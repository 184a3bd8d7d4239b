//! Test case lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`TestCase`](crate::case::TestCase).
///
/// `Timeout` is deliberately distinct from `Fail` so a report can tell
/// "never completed" apart from "completed and failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Registered, still awaiting completion.
    Pending,
    /// Finalized with every recorded assertion passing.
    Pass,
    /// Finalized with at least one failed assertion or a caught panic.
    Fail,
    /// Never signaled completion within the configured timeout.
    Timeout,
}

impl TestStatus {
    /// Whether this status is terminal. A case whose status left `Pending`
    /// never changes again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Pending)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TestStatus::Pending => "pending",
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Timeout => "timeout",
        };
        f.write_str(label)
    }
}
