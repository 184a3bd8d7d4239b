//! Run reports and their serializations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use conforma_core::{AssertionResult, HarnessError, TestStatus};

/// Terminal account of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case name, unique within the run.
    pub name: String,
    /// Status at report time.
    pub status: TestStatus,
    /// First failure message, panic message, or timeout message.
    pub message: Option<String>,
    /// Every recorded assertion, in invocation order.
    pub assertions: Vec<AssertionResult>,
}

/// Complete account of one harness run.
///
/// Cases appear in registration order regardless of the order in which they
/// completed; asynchronous completions never reorder the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// Wall-clock instant the harness was constructed.
    pub started_at: DateTime<Utc>,
    /// Elapsed harness-clock milliseconds at report time.
    pub duration_ms: u64,
    /// Per-case accounts in registration order.
    pub cases: Vec<CaseReport>,
}

impl Report {
    /// Whether every case passed.
    pub fn passed(&self) -> bool {
        self.cases.iter().all(|c| c.status == TestStatus::Pass)
    }

    /// Number of cases with the given status.
    pub fn count(&self, status: TestStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, HarnessError> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::serialization(e.to_string()))
    }

    /// Render the report as TAP version 13 text.
    pub fn to_tap(&self) -> String {
        let mut out = String::from("TAP version 13\n");
        out.push_str(&format!("1..{}\n", self.cases.len()));
        for (index, case) in self.cases.iter().enumerate() {
            let number = index + 1;
            match case.status {
                TestStatus::Pass => {
                    out.push_str(&format!("ok {number} - {}\n", case.name));
                }
                status => {
                    let detail = case
                        .message
                        .as_deref()
                        .map(|m| format!(": {m}"))
                        .unwrap_or_default();
                    out.push_str(&format!(
                        "not ok {number} - {} # {status}{detail}\n",
                        case.name
                    ));
                }
            }
        }
        out
    }
}
