//! Conforma assertion harness
//!
//! Runtime for spec-conformance test files: registers named test cases,
//! records assertion results, orchestrates asynchronous completion with
//! timeouts, executes fixture expectation scripts against an engine
//! adapter's output, and renders registration-ordered reports.
//!
//! The harness never implements the behavior being verified. It checks what
//! an external engine produced against what a fixture says it should have
//! produced, and it does so without aborting on failure: one bad case never
//! takes down its siblings, and the report is always a complete account.
//!
//! # Usage
//!
//! ```rust,no_run
//! use conforma_core::HarnessConfig;
//! use conforma_harness::Harness;
//!
//! # async fn run() {
//! let harness = Harness::new(HarnessConfig::default());
//!
//! harness
//!     .test("arithmetic", |t| {
//!         t.assert_equals(&(2 + 2), &4, "2 + 2 is 4");
//!     })
//!     .expect("register");
//!
//! let pending = harness.async_test("completes later").expect("register");
//! pending.done();
//!
//! harness.settle().await;
//! println!("{}", harness.report().to_tap());
//! # }
//! ```

pub mod assert;
pub mod clock;
pub mod engine;
pub mod fixture;
pub mod harness;
pub mod report;

pub use clock::SystemClock;
pub use engine::EngineAdapter;
pub use fixture::{Bindings, Directive, Fixture, Literal, PathSegment, ValuePath};
pub use harness::{Diagnostic, DiagnosticKind, Harness, TestHandle, SINGLE_TEST_NAME};
pub use report::{CaseReport, Report};

// Re-export the core types drivers interact with.
pub use conforma_core::{
    AssertionResult, EventLog, EventRecord, EventSource, HarnessClock, HarnessConfig,
    HarnessError, TestStatus,
};
