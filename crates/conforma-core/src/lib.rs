//! Conforma core data model
//!
//! This crate holds the types shared by the harness runtime and the testkit:
//! test case records, assertion results, harness configuration, the event
//! log, the equality contract behind `assert_equals`, and the clock seam the
//! runtime uses for timeout bookkeeping.
//!
//! Nothing here executes tests. The runtime lives in `conforma-harness`;
//! deterministic test doubles (virtual clock, queued event source) live in
//! `conforma-testkit`.

pub mod case;
pub mod clock;
pub mod compare;
pub mod config;
pub mod errors;
pub mod events;
pub mod status;

pub use case::{AssertionResult, CompletionMode, TestCase};
pub use clock::HarnessClock;
pub use compare::SameValue;
pub use config::{HarnessConfig, DEFAULT_TIMEOUT_MS};
pub use errors::HarnessError;
pub use events::{EventCallback, EventLog, EventRecord, EventSource};
pub use status::TestStatus;
