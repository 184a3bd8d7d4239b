//! Conforma testing infrastructure
//!
//! Deterministic test doubles for the harness: a manually advanced clock, a
//! queued event source modeling a cooperative host queue, fixture text
//! builders, and logging setup. The workspace's integration suites live in
//! this crate's `tests/` directory.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod clock;
pub mod events;
pub mod fixtures;
pub mod logging;

pub use clock::VirtualClock;
pub use events::QueuedEventSource;
pub use fixtures::{
    two_cue_caption_fixture, two_cue_engine_value, FailingEngine, FixtureBuilder, StaticEngine,
};
pub use logging::init_test_logging;

use std::sync::Arc;

use conforma_core::HarnessConfig;
use conforma_harness::Harness;

/// Harness on a fresh virtual clock starting at zero.
///
/// The returned clock is a handle onto the same time source the harness
/// reads, so tests advance it directly.
pub fn harness_on_virtual_clock(config: HarnessConfig) -> (Harness, VirtualClock) {
    let clock = VirtualClock::new(0);
    let harness = Harness::with_clock(config, Arc::new(clock.clone()));
    (harness, clock)
}
