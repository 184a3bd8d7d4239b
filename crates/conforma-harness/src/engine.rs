//! Seam to the external implementation under test.

use conforma_core::HarnessError;

/// Adapter over the engine whose behavior a fixture verifies.
///
/// Conformance tests never implement the behavior being checked; they feed
/// the fixture payload to an external engine and inspect what it produced.
/// The adapter renders that observable output as a [`serde_json::Value`] so
/// the fixture's expectation script can navigate it by path.
pub trait EngineAdapter {
    /// Process a fixture payload and return the engine's observable result.
    fn process(&self, payload: &[u8]) -> Result<serde_json::Value, HarnessError>;
}

impl<F> EngineAdapter for F
where
    F: Fn(&[u8]) -> Result<serde_json::Value, HarnessError>,
{
    fn process(&self, payload: &[u8]) -> Result<serde_json::Value, HarnessError> {
        self(payload)
    }
}
