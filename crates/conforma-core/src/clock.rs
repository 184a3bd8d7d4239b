//! Clock seam for timeout bookkeeping.

/// Time source behind deadline computation and the settle loop.
///
/// The runtime only ever reads milliseconds and sleeps; it does not care
/// whether those milliseconds are wall time (`SystemClock` in the harness
/// crate) or manually advanced (`VirtualClock` in the testkit).
#[async_trait::async_trait]
pub trait HarnessClock: Send + Sync {
    /// Milliseconds since this clock's epoch.
    fn now_ms(&self) -> u64;

    /// Suspend the caller for `ms` milliseconds of clock time.
    async fn sleep_ms(&self, ms: u64);

    /// Whether this clock is simulated rather than wall time.
    fn is_virtual(&self) -> bool {
        false
    }
}
