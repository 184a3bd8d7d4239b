//! Controllable time source for deterministic timeout tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use conforma_core::HarnessClock;

/// Manually advanced clock.
///
/// Clones share the same time source. By default a sleep advances the clock
/// to its wake target immediately, so a settle loop runs to its conclusion
/// without wall-clock waiting. With auto-advance off, sleeps park until
/// another task calls [`advance`](Self::advance) or [`set`](Self::set) past
/// their target, which lets a test hold a case exactly one tick short of
/// its deadline.
#[derive(Clone)]
pub struct VirtualClock {
    now_ms: Arc<watch::Sender<u64>>,
    auto_advance: Arc<Mutex<bool>>,
}

impl VirtualClock {
    /// Create a clock reading `initial_ms`, with auto-advancing sleeps.
    pub fn new(initial_ms: u64) -> Self {
        let (tx, _) = watch::channel(initial_ms);
        Self {
            now_ms: Arc::new(tx),
            auto_advance: Arc::new(Mutex::new(true)),
        }
    }

    /// Current reading in milliseconds.
    pub fn now(&self) -> u64 {
        *self.now_ms.borrow()
    }

    /// Move the clock forward by `ms`, waking parked sleeps whose targets
    /// have been reached.
    pub fn advance(&self, ms: u64) {
        self.now_ms.send_modify(|now| *now = now.saturating_add(ms));
    }

    /// Set an absolute reading. The clock never moves backward.
    pub fn set(&self, ms: u64) {
        self.now_ms.send_modify(|now| {
            if ms > *now {
                *now = ms;
            }
        });
    }

    /// Control whether sleeps advance the clock themselves.
    pub fn set_auto_advance(&self, enabled: bool) {
        *self.auto_advance.lock() = enabled;
    }
}

#[async_trait::async_trait]
impl HarnessClock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now()
    }

    async fn sleep_ms(&self, ms: u64) {
        let target = self.now().saturating_add(ms);
        if *self.auto_advance.lock() {
            self.set(target);
            return;
        }
        let mut rx = self.now_ms.subscribe();
        while *rx.borrow_and_update() < target {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn is_virtual(&self) -> bool {
        true
    }
}
