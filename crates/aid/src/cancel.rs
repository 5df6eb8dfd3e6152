//! Cooperative cancellation for long probe runs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::debug;

/// Cloneable cancellation flag
///
/// Probing checks the flag between candidate AIDs only. A probe that is
/// already talking to the card always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel the token once `budget` has elapsed
    ///
    /// The watchdog thread is detached; it only flips the flag.
    pub fn cancel_after(&self, budget: Duration) {
        let token = self.clone();
        thread::spawn(move || {
            thread::sleep(budget);
            debug!(?budget, "Probe budget spent, cancelling");
            token.cancel();
        });
    }
}
