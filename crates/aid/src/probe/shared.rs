//! Mutex-owned gateway for callers that share one card

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, bounded};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ProbeOutcome, ProbeResult, probe_one, run_probes};
use crate::cancel::CancellationToken;
use crate::catalog::Catalog;
use crate::entry::AidEntry;
use crate::gateway::{AidOverride, CardGateway};

/// Upper bound on a single probe when the gateway's own timeout misbehaves
pub const DEFAULT_PROBE_DEADLINE: Duration = Duration::from_secs(30);

/// Gateway owned behind a mutex
///
/// Every AID override happens while the lock is held, so other holders of
/// the handle never observe a probe's temporary AID. Probes through this
/// handle are additionally bounded by a deadline: the probe runs on a worker
/// thread and a probe that overruns is reported as rejected. The worker
/// keeps the lock until the gateway returns, so probes still never overlap
/// on the card. A worker whose caller gave up before it got the lock does
/// not touch the card at all.
pub struct SharedGateway<G> {
    inner: Arc<Mutex<G>>,
    deadline: Duration,
}

impl<G> Clone for SharedGateway<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            deadline: self.deadline,
        }
    }
}

impl<G> fmt::Debug for SharedGateway<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedGateway")
            .field("deadline", &self.deadline)
            .field("locked", &self.inner.is_locked())
            .finish()
    }
}

impl<G: CardGateway> SharedGateway<G> {
    /// Take ownership of `gateway`
    pub fn new(gateway: G) -> Self {
        Self {
            inner: Arc::new(Mutex::new(gateway)),
            deadline: DEFAULT_PROBE_DEADLINE,
        }
    }

    /// Set the per-probe deadline
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Per-probe deadline
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// AID currently configured on the gateway
    pub fn current_aid(&self) -> String {
        self.inner.lock().aid().to_string()
    }

    /// Apply `aid` to the gateway for all later operations
    pub fn set_aid(&self, aid: &str) {
        self.inner.lock().set_aid(aid);
    }

    /// Run `f` with the gateway switched to `aid`, as one critical section
    pub fn with_aid<R>(&self, aid: &str, f: impl FnOnce(&mut G) -> R) -> R {
        let mut gateway = self.inner.lock();
        let mut scoped = AidOverride::new(&mut *gateway, aid);
        f(&mut *scoped)
    }

    /// Read chip information with the configured AID
    pub fn read_chip_info(&self) -> Result<Value, G::Error> {
        self.inner.lock().read_chip_info()
    }

    /// List profiles with the configured AID
    pub fn list_profiles(&self) -> Result<Value, G::Error> {
        self.inner.lock().list_profiles()
    }
}

impl<G: CardGateway + Send + 'static> SharedGateway<G> {
    /// Probe one AID, giving up after the deadline
    pub fn probe_one(&self, aid: &str) -> ProbeOutcome {
        let (tx, rx) = bounded(1);
        let inner = Arc::clone(&self.inner);
        let candidate = aid.to_string();
        let abandoned = Arc::new(AtomicBool::new(false));
        let worker_abandoned = Arc::clone(&abandoned);

        let spawned = thread::Builder::new()
            .name("aid-probe".into())
            .spawn(move || {
                let mut gateway = inner.lock();
                if worker_abandoned.load(Ordering::SeqCst) {
                    debug!(aid = %candidate, "Caller gave up before the gateway was free, skipping");
                    return;
                }
                let outcome = probe_one(&mut *gateway, &candidate);
                // Receiver may have given up already
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            warn!(%aid, error = %e, "Could not start probe worker");
            return ProbeOutcome::rejected();
        }

        match rx.recv_timeout(self.deadline) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                abandoned.store(true, Ordering::SeqCst);
                warn!(%aid, deadline = ?self.deadline, "Probe overran its deadline, treating AID as rejected");
                ProbeOutcome::rejected()
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(%aid, "Probe worker stopped without a result");
                ProbeOutcome::rejected()
            }
        }
    }

    /// Probe catalog entries until the card accepts one
    pub fn probe_all<'a>(
        &self,
        catalog: &'a Catalog,
        cancel: &CancellationToken,
    ) -> ProbeResult<&'a AidEntry> {
        run_probes(catalog, cancel, |aid| self.probe_one(aid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MockError, MockGateway};
    use crate::probe::ProbeStrategy;
    use std::io::Cursor;
    use std::time::Instant;

    const ORIGINAL: &str = "A0000005591010FFFFFFFF8900000100";

    #[derive(Debug)]
    struct SlowGateway {
        aid: String,
        delay: Duration,
        log: Vec<String>,
    }

    impl SlowGateway {
        fn new(delay: Duration) -> Self {
            Self {
                aid: ORIGINAL.to_string(),
                delay,
                log: Vec::new(),
            }
        }

        fn operate(&mut self) -> Result<Value, MockError> {
            self.log.push(self.aid.clone());
            thread::sleep(self.delay);
            Err(MockError("no answer".into()))
        }
    }

    impl CardGateway for SlowGateway {
        type Error = MockError;

        fn aid(&self) -> &str {
            &self.aid
        }

        fn set_aid(&mut self, aid: &str) {
            self.aid = aid.to_string();
        }

        fn list_profiles(&mut self) -> Result<Value, Self::Error> {
            self.operate()
        }

        fn read_chip_info(&mut self) -> Result<Value, Self::Error> {
            self.operate()
        }
    }

    #[test]
    fn test_with_aid_restores() {
        let shared = SharedGateway::new(MockGateway::new(ORIGINAL));
        let seen = shared.with_aid("A000000559", |gateway| gateway.aid().to_string());
        assert_eq!(seen, "A000000559");
        assert_eq!(shared.current_aid(), ORIGINAL);
    }

    #[test]
    fn test_probe_one_through_worker() {
        let shared = SharedGateway::new(MockGateway::new(ORIGINAL).accept_profiles("A000000559"));
        let outcome = shared.probe_one("A000000559");
        assert_eq!(outcome.strategy(), Some(ProbeStrategy::ListProfiles));
        assert!(!shared.probe_one("A0000000871002").is_accepted());
        assert_eq!(shared.current_aid(), ORIGINAL);
    }

    #[test]
    fn test_probe_one_worker_panic_is_rejection() {
        let mut gateway = MockGateway::new(ORIGINAL);
        gateway.panic_on_list = true;
        let shared = SharedGateway::new(gateway);

        assert!(!shared.probe_one("A000000559").is_accepted());
        assert_eq!(shared.current_aid(), ORIGINAL);
    }

    #[test]
    fn test_probe_deadline() {
        let shared = SharedGateway::new(SlowGateway::new(Duration::from_millis(500)))
            .with_deadline(Duration::from_millis(50));

        let started = Instant::now();
        assert!(!shared.probe_one("A000000559").is_accepted());
        assert!(started.elapsed() < Duration::from_millis(450));

        // Waits for the overrunning worker to release the gateway
        assert_eq!(shared.current_aid(), ORIGINAL);
    }

    #[test]
    fn test_probe_all_shared() {
        let catalog = Catalog::from_reader(Cursor::new(
            "A0000000871002: USIM\nA000000559: eUICC\nA0000000031010: Visa\n",
        ))
        .unwrap();
        let shared =
            SharedGateway::new(MockGateway::new(ORIGINAL).accept_chip_info("A0000000031010"));

        let result = shared.probe_all(&catalog, &CancellationToken::new());
        assert_eq!(result.entry().map(|e| e.id()), Some("A0000000031010"));
        assert_eq!(shared.current_aid(), ORIGINAL);
    }

    #[test]
    fn test_overrun_does_not_leave_queued_work() {
        let catalog = Catalog::from_reader(Cursor::new(
            "A0000000871002: USIM\nA000000559: eUICC\nA0000000031010: Visa\n",
        ))
        .unwrap();
        let shared = SharedGateway::new(SlowGateway::new(Duration::from_millis(100)))
            .with_deadline(Duration::from_millis(20));

        let result = shared.probe_all(&catalog, &CancellationToken::new());
        assert_eq!(result, ProbeResult::Exhausted);

        // Let the overrunning worker and any queued ones finish
        thread::sleep(Duration::from_millis(600));

        let gateway = shared.inner.lock();
        assert_eq!(gateway.log, vec!["A000000559", "A000000559"]);
        assert_eq!(gateway.aid, ORIGINAL);
    }
}
