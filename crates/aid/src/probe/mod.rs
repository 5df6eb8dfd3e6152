//! Live AID probing
//!
//! A probe switches the gateway to a candidate AID and asks the card to do
//! something with it: first the cheap profile listing, then the full chip
//! info read, which plain (non-eUICC) cards may also answer. A rejected AID
//! is an ordinary outcome, so probing reports values rather than errors.

mod shared;

use derive_more::Display;
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::catalog::Catalog;
use crate::entry::AidEntry;
use crate::gateway::{AidOverride, CardGateway};

pub use shared::{DEFAULT_PROBE_DEADLINE, SharedGateway};

/// Card operation that accepted an AID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ProbeStrategy {
    /// Profile enumeration (cheap, eUICC only)
    #[display("profile list")]
    ListProfiles,
    /// Chip info read (full)
    #[display("chip info")]
    ChipInfo,
}

/// Result of probing a single AID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    strategy: Option<ProbeStrategy>,
}

impl ProbeOutcome {
    /// The card accepted the AID through `strategy`
    pub const fn accepted(strategy: ProbeStrategy) -> Self {
        Self {
            strategy: Some(strategy),
        }
    }

    /// The card rejected the AID
    pub const fn rejected() -> Self {
        Self { strategy: None }
    }

    /// Whether the card accepted the AID
    pub const fn is_accepted(&self) -> bool {
        self.strategy.is_some()
    }

    /// Strategy that succeeded, if any
    pub const fn strategy(&self) -> Option<ProbeStrategy> {
        self.strategy
    }
}

/// Result of probing a sequence of AIDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult<T> {
    /// The first AID the card accepted
    Found {
        /// Accepted catalog entry
        entry: T,
        /// Operation that accepted it
        strategy: ProbeStrategy,
    },
    /// Every candidate was rejected
    Exhausted,
    /// Cancellation was requested before a working AID was found
    Cancelled,
}

impl<T> ProbeResult<T> {
    /// Accepted entry, if one was found
    pub const fn entry(&self) -> Option<&T> {
        match self {
            Self::Found { entry, .. } => Some(entry),
            _ => None,
        }
    }

    /// Consume the result, returning the accepted entry if any
    pub fn into_entry(self) -> Option<T> {
        match self {
            Self::Found { entry, .. } => Some(entry),
            _ => None,
        }
    }

    /// Map the accepted entry
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProbeResult<U> {
        match self {
            Self::Found { entry, strategy } => ProbeResult::Found {
                entry: f(entry),
                strategy,
            },
            Self::Exhausted => ProbeResult::Exhausted,
            Self::Cancelled => ProbeResult::Cancelled,
        }
    }
}

/// Probe one AID against the card
///
/// The gateway's AID is restored before returning, whatever the outcome.
pub fn probe_one<G: CardGateway + ?Sized>(gateway: &mut G, aid: &str) -> ProbeOutcome {
    let mut gateway = AidOverride::new(gateway, aid);

    match gateway.list_profiles() {
        Ok(_) => {
            debug!(%aid, "AID accepted by profile list");
            return ProbeOutcome::accepted(ProbeStrategy::ListProfiles);
        }
        Err(e) => debug!(%aid, error = %e, "Profile list probe failed"),
    }

    match gateway.read_chip_info() {
        Ok(_) => {
            debug!(%aid, "AID accepted by chip info");
            ProbeOutcome::accepted(ProbeStrategy::ChipInfo)
        }
        Err(e) => {
            debug!(%aid, error = %e, "Chip info probe failed");
            ProbeOutcome::rejected()
        }
    }
}

/// Order in which catalog entries are probed
///
/// ISD-R entries come first, then everything else, each group in catalog
/// order.
pub fn probe_order(catalog: &Catalog) -> impl Iterator<Item = &AidEntry> {
    catalog
        .issuer_roots()
        .chain(catalog.iter().filter(|e| !e.is_issuer_root()))
}

/// Probe catalog entries in [`probe_order`] until the card accepts one
///
/// Probes run strictly one after another. `cancel` is checked before each
/// probe, never during one.
pub fn probe_all<'a, G: CardGateway + ?Sized>(
    gateway: &mut G,
    catalog: &'a Catalog,
    cancel: &CancellationToken,
) -> ProbeResult<&'a AidEntry> {
    run_probes(catalog, cancel, |aid| probe_one(&mut *gateway, aid))
}

/// Find the first catalog entry the card accepts, without cancellation
pub fn find_working_aid<'a, G: CardGateway + ?Sized>(
    gateway: &mut G,
    catalog: &'a Catalog,
) -> Option<&'a AidEntry> {
    probe_all(gateway, catalog, &CancellationToken::new()).into_entry()
}

pub(crate) fn run_probes<'a>(
    catalog: &'a Catalog,
    cancel: &CancellationToken,
    mut probe: impl FnMut(&str) -> ProbeOutcome,
) -> ProbeResult<&'a AidEntry> {
    let mut attempted = 0usize;

    for entry in probe_order(catalog) {
        if cancel.is_cancelled() {
            info!(attempted, "AID probing cancelled");
            return ProbeResult::Cancelled;
        }

        attempted += 1;
        if let Some(strategy) = probe(entry.id()).strategy() {
            info!(aid = entry.id(), %strategy, attempted, "Found working AID");
            return ProbeResult::Found { entry, strategy };
        }
    }

    info!(attempted, "No catalog AID accepted by the card");
    ProbeResult::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use std::io::Cursor;

    fn parse(text: &str) -> Catalog {
        Catalog::from_reader(Cursor::new(text.to_string())).unwrap()
    }

    const ORIGINAL: &str = "A0000005591010FFFFFFFF8900000100";

    #[test]
    fn test_probe_one_cheap_path() {
        let mut gateway = MockGateway::new(ORIGINAL).accept_profiles("A000000559");
        let outcome = probe_one(&mut gateway, "A000000559");

        assert_eq!(outcome.strategy(), Some(ProbeStrategy::ListProfiles));
        assert_eq!(gateway.calls.len(), 1);
        assert_eq!(gateway.aid, ORIGINAL);
    }

    #[test]
    fn test_probe_one_falls_back_to_chip_info() {
        let mut gateway = MockGateway::new(ORIGINAL).accept_chip_info("A0000000871002");
        let outcome = probe_one(&mut gateway, "A0000000871002");

        assert!(outcome.is_accepted());
        assert_eq!(outcome.strategy(), Some(ProbeStrategy::ChipInfo));
        assert_eq!(
            gateway.calls,
            vec![
                (ProbeStrategy::ListProfiles, "A0000000871002".to_string()),
                (ProbeStrategy::ChipInfo, "A0000000871002".to_string()),
            ]
        );
        assert_eq!(gateway.aid, ORIGINAL);
    }

    #[test]
    fn test_probe_one_rejected_restores_aid() {
        let mut gateway = MockGateway::new(ORIGINAL);
        let outcome = probe_one(&mut gateway, "D2760000850101");
        assert_eq!(outcome, ProbeOutcome::rejected());
        assert_eq!(gateway.aid, ORIGINAL);
    }

    #[test]
    fn test_probe_one_restores_aid_after_panic() {
        let mut gateway = MockGateway::new(ORIGINAL);
        gateway.panic_on_list = true;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            probe_one(&mut gateway, "A000000559")
        }));

        assert!(result.is_err());
        assert_eq!(gateway.aid, ORIGINAL);
    }

    #[test]
    fn test_probe_order_puts_issuer_roots_first() {
        let catalog = parse(
            "A0000000871002: USIM\n\
             A000000559: eUICC\n\
             A0000000031010: Visa\n\
             A0000005591010FFFFFFFF8900000100: GSMA\n",
        );
        let ids: Vec<_> = probe_order(&catalog).map(|e| e.id()).collect();
        assert_eq!(
            ids,
            vec![
                "A000000559",
                "A0000005591010FFFFFFFF8900000100",
                "A0000000871002",
                "A0000000031010"
            ]
        );
    }

    #[test]
    fn test_probe_all_tries_roots_before_others() {
        let catalog = parse(
            "A0000000871002: USIM\n\
             A0000005591010FFFFFFFF8900000100: GSMA\n\
             A0000000031010: Visa\n\
             A0000005591010FFFFFFFF8900050500: 5ber\n\
             A000000559: eUICC\n",
        );
        let mut gateway = MockGateway::new(ORIGINAL).accept_chip_info("A0000000871002");

        let result = probe_all(&mut gateway, &catalog, &CancellationToken::new());
        let entry = result.entry().copied().unwrap();
        assert_eq!(entry.id(), "A0000000871002");
        assert!(matches!(
            result,
            ProbeResult::Found {
                strategy: ProbeStrategy::ChipInfo,
                ..
            }
        ));
        assert_eq!(
            gateway.probed_aids(),
            vec![
                "A0000005591010FFFFFFFF8900000100",
                "A0000005591010FFFFFFFF8900050500",
                "A000000559",
                "A0000000871002",
            ]
        );
        assert_eq!(gateway.aid, ORIGINAL);
    }

    #[test]
    fn test_probe_all_exhausted() {
        let catalog = parse("A000000559: eUICC\nA0000000871002: USIM\n");
        let mut gateway = MockGateway::new(ORIGINAL);
        let result = probe_all(&mut gateway, &catalog, &CancellationToken::new());
        assert_eq!(result, ProbeResult::Exhausted);
        assert_eq!(gateway.calls.len(), 4);
        assert!(find_working_aid(&mut gateway, &catalog).is_none());
    }

    #[test]
    fn test_probe_all_empty_catalog() {
        let mut gateway = MockGateway::new(ORIGINAL);
        let empty = Catalog::empty();
        let result = probe_all(&mut gateway, &empty, &CancellationToken::new());
        assert_eq!(result, ProbeResult::Exhausted);
        assert!(gateway.calls.is_empty());
    }

    #[test]
    fn test_probe_all_cancelled_between_probes() {
        let catalog = parse("A000000559: eUICC\nA0000000871002: USIM\nA0000000031010: Visa\n");
        let cancel = CancellationToken::new();
        let mut probed = Vec::new();

        let result = run_probes(&catalog, &cancel, |aid| {
            probed.push(aid.to_string());
            cancel.cancel();
            ProbeOutcome::rejected()
        });

        assert_eq!(result, ProbeResult::Cancelled);
        assert_eq!(probed, vec!["A000000559".to_string()]);
    }

    #[test]
    fn test_result_map() {
        let result = ProbeResult::Found {
            entry: 7,
            strategy: ProbeStrategy::ListProfiles,
        };
        assert_eq!(result.map(|n| n * 2).into_entry(), Some(14));
        assert_eq!(ProbeResult::<u8>::Cancelled.into_entry(), None);
    }
}
