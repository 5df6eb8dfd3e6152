//! AID resolution front door
//!
//! [`AidResolver`] ties the catalog, the matching heuristics and the probe
//! engine together. Static recommendations and live verification are kept
//! apart: the resolver never swaps a probed AID in for a recommended one,
//! and never applies either to the gateway. The caller decides.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cancel::CancellationToken;
use crate::catalog::{self, Catalog, CatalogStore};
use crate::entry::{AidEntry, AidLengthPolicy};
use crate::error::Result;
use crate::gateway::CardGateway;
use crate::matcher::{self, ResolveRule};
use crate::probe::{ProbeOutcome, ProbeResult, SharedGateway};

/// Catalog-backed AID resolver
#[derive(Debug)]
pub struct AidResolver<G> {
    store: CatalogStore,
    gateway: SharedGateway<G>,
}

impl<G> Clone for AidResolver<G> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gateway: self.gateway.clone(),
        }
    }
}

impl<G: CardGateway> AidResolver<G> {
    /// Create a resolver over an existing catalog store
    pub const fn new(store: CatalogStore, gateway: SharedGateway<G>) -> Self {
        Self { store, gateway }
    }

    /// Create a resolver from the default catalog locations
    ///
    /// A missing or unreadable catalog is not fatal: the resolver starts
    /// with an empty catalog and every lookup yields no recommendation.
    pub fn from_discovery(gateway: SharedGateway<G>, policy: AidLengthPolicy) -> Self {
        let catalog = or_empty(catalog::load_with_policy(policy));
        Self::new(CatalogStore::new(catalog).with_policy(policy), gateway)
    }

    /// Create a resolver from a specific catalog file, degrading to an empty
    /// catalog on error
    pub fn from_path(
        path: impl AsRef<Path>,
        gateway: SharedGateway<G>,
        policy: AidLengthPolicy,
    ) -> Self {
        let catalog = or_empty(Catalog::load_from_path_with_policy(path, policy));
        Self::new(CatalogStore::new(catalog).with_policy(policy), gateway)
    }

    /// Catalog store backing this resolver
    pub const fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Gateway used for live probing
    pub const fn gateway(&self) -> &SharedGateway<G> {
        &self.gateway
    }

    /// Current catalog snapshot
    pub fn catalog(&self) -> Arc<Catalog> {
        self.store.snapshot()
    }

    /// Recommend a catalog entry for `current_aid`
    pub fn recommend(&self, current_aid: &str) -> Option<AidEntry> {
        self.recommend_with_rule(current_aid).map(|(_, entry)| entry)
    }

    /// Recommend a catalog entry for `current_aid`, with the rule that matched
    pub fn recommend_with_rule(&self, current_aid: &str) -> Option<(ResolveRule, AidEntry)> {
        let catalog = self.catalog();
        matcher::resolve_with_rule(current_aid, &catalog).map(|(rule, entry)| (rule, entry.clone()))
    }

    /// Recommend a catalog entry for the AID the gateway is configured with
    pub fn recommend_for_gateway(&self) -> Option<AidEntry> {
        self.recommend(&self.gateway.current_aid())
    }

    /// Search the catalog
    pub fn search(&self, query: &str) -> Vec<AidEntry> {
        let catalog = self.catalog();
        matcher::search(query, &catalog).into_iter().cloned().collect()
    }

    /// Entries offered by default in a picker
    pub fn default_view(&self) -> Vec<AidEntry> {
        let catalog = self.catalog();
        matcher::issuer_roots_or_all(&catalog)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Reload the catalog from the default locations
    ///
    /// On error the current catalog is kept and the error returned.
    pub fn reload(&self) -> Result<usize> {
        let catalog = self.store.reload()?;
        Ok(catalog.len())
    }

    /// Reload the catalog from a specific file
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<usize> {
        let catalog = self.store.reload_from(path)?;
        Ok(catalog.len())
    }
}

impl<G: CardGateway + Send + 'static> AidResolver<G> {
    /// Probe a single AID against the card
    pub fn test(&self, aid: &str) -> ProbeOutcome {
        self.gateway.probe_one(aid)
    }

    /// Probe the catalog for an AID the card accepts
    ///
    /// This is slow and touches the card. The gateway's configured AID is
    /// left unchanged.
    pub fn verify(&self, cancel: &CancellationToken) -> ProbeResult<AidEntry> {
        let catalog = self.catalog();
        info!(entries = catalog.len(), "Probing catalog AIDs against the card");
        self.gateway.probe_all(&catalog, cancel).map(Clone::clone)
    }
}

/// Fall back to an empty catalog, quietly when there simply is no file
fn or_empty(loaded: Result<Catalog>) -> Catalog {
    loaded.unwrap_or_else(|e| {
        if e.is_not_found() {
            info!(error = %e, "No AID catalog found, continuing with an empty one");
        } else {
            warn!(error = %e, "Continuing with an empty AID catalog");
        }
        Catalog::empty()
    })
}
