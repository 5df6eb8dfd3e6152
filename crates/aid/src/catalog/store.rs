//! Shared, atomically replaceable catalog handle

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::Catalog;
use crate::entry::AidLengthPolicy;
use crate::error::Result;

/// Cloneable handle to the currently published catalog
///
/// Readers take an `Arc` snapshot and keep a consistent view for as long as
/// they hold it. A reload publishes a whole new catalog in one swap; entries
/// are never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    current: Arc<RwLock<Arc<Catalog>>>,
    policy: AidLengthPolicy,
}

impl CatalogStore {
    /// Create a store publishing `catalog`
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
            policy: AidLengthPolicy::default(),
        }
    }

    /// Set the length policy used by reloads
    pub const fn with_policy(mut self, policy: AidLengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Length policy used by reloads
    pub const fn policy(&self) -> AidLengthPolicy {
        self.policy
    }

    /// Current catalog snapshot
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Publish a new catalog, returning the one it replaced
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Reload from the default catalog locations
    ///
    /// On error the previously published catalog stays in place.
    pub fn reload(&self) -> Result<Arc<Catalog>> {
        let catalog = super::load_with_policy(self.policy)?;
        self.publish(catalog)
    }

    /// Reload from a specific file
    ///
    /// On error the previously published catalog stays in place.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<Arc<Catalog>> {
        let catalog = Catalog::load_from_path_with_policy(path, self.policy)?;
        self.publish(catalog)
    }

    fn publish(&self, catalog: Catalog) -> Result<Arc<Catalog>> {
        info!(entries = catalog.len(), "Publishing reloaded AID catalog");
        self.replace(catalog);
        Ok(self.snapshot())
    }
}
