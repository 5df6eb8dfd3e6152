//! Catalog file discovery

use std::path::PathBuf;

use tracing::{debug, info};

use super::Catalog;
use crate::constants::CATALOG_FILE_NAME;
use crate::entry::AidLengthPolicy;
use crate::error::{CatalogError, Result};

/// Candidate catalog locations, in search order
///
/// 1. next to the running executable, with symlinks resolved so an
///    installed link still finds the real install directory
/// 2. the current working directory
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(2);

    if let Some(dir) = std::env::current_exe()
        .and_then(|exe| exe.canonicalize())
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()))
    {
        candidates.push(dir.join(CATALOG_FILE_NAME));
    }

    if let Ok(dir) = std::env::current_dir() {
        candidates.push(dir.join(CATALOG_FILE_NAME));
    }

    candidates
}

/// Find the first existing catalog among the default candidates
pub fn discover() -> Result<PathBuf> {
    discover_in(candidate_paths())
}

/// Find the first existing file among `candidates`
pub(crate) fn discover_in(candidates: Vec<PathBuf>) -> Result<PathBuf> {
    for path in &candidates {
        if path.is_file() {
            debug!(path = %path.display(), "Found AID catalog");
            return Ok(path.clone());
        }
    }
    Err(CatalogError::NotFound {
        searched: candidates,
    })
}

/// Locate and load the catalog using the permissive length policy
pub fn load() -> Result<Catalog> {
    load_with_policy(AidLengthPolicy::default())
}

/// Locate and load the catalog
pub fn load_with_policy(policy: AidLengthPolicy) -> Result<Catalog> {
    let path = discover()?;
    let catalog = Catalog::load_from_path_with_policy(&path, policy)?;
    info!(path = %path.display(), entries = catalog.len(), "Loaded AID catalog");
    Ok(catalog)
}
