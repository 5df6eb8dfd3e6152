//! The in-memory AID catalog
//!
//! A [`Catalog`] is an ordered, immutable list of [`AidEntry`] records in
//! file order. Parsing is lenient on purpose: the catalog is a user-editable
//! text file, so malformed lines are skipped (and traced) instead of failing
//! the whole load. Only I/O failures surface as errors.

mod merge;
mod source;
mod store;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::slice;

use tracing::{debug, trace};

use crate::entry::{AidEntry, AidLengthPolicy};
use crate::error::{CatalogError, Result};

pub use merge::merge_files;
pub use source::{candidate_paths, discover, load, load_with_policy};
pub use store::CatalogStore;

/// Ordered collection of known AIDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<AidEntry>,
    source: Option<PathBuf>,
}

impl Catalog {
    /// Create an empty catalog
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
            source: None,
        }
    }

    /// Create a catalog from entries, keeping their order
    pub fn from_entries(entries: Vec<AidEntry>) -> Self {
        Self {
            entries,
            source: None,
        }
    }

    /// Parse a catalog from a reader using the permissive length policy
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        Self::from_reader_with_policy(reader, AidLengthPolicy::default())
    }

    /// Parse a catalog from a reader
    ///
    /// Lines that do not form a valid entry are skipped. An I/O error while
    /// reading (including invalid UTF-8) aborts the parse.
    pub fn from_reader_with_policy<R: BufRead>(
        reader: R,
        policy: AidLengthPolicy,
    ) -> std::io::Result<Self> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            match AidEntry::parse_line(&line, policy) {
                Some(entry) => entries.push(entry),
                None => {
                    if !line.trim().is_empty() {
                        trace!(line = index + 1, "Skipping catalog line");
                        skipped += 1;
                    }
                }
            }
        }

        debug!(entries = entries.len(), skipped, %policy, "Parsed AID catalog");
        Ok(Self::from_entries(entries))
    }

    /// Load a catalog from a specific file using the permissive length policy
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_path_with_policy(path, AidLengthPolicy::default())
    }

    /// Load a catalog from a specific file
    pub fn load_from_path_with_policy(
        path: impl AsRef<Path>,
        policy: AidLengthPolicy,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| CatalogError::read(path, e))?;
        let mut catalog = Self::from_reader_with_policy(std::io::BufReader::new(file), policy)
            .map_err(|e| CatalogError::read(path, e))?;
        catalog.source = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// File this catalog was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[AidEntry] {
        &self.entries
    }

    /// Iterate over entries in catalog order
    pub fn iter(&self) -> slice::Iter<'_, AidEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry in catalog order
    pub fn first(&self) -> Option<&AidEntry> {
        self.entries.first()
    }

    /// Find an entry by identifier (normalized before comparison)
    pub fn get(&self, id: &str) -> Option<&AidEntry> {
        let id = crate::normalize_aid(id);
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Iterate over entries carrying the ISD-R prefix
    pub fn issuer_roots(&self) -> impl Iterator<Item = &AidEntry> {
        self.entries.iter().filter(|e| e.is_issuer_root())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a AidEntry;
    type IntoIter = slice::Iter<'a, AidEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
