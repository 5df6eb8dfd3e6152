//! Catalog maintenance: merging several catalog files into one

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::Catalog;
use crate::entry::{AidEntry, AidLengthPolicy};
use crate::error::{CatalogError, Result};

impl Catalog {
    /// Merge catalogs into one, de-duplicated by identifier
    ///
    /// When an identifier appears more than once the longer description
    /// wins. The result is sorted by identifier.
    pub fn merged<'a>(catalogs: impl IntoIterator<Item = &'a Catalog>) -> Self {
        let mut by_id: BTreeMap<&str, &AidEntry> = BTreeMap::new();

        for entry in catalogs.into_iter().flat_map(Catalog::iter) {
            by_id
                .entry(entry.id())
                .and_modify(|kept| {
                    if entry.description().len() > kept.description().len() {
                        *kept = entry;
                    }
                })
                .or_insert(entry);
        }

        Self::from_entries(by_id.into_values().cloned().collect())
    }

    /// Write the catalog in `<ID>: <description>` form, one entry per line
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for entry in self {
            writeln!(writer, "{entry}")?;
        }
        writer.flush()
    }
}

/// Merge catalog files into `output`
///
/// Inputs that cannot be read are skipped with a warning. `output` itself is
/// not implicitly an input; pass it in `inputs` to fold its current content
/// in. When `backup` is set and `output` exists, it is first copied to
/// `<output>.backup.<timestamp>`. The merged catalog is written next to
/// `output` and renamed over it. Returns the number of merged entries.
pub fn merge_files(output: &Path, inputs: &[PathBuf], backup: bool) -> Result<usize> {
    let mut catalogs = Vec::with_capacity(inputs.len());
    for input in inputs {
        match Catalog::load_from_path_with_policy(input, AidLengthPolicy::Permissive) {
            Ok(catalog) => catalogs.push(catalog),
            Err(e) => warn!(error = %e, "Skipping unreadable catalog"),
        }
    }

    let merged = Catalog::merged(&catalogs);

    if backup && output.is_file() {
        let backup_path = backup_path(output);
        fs::copy(output, &backup_path).map_err(|e| CatalogError::write(&backup_path, e))?;
        info!(path = %backup_path.display(), "Backed up existing catalog");
    }

    let staging = with_suffix(output, ".new");
    let file = fs::File::create(&staging).map_err(|e| CatalogError::write(&staging, e))?;
    merged
        .write_to(BufWriter::new(file))
        .map_err(|e| CatalogError::write(&staging, e))?;
    fs::rename(&staging, output).map_err(|e| CatalogError::write(output, e))?;

    info!(entries = merged.len(), path = %output.display(), "Merged AID catalogs");
    Ok(merged.len())
}

fn backup_path(output: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    with_suffix(output, &format!(".backup.{stamp}"))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
