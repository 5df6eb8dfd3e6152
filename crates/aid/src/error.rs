//! Error types for catalog handling

use std::path::PathBuf;

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while locating, reading or writing an AID catalog
///
/// Malformed catalog lines are never reported here: the loader skips them.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No catalog file exists at any of the candidate locations
    #[error("{} not found in: {}", crate::CATALOG_FILE_NAME, display_paths(.searched))]
    NotFound {
        /// Locations that were tried, in order
        searched: Vec<PathBuf>,
    },

    /// The catalog file could not be opened or read
    #[error("Failed to read catalog {}: {source}", .path.display())]
    Read {
        /// Catalog being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The catalog could not be written
    #[error("Failed to write catalog {}: {source}", .path.display())]
    Write {
        /// Catalog being written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Check if this is a missing-catalog error
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no candidate locations".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
