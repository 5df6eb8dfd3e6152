use std::path::PathBuf;

use clap::Subcommand;

mod catalog;
mod probe;

pub use catalog::*;
pub use probe::*;

/// Define subcommands for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// List catalog entries
    List {
        /// Only show ISD-R entries (all entries when there are none)
        #[arg(long)]
        issuer_roots: bool,
    },

    /// Search identifiers and descriptions
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Recommend a catalog entry for the configured AID
    Resolve {
        /// AID to resolve instead of the configured one
        #[arg(long)]
        current: Option<String>,
    },

    /// Show well-known ISD-R AIDs
    Presets,

    /// Check whether the card accepts one AID
    Test {
        /// AID to check (hex, spaces allowed) or a preset label such as `5ber`
        #[arg(required = true)]
        aid: String,
    },

    /// Probe catalog AIDs until the card accepts one
    Probe {
        /// Stop starting new probes after this many seconds
        #[arg(long)]
        budget: Option<u64>,
    },

    /// Merge catalog files into one
    Merge {
        /// Catalog to write
        #[arg(short, long, required = true)]
        output: PathBuf,

        /// Catalogs to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Do not back up an existing output file
        #[arg(long)]
        no_backup: bool,
    },
}
