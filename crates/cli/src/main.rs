use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod commands;
mod utils;

use commands::*;

#[derive(Parser)]
#[command(version, about = "Resolve and probe eUICC ISD-R AIDs")]
struct Cli {
    /// AID catalog to use (searched next to the executable and in the
    /// working directory if not specified)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// lpac configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only accept fully-qualified 16-byte AIDs from the catalog
    #[arg(long, global = true)]
    strict: bool,

    /// Debug level output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    // Merging works on explicit files only
    if let Commands::Merge {
        output,
        inputs,
        no_backup,
    } = &cli.command
    {
        return merge_command(output, inputs, *no_backup);
    }

    let config = utils::load_config(cli.config.as_deref())?;
    let resolver = utils::build_resolver(cli.catalog.as_deref(), config.clone(), cli.strict);
    debug!(entries = resolver.catalog().len(), "Resolver ready");

    match &cli.command {
        Commands::List { issuer_roots } => list_command(&resolver, *issuer_roots),
        Commands::Search { query } => search_command(&resolver, query),
        Commands::Resolve { current } => resolve_command(&resolver, current.as_ref()),
        Commands::Presets => presets_command(&resolver),
        Commands::Test { aid } => test_command(&resolver, &config, aid),
        Commands::Probe { budget } => probe_command(&resolver, &config, *budget),
        Commands::Merge { .. } => unreachable!(), // Already handled above
    }
}

fn setup_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, &directives))
        .with_ansi(true)
        .init();
}

/// `RUST_LOG` directives layered over the level picked by `--verbose`
fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}
