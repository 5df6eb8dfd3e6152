//! Commands that only read or rewrite the catalog

use std::path::{Path, PathBuf};

use euicc_aid::{merge_files, normalize_aid, presets};
use eyre::WrapErr;
use tracing::info;

use crate::utils::Resolver;
use crate::utils::display::{self, key_value_box, print_entries, section_title};

/// List catalog entries
pub fn list_command(resolver: &Resolver, issuer_roots: bool) -> eyre::Result<()> {
    let catalog = resolver.catalog();
    let entries = if issuer_roots {
        resolver.default_view()
    } else {
        catalog.entries().to_vec()
    };

    match catalog.source() {
        Some(path) => info!("Catalog: {}", path.display()),
        None => println!("{}", display::warning("No AID catalog loaded")),
    }

    println!(
        "{}",
        section_title(if issuer_roots { "ISD-R AIDs" } else { "Known AIDs" })
    );
    print_entries(&entries);
    Ok(())
}

/// Search the catalog
pub fn search_command(resolver: &Resolver, query: &str) -> eyre::Result<()> {
    let found = resolver.search(query);
    println!("{}", section_title("Search results"));
    print_entries(&found);
    Ok(())
}

/// Recommend a catalog entry
pub fn resolve_command(resolver: &Resolver, current: Option<&String>) -> eyre::Result<()> {
    let current = match current {
        Some(aid) => normalize_aid(aid),
        None => resolver.gateway().current_aid(),
    };

    match resolver.recommend_with_rule(&current) {
        Some((rule, entry)) => println!(
            "{}",
            key_value_box(
                "Recommended AID",
                &[
                    ("Current", current),
                    ("AID", entry.id().to_string()),
                    ("Description", entry.description().to_string()),
                    ("Matched by", rule.to_string()),
                ],
            )
        ),
        None => println!(
            "{}",
            display::warning("No recommendation: the AID catalog is empty")
        ),
    }
    Ok(())
}

/// Show the built-in presets
pub fn presets_command(resolver: &Resolver) -> eyre::Result<()> {
    let catalog = resolver.catalog();
    println!("{}", section_title("ISD-R presets"));
    for (label, aid) in presets::ALL {
        let known = match catalog.get(aid) {
            Some(entry) => entry.description().to_string(),
            None => "not in catalog".to_string(),
        };
        println!("  {label:<8} {aid}  ({known})");
    }
    Ok(())
}

/// Merge catalogs
pub fn merge_command(output: &Path, inputs: &[PathBuf], no_backup: bool) -> eyre::Result<()> {
    let count = merge_files(output, inputs, !no_backup)
        .wrap_err_with(|| format!("Failed to merge into {}", output.display()))?;
    println!(
        "{}",
        display::success(&format!("Wrote {count} entries to {}", output.display()))
    );
    Ok(())
}
