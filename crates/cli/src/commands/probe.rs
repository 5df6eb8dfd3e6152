//! Commands that talk to the card

use std::time::Duration;

use euicc_aid::{
    AidLengthPolicy, CancellationToken, ProbeResult, is_valid_aid, normalize_aid, presets,
};
use euicc_lpac::{LpacConfig, LpacGateway};
use eyre::{WrapErr, bail};
use tracing::info;

use crate::utils::Resolver;
use crate::utils::display::{self, key_value_box};

/// Fail early when lpac cannot be run at all
fn check_lpac(config: &LpacConfig) -> eyre::Result<()> {
    let version = LpacGateway::new(config.clone())
        .version()
        .wrap_err("lpac is not usable")?;
    info!(%version, "Using lpac");
    Ok(())
}

/// Turn a preset label or hex string into an AID
fn candidate_aid(arg: &str) -> eyre::Result<String> {
    if let Some(aid) = presets::by_label(arg.trim()) {
        return Ok(aid.to_string());
    }
    let aid = normalize_aid(arg);
    if !is_valid_aid(&aid, AidLengthPolicy::Permissive) {
        bail!("{aid:?} is neither a preset nor a valid AID (4 to 32 hex digits, even length)");
    }
    Ok(aid)
}

/// Probe a single AID
pub fn test_command(resolver: &Resolver, config: &LpacConfig, aid: &str) -> eyre::Result<()> {
    let aid = candidate_aid(aid)?;
    check_lpac(config)?;

    let outcome = resolver.test(&aid);
    match outcome.strategy() {
        Some(strategy) => println!(
            "{}",
            display::success(&format!("Card accepts {aid} ({strategy})"))
        ),
        None => println!("{}", display::warning(&format!("Card rejects {aid}"))),
    }
    Ok(())
}

/// Probe the catalog for a working AID
pub fn probe_command(
    resolver: &Resolver,
    config: &LpacConfig,
    budget: Option<u64>,
) -> eyre::Result<()> {
    if resolver.catalog().is_empty() {
        bail!("The AID catalog is empty, nothing to probe");
    }
    check_lpac(config)?;

    let cancel = CancellationToken::new();
    if let Some(secs) = budget {
        cancel.cancel_after(Duration::from_secs(secs));
    }

    match resolver.verify(&cancel) {
        ProbeResult::Found { entry, strategy } => {
            println!(
                "{}",
                key_value_box(
                    "Working AID",
                    &[
                        ("AID", entry.id().to_string()),
                        ("Description", entry.description().to_string()),
                        ("Accepted by", strategy.to_string()),
                    ],
                )
            );
            println!(
                "{}",
                display::info(&format!(
                    "Set EUICC_LPAC_AID={} or `aid` in the config file to use it",
                    entry.id()
                ))
            );
        }
        ProbeResult::Exhausted => {
            println!("{}", display::warning("No catalog AID was accepted by the card"))
        }
        ProbeResult::Cancelled => {
            println!("{}", display::warning("Probing stopped: time budget spent"))
        }
    }
    Ok(())
}
