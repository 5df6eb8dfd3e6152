//! Shared setup for AID CLI commands

pub mod display;

use std::path::Path;
use std::time::Duration;

use euicc_aid::{AidLengthPolicy, AidResolver, SharedGateway, probe::DEFAULT_PROBE_DEADLINE};
use euicc_lpac::{LpacConfig, LpacGateway};
use eyre::WrapErr;
use tracing::debug;

/// Resolver over the selected catalog, driving lpac for live probes
pub type Resolver = AidResolver<LpacGateway>;

/// Load the gateway configuration
pub fn load_config(path: Option<&Path>) -> eyre::Result<LpacConfig> {
    let config = LpacConfig::load(path).wrap_err("Failed to load lpac configuration")?;
    debug!(lpac = %config.executable().display(), aid = %config.aid, "Loaded configuration");
    Ok(config)
}

/// Build the resolver
///
/// An explicit catalog path is loaded directly; otherwise the default
/// locations are searched. Either way a missing catalog leaves the resolver
/// with an empty catalog.
pub fn build_resolver(catalog: Option<&Path>, config: LpacConfig, strict: bool) -> Resolver {
    let policy = if strict {
        AidLengthPolicy::IsdrOnly
    } else {
        AidLengthPolicy::Permissive
    };

    let deadline = worker_deadline(&config);
    let gateway = SharedGateway::new(LpacGateway::new(config)).with_deadline(deadline);

    match catalog {
        Some(path) => AidResolver::from_path(path, gateway, policy),
        None => AidResolver::from_discovery(gateway, policy),
    }
}

/// How long a single AID check may hold the card
fn worker_deadline(config: &LpacConfig) -> Duration {
    // Two lpac invocations per check, plus slack
    DEFAULT_PROBE_DEADLINE.max(config.timeout().saturating_mul(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_deadline() {
        let config = LpacConfig::default();
        assert_eq!(worker_deadline(&config), DEFAULT_PROBE_DEADLINE);

        let config = LpacConfig::default().with_timeout(Duration::from_secs(20));
        assert_eq!(worker_deadline(&config), Duration::from_secs(60));

        let config = LpacConfig {
            timeout_secs: u64::MAX,
            ..LpacConfig::default()
        };
        assert_eq!(worker_deadline(&config), Duration::MAX);
    }
}
