//! [`CardGateway`] implementation backed by lpac

use euicc_aid::CardGateway;
use serde_json::Value;

use crate::config::LpacConfig;
use crate::error::{LpacError, Result};
use crate::runner::run;

/// Card gateway that shells out to lpac for every operation
///
/// The AID handed to lpac is the configured [`LpacConfig::aid`]; probing
/// overrides it through [`CardGateway::set_aid`].
#[derive(Debug, Clone)]
pub struct LpacGateway {
    config: LpacConfig,
}

impl LpacGateway {
    /// Create a gateway from configuration
    pub const fn new(config: LpacConfig) -> Self {
        Self { config }
    }

    /// Gateway configuration
    pub const fn config(&self) -> &LpacConfig {
        &self.config
    }

    /// Run an arbitrary lpac command with the configured AID
    pub fn command(&self, args: &[&str]) -> Result<Value> {
        run(&self.config, &self.config.aid, args)
    }

    /// lpac version string
    pub fn version(&self) -> Result<String> {
        match self.command(&["version"])? {
            Value::String(version) => Ok(version),
            other => Ok(other.to_string()),
        }
    }
}

impl CardGateway for LpacGateway {
    type Error = LpacError;

    fn aid(&self) -> &str {
        &self.config.aid
    }

    fn set_aid(&mut self, aid: &str) {
        self.config.aid = aid.to_string();
    }

    fn list_profiles(&mut self) -> Result<Value> {
        self.command(&["profile", "list"])
    }

    fn read_chip_info(&mut self) -> Result<Value> {
        self.command(&["chip", "info"])
    }
}
