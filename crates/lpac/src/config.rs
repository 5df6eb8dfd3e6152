//! Configuration for the lpac gateway

use std::path::{Path, PathBuf};
use std::time::Duration;

use euicc_aid::presets;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "EUICC_LPAC_";

/// Name of the lpac executable on this platform
#[cfg(windows)]
pub const DEFAULT_EXE_NAME: &str = "lpac.exe";
/// Name of the lpac executable on this platform
#[cfg(not(windows))]
pub const DEFAULT_EXE_NAME: &str = "lpac";

/// Seconds an lpac invocation may run before it is killed
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Shortest timeout an lpac invocation is given
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Settings for invoking lpac
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpacConfig {
    /// Directory containing the lpac executable
    pub dir: PathBuf,
    /// File name of the lpac executable
    pub exe_name: String,
    /// ISD-R AID passed to lpac
    pub aid: String,
    /// APDU backend (`LPAC_APDU`)
    pub apdu_backend: String,
    /// HTTP backend (`LPAC_HTTP`)
    pub http_backend: String,
    /// PC/SC reader to use, by driver interface id
    pub driver_ifid: Option<String>,
    /// Ask lpac to log APDUs
    pub debug_apdu: bool,
    /// Ask lpac to log HTTP traffic
    pub debug_http: bool,
    /// Seconds an invocation may run before it is killed
    pub timeout_secs: u64,
}

impl Default for LpacConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            exe_name: DEFAULT_EXE_NAME.to_string(),
            aid: presets::DEFAULT.to_string(),
            apdu_backend: "pcsc".to_string(),
            http_backend: "curl".to_string(),
            driver_ifid: None,
            debug_apdu: false,
            debug_http: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LpacConfig {
    /// Load configuration: defaults, then the TOML file at `path` if given,
    /// then `EUICC_LPAC_*` environment variables
    ///
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)).extract()?)
    }

    /// Set the lpac directory
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the executable name
    pub fn with_exe_name(mut self, exe_name: impl Into<String>) -> Self {
        self.exe_name = exe_name.into();
        self
    }

    /// Set the ISD-R AID
    pub fn with_aid(mut self, aid: impl Into<String>) -> Self {
        self.aid = aid.into();
        self
    }

    /// Select a PC/SC reader
    pub fn with_driver_ifid(mut self, ifid: impl Into<String>) -> Self {
        self.driver_ifid = Some(ifid.into());
        self
    }

    /// Enable or disable lpac's APDU and HTTP debug logging
    pub const fn with_debug(mut self, apdu: bool, http: bool) -> Self {
        self.debug_apdu = apdu;
        self.debug_http = http;
        self
    }

    /// Set the invocation timeout, rounded up to whole seconds
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        let mut secs = timeout.as_secs();
        if timeout.subsec_nanos() > 0 {
            secs = secs.saturating_add(1);
        }
        self.timeout_secs = secs;
        self
    }

    /// Invocation timeout, never shorter than [`MIN_TIMEOUT_SECS`]
    pub const fn timeout(&self) -> Duration {
        if self.timeout_secs < MIN_TIMEOUT_SECS {
            return Duration::from_secs(MIN_TIMEOUT_SECS);
        }
        Duration::from_secs(self.timeout_secs)
    }

    /// Full path of the lpac executable
    pub fn executable(&self) -> PathBuf {
        self.dir.join(&self.exe_name)
    }
}

/// Directory of the running executable, symlinks resolved
///
/// On Linux, `/usr/bin` is used when no lpac sits next to the executable.
fn default_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .and_then(|exe| exe.canonicalize())
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    if cfg!(target_os = "linux") && !exe_dir.join(DEFAULT_EXE_NAME).is_file() {
        return PathBuf::from("/usr/bin");
    }
    exe_dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = LpacConfig::default();
        assert_eq!(config.aid, presets::DEFAULT);
        assert_eq!(config.apdu_backend, "pcsc");
        assert_eq!(config.http_backend, "curl");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.executable().ends_with(DEFAULT_EXE_NAME));
    }

    #[test]
    fn test_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lpac.toml",
                r#"
                    dir = "/opt/lpac"
                    aid = "A0000005591010FFFFFFFF8900050500"
                    timeout_secs = 10
                "#,
            )?;
            jail.set_env("EUICC_LPAC_TIMEOUT_SECS", "20");
            jail.set_env("EUICC_LPAC_HTTP_BACKEND", "stdio");

            let config =
                LpacConfig::load(Some(Path::new("lpac.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.dir, PathBuf::from("/opt/lpac"));
            assert_eq!(config.aid, presets::FIVE_BER);
            assert_eq!(config.timeout_secs, 20);
            assert_eq!(config.http_backend, "stdio");
            assert_eq!(config.apdu_backend, "pcsc");
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|_| {
            let config =
                LpacConfig::load(Some(Path::new("absent.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.exe_name, DEFAULT_EXE_NAME);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_error() {
        Jail::expect_with(|jail| {
            jail.set_env("EUICC_LPAC_TIMEOUT_SECS", "soon");
            assert!(LpacConfig::load(None).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_builders() {
        let config = LpacConfig::default()
            .with_dir("/tmp/lpac")
            .with_exe_name("lpac-test")
            .with_aid(presets::XESIM)
            .with_driver_ifid("1")
            .with_debug(true, false)
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.executable(), PathBuf::from("/tmp/lpac/lpac-test"));
        assert_eq!(config.aid, presets::XESIM);
        assert!(config.debug_apdu && !config.debug_http);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_timeout_has_a_floor() {
        let config = LpacConfig::default().with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.timeout(), Duration::from_secs(1));

        let config = LpacConfig::default().with_timeout(Duration::from_millis(2500));
        assert_eq!(config.timeout(), Duration::from_secs(3));

        let config = LpacConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(MIN_TIMEOUT_SECS));

        Jail::expect_with(|jail| {
            jail.set_env("EUICC_LPAC_TIMEOUT_SECS", "0");
            let config = LpacConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.timeout(), Duration::from_secs(MIN_TIMEOUT_SECS));
            Ok(())
        });
    }
}
