//! Error types for the lpac gateway

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

/// Result type for lpac invocations
pub type Result<T> = std::result::Result<T, LpacError>;

/// Errors raised while invoking lpac
#[derive(Debug, thiserror::Error)]
pub enum LpacError {
    /// The lpac executable could not be started
    #[error("Failed to start {}: {source}", .program.display())]
    Spawn {
        /// Executable that was started
        program: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Reading lpac's output or waiting on it failed
    #[error("I/O error talking to lpac: {0}")]
    Io(#[from] std::io::Error),

    /// lpac did not finish within the configured timeout
    #[error("lpac {command} did not finish within {timeout:?}")]
    Timeout {
        /// Arguments of the invocation
        command: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// lpac reported a failure in its result line
    #[error("lpac returned code {code}: {message}")]
    Lpa {
        /// Result code (non-zero)
        code: i64,
        /// Short error message
        message: String,
        /// Additional detail, often the failing ES10 function
        data: Value,
    },

    /// lpac produced no result line
    #[error("lpac produced no result (exit status: {status})")]
    NoResult {
        /// Exit status as reported by the OS
        status: String,
    },

    /// lpac produced a line that is not a valid message
    #[error("Malformed lpac output line {line:?}: {source}")]
    Json {
        /// Offending output line
        line: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },
}

impl LpacError {
    /// Check if lpac reported a card-level failure (as opposed to a local one)
    pub const fn is_card_error(&self) -> bool {
        matches!(self, Self::Lpa { .. })
    }
}

/// Errors raised while loading gateway configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration sources could not be merged or deserialized
    #[error("Invalid lpac configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}
