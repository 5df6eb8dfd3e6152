//! lpac-backed card gateway
//!
//! This crate drives [lpac](https://github.com/estkme-group/lpac), a
//! command-line Local Profile Assistant, as a child process. Each card
//! operation is one lpac invocation with the ISD-R AID passed through the
//! environment, which makes [`LpacGateway`] a natural [`CardGateway`] for
//! AID probing.
//!
//! [`CardGateway`]: euicc_aid::CardGateway
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod gateway;
pub mod output;
mod runner;

pub use config::{DEFAULT_EXE_NAME, DEFAULT_TIMEOUT_SECS, ENV_PREFIX, LpacConfig, MIN_TIMEOUT_SECS};
pub use error::{ConfigError, LpacError, Result};
pub use gateway::LpacGateway;
