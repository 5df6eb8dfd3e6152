//! ISD-R AID resolution for eUICC tooling
//!
//! This crate knows which Application Identifier (AID) to use when talking
//! to an eUICC's Issuer Security Domain Root. It provides:
//!
//! - a catalog of known AIDs loaded from a user-editable `aid.txt`
//! - static matching heuristics that recommend a catalog entry for the
//!   currently configured AID
//! - live probing that asks the card which catalog AID it answers to,
//!   always restoring the gateway's configured AID afterwards
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use euicc_aid::{Catalog, resolve};
//!
//! let catalog = Catalog::from_reader(Cursor::new(
//!     "A0000000871002: USIM\nA000000559: eUICC prefix\n",
//! ))?;
//!
//! let entry = resolve("A0000005591010FFFFFFFF8900000100", &catalog).unwrap();
//! assert_eq!(entry.id(), "A000000559");
//! # Ok::<(), std::io::Error>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod cancel;
pub mod catalog;
pub mod constants;
mod entry;
mod error;
mod gateway;
pub mod matcher;
pub mod probe;
mod resolver;

pub use cancel::CancellationToken;
pub use catalog::{Catalog, CatalogStore, merge_files};
pub use constants::{CATALOG_FILE_NAME, ISSUER_ROOT_PREFIX, presets};
pub use entry::{AidEntry, AidLengthPolicy, is_valid_aid, normalize_aid};
pub use error::{CatalogError, Result};
pub use gateway::{AidOverride, CardGateway};
pub use matcher::{ResolveRule, issuer_roots_or_all, resolve, resolve_with_rule, search};
pub use probe::{
    ProbeOutcome, ProbeResult, ProbeStrategy, SharedGateway, find_working_aid, probe_all,
    probe_one,
};
pub use resolver::AidResolver;
