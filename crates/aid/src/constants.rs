//! Constants used when handling eUICC application identifiers
//!
//! This module contains the catalog file conventions, the reserved ISD-R
//! prefix, and a handful of well-known ISD-R AIDs shipped by card vendors.

/// Name of the catalog file searched next to the executable and in the
/// working directory
pub const CATALOG_FILE_NAME: &str = "aid.txt";

/// Prefix reserved for eUICC Issuer Security Domain Root AIDs (RID + PIX start)
pub const ISSUER_ROOT_PREFIX: &str = "A000000559";

/// Length in hex digits of a fully-qualified ISD-R AID (16 bytes)
pub const FULL_AID_HEX_LEN: usize = 32;

/// Bounds on AID length in hex digits (2 to 16 bytes)
pub mod aid_len {
    /// Shortest identifier accepted by the permissive policy
    pub const MIN: usize = 4;
    /// Longest identifier accepted by any policy
    pub const MAX: usize = super::FULL_AID_HEX_LEN;
}

/// Metadata markers recognized (and ignored) at the start of catalog lines
pub const METADATA_MARKERS: [&str; 2] = ["Filetype:", "Version:"];

/// Comment marker for catalog lines
pub const COMMENT_MARKER: char = '#';

/// Well-known ISD-R AIDs
pub mod presets {
    /// GSMA default ISD-R AID (SGP.02 / SGP.22)
    pub const DEFAULT: &str = "A0000005591010FFFFFFFF8900000100";
    /// 5ber removable eUICC
    pub const FIVE_BER: &str = "A0000005591010FFFFFFFF8900050500";
    /// esim.me removable eUICC
    pub const ESIM_ME: &str = "A0000005591010000000008900000300";
    /// xesim removable eUICC
    pub const XESIM: &str = "A0000005591010FFFFFFFF8900000177";

    /// All presets as `(label, aid)` pairs, default first
    pub const ALL: [(&str, &str); 4] = [
        ("default", DEFAULT),
        ("5ber", FIVE_BER),
        ("esim.me", ESIM_ME),
        ("xesim", XESIM),
    ];

    /// Look up a preset by its label, ignoring case
    pub fn by_label(label: &str) -> Option<&'static str> {
        ALL.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, aid)| *aid)
    }
}
