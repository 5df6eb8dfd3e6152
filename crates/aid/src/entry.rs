//! AID catalog entries and identifier normalization

use std::fmt;

use derive_more::Display;

use crate::constants::{COMMENT_MARKER, FULL_AID_HEX_LEN, ISSUER_ROOT_PREFIX, METADATA_MARKERS, aid_len};

/// Which identifier lengths the catalog loader accepts
///
/// Card vendors publish both short RID-style prefixes (`A000000559`) and
/// fully-qualified ISD-R AIDs. The permissive policy keeps both; the ISD-R
/// policy only keeps identifiers that can be handed to the card as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum AidLengthPolicy {
    /// Any even length from 4 to 32 hex digits
    #[default]
    #[display("permissive")]
    Permissive,
    /// Exactly 32 hex digits
    #[display("isd-r only")]
    IsdrOnly,
}

impl AidLengthPolicy {
    /// Check whether an identifier of `len` hex digits is accepted
    pub const fn accepts(self, len: usize) -> bool {
        match self {
            Self::Permissive => len >= aid_len::MIN && len <= aid_len::MAX,
            Self::IsdrOnly => len == FULL_AID_HEX_LEN,
        }
    }
}

/// Normalize a user- or file-supplied AID: strip spaces and upper-case it
pub fn normalize_aid(aid: &str) -> String {
    aid.chars()
        .filter(|c| *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Check that an already normalized identifier is even-length hex within policy
pub fn is_valid_aid(aid: &str, policy: AidLengthPolicy) -> bool {
    policy.accepts(aid.len()) && hex::decode(aid).is_ok()
}

/// One record of the AID catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AidEntry {
    id: String,
    description: String,
    is_issuer_root: bool,
}

impl AidEntry {
    /// Create an entry, normalizing and validating the identifier
    ///
    /// Returns `None` when the identifier is not acceptable under `policy`.
    pub fn new(id: &str, description: &str, policy: AidLengthPolicy) -> Option<Self> {
        let id = normalize_aid(id.trim());
        if !is_valid_aid(&id, policy) {
            return None;
        }

        let is_issuer_root = id.starts_with(ISSUER_ROOT_PREFIX);
        Some(Self {
            id,
            description: description.trim().to_string(),
            is_issuer_root,
        })
    }

    /// Parse one catalog line of the form `<hex-id>: <description>`
    ///
    /// Blank lines, comments, metadata markers, lines without a colon and
    /// identifiers that fail validation all yield `None`.
    pub fn parse_line(line: &str, policy: AidLengthPolicy) -> Option<Self> {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with(COMMENT_MARKER)
            || METADATA_MARKERS.iter().any(|m| line.starts_with(m))
        {
            return None;
        }

        let (id, description) = line.split_once(':')?;
        Self::new(id, description, policy)
    }

    /// Upper-case hex identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Free-form description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the identifier carries the ISD-R prefix
    pub const fn is_issuer_root(&self) -> bool {
        self.is_issuer_root
    }

    /// Whether this is a fully-qualified (32 hex digit) ISD-R AID
    pub fn is_full_issuer_root(&self) -> bool {
        self.is_issuer_root && self.id.len() == FULL_AID_HEX_LEN
    }
}

impl fmt::Display for AidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.description)
    }
}
