//! Static AID matching heuristics
//!
//! Everything in this module is pure: it only reads a [`Catalog`] and returns
//! references into it. [`resolve`] is a best guess for pre-filling a picker,
//! not a statement that the card actually answers to the returned AID.

use derive_more::Display;

use crate::catalog::Catalog;
use crate::entry::{AidEntry, normalize_aid};

/// Rule of the [`resolve`] chain that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ResolveRule {
    /// Identifier equals the configured AID
    #[display("exact match")]
    Exact,
    /// Identifier and configured AID are prefixes of one another
    #[display("prefix match")]
    Prefix,
    /// First fully-qualified ISD-R AID
    #[display("full ISD-R fallback")]
    FullIssuerRoot,
    /// First entry with the ISD-R prefix
    #[display("ISD-R fallback")]
    AnyIssuerRoot,
    /// First catalog entry
    #[display("first entry")]
    First,
}

type Selector = for<'a> fn(&str, &'a Catalog) -> Option<&'a AidEntry>;

/// Resolution rules in tie-break order
const RULES: [(ResolveRule, Selector); 5] = [
    (ResolveRule::Exact, exact),
    (ResolveRule::Prefix, prefix),
    (ResolveRule::FullIssuerRoot, full_issuer_root),
    (ResolveRule::AnyIssuerRoot, any_issuer_root),
    (ResolveRule::First, first),
];

fn exact<'a>(aid: &str, catalog: &'a Catalog) -> Option<&'a AidEntry> {
    catalog.iter().find(|e| e.id() == aid)
}

fn prefix<'a>(aid: &str, catalog: &'a Catalog) -> Option<&'a AidEntry> {
    // An empty AID is a prefix of every identifier and matches the first entry
    catalog
        .iter()
        .find(|e| aid.starts_with(e.id()) || e.id().starts_with(aid))
}

fn full_issuer_root<'a>(_: &str, catalog: &'a Catalog) -> Option<&'a AidEntry> {
    catalog.iter().find(|e| e.is_full_issuer_root())
}

fn any_issuer_root<'a>(_: &str, catalog: &'a Catalog) -> Option<&'a AidEntry> {
    catalog.issuer_roots().next()
}

fn first<'a>(_: &str, catalog: &'a Catalog) -> Option<&'a AidEntry> {
    catalog.first()
}

/// Pick the catalog entry that best fits the currently configured AID
///
/// Returns `None` only for an empty catalog.
pub fn resolve<'a>(current_aid: &str, catalog: &'a Catalog) -> Option<&'a AidEntry> {
    resolve_with_rule(current_aid, catalog).map(|(_, entry)| entry)
}

/// Like [`resolve`], also reporting which rule matched
pub fn resolve_with_rule<'a>(
    current_aid: &str,
    catalog: &'a Catalog,
) -> Option<(ResolveRule, &'a AidEntry)> {
    let aid = normalize_aid(current_aid);
    RULES
        .iter()
        .find_map(|(rule, select)| select(&aid, catalog).map(|entry| (*rule, entry)))
}

/// Case-insensitive substring search over identifiers and descriptions
///
/// An empty query returns the whole catalog. Results keep catalog order and
/// each entry appears at most once.
pub fn search<'a>(query: &str, catalog: &'a Catalog) -> Vec<&'a AidEntry> {
    let query = query.trim().to_uppercase();
    if query.is_empty() {
        return catalog.iter().collect();
    }

    catalog
        .iter()
        .filter(|e| {
            e.id().to_uppercase().contains(&query)
                || e.description().to_uppercase().contains(&query)
        })
        .collect()
}

/// Default picker view: the ISD-R entries, or everything when there are none
pub fn issuer_roots_or_all(catalog: &Catalog) -> Vec<&AidEntry> {
    let roots: Vec<_> = catalog.issuer_roots().collect();
    if roots.is_empty() {
        catalog.iter().collect()
    } else {
        roots
    }
}
