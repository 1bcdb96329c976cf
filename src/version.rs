//! Version ordering over release names.
//!
//! Release names are ranked by semantic-version precedence, independent of
//! `created_at`: a release name can be deleted and recreated later, so the
//! creation timestamp must never decide which version is "newer". Malformed
//! names never fail a request; they fall back to a lexical comparison and
//! sort behind any well-formed version.

use semver::Version;
use std::cmp::Ordering;

/// Parse a release name leniently (a leading `v`/`V` is tolerated).
fn parse(name: &str) -> Option<Version> {
    let trimmed = name.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// Total newest-first order over two release names.
///
/// Returns `Less` when `a` should come before `b` in a newest-first list.
/// Never panics; byte-distinct names never compare equal.
pub fn compare_newest_first(a: &str, b: &str) -> Ordering {
    let ord = match (parse(a), parse(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        // Parseable versions outrank malformed names.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    };
    // Raw-byte tiebreak keeps the order total.
    ord.then_with(|| b.cmp(a))
}

/// Sort releases newest-first by name using [`compare_newest_first`].
pub fn sort_releases_newest_first(releases: &mut [crate::models::Release]) {
    releases.sort_by(|a, b| compare_newest_first(&a.name, &b.name));
}
