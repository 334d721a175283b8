//! Version-specifier classification.
//!
//! Decides whether a raw specifier is an exact version, an npm range
//! expression, or a dist-tag, and produces a normalized form. Anything else
//! (URLs, protocols, garbage) is unclassified and callers ignore it.
//!
//! npm range syntax is wider than the `semver` crate accepts directly:
//! hyphen ranges (`1.0.0 - 2.0.0`), `||` alternatives, and space-joined AND
//! comparators (`>=2.1.2 <3.0.0`) are rewritten before parsing. Wildcard
//! ranges (`1.x`, `1.2.*`, `*`) parse natively.

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// What kind of selector a specifier turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Version,
    Range,
    Tag,
}

impl SelectorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Range => "range",
            Self::Tag => "tag",
        }
    }
}

/// A classified version selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSelector {
    /// Canonical form: the rendered version for exact versions, the trimmed
    /// input for ranges and tags.
    pub normalized: String,
    pub kind: SelectorKind,
}

/// Classify a raw specifier string.
///
/// Returns `None` for anything that is not a version, range, or dist-tag.
/// Protocol-prefixed strings never reach this function in practice, but they
/// fail classification anyway (a `:` is not a valid tag character).
#[must_use]
pub fn parse_version_selector(raw: &str) -> Option<VersionSelector> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Exact version, allowing npm's "v1.2.3", "=1.2.3" and "=v1.2.3"
    // spellings. At most one of each prefix; "vv1.2.3" is a tag, not a
    // version.
    let bare = trimmed.strip_prefix('=').unwrap_or(trimmed);
    let bare = bare.strip_prefix('v').unwrap_or(bare);
    if let Ok(version) = Version::parse(bare) {
        return Some(VersionSelector {
            normalized: version.to_string(),
            kind: SelectorKind::Version,
        });
    }

    if is_npm_range(trimmed) {
        return Some(VersionSelector {
            normalized: trimmed.to_string(),
            kind: SelectorKind::Range,
        });
    }

    if is_valid_tag(trimmed) {
        return Some(VersionSelector {
            normalized: trimmed.to_string(),
            kind: SelectorKind::Tag,
        });
    }

    None
}

/// Check whether a string is a valid npm range expression.
fn is_npm_range(range: &str) -> bool {
    if range.contains("||") {
        // Every alternative must be valid on its own.
        range
            .split("||")
            .map(str::trim)
            .all(|alt| !alt.is_empty() && parse_single_range(alt).is_some())
    } else {
        parse_single_range(range).is_some()
    }
}

/// Parse a single (no `||`) npm range into a version requirement.
fn parse_single_range(range: &str) -> Option<VersionReq> {
    let range = range.trim();

    // Hyphen range: "1.0.0 - 2.0.0" means ">=1.0.0, <=2.0.0"
    if let Some((start, end)) = split_hyphen_range(range) {
        return VersionReq::parse(&format!(">={start}, <={end}")).ok();
    }

    // npm joins AND comparators with spaces; the semver crate wants commas.
    let joined = join_space_comparators(range);
    VersionReq::parse(&joined).ok()
}

/// Split a hyphen range like "1.0.0 - 2.0.0" into its endpoints.
fn split_hyphen_range(range: &str) -> Option<(&str, &str)> {
    let (start, end) = range.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() || end.contains(" - ") {
        return None;
    }
    Some((start, end))
}

/// Rewrite space-separated AND comparators to comma-separated form.
///
/// ">=2.1.2 <3.0.0" becomes ">=2.1.2, <3.0.0". An operator token separated
/// from its version (">= 2.1.2") is re-attached first.
fn join_space_comparators(range: &str) -> String {
    let mut comparators: Vec<String> = Vec::new();
    for token in range.split_whitespace() {
        match comparators.last_mut() {
            // A dangling operator picks up the following token.
            Some(prev) if is_bare_operator(prev) => prev.push_str(token),
            _ => comparators.push(token.to_string()),
        }
    }
    comparators.join(", ")
}

fn is_bare_operator(token: &str) -> bool {
    matches!(token, ">" | "<" | ">=" | "<=" | "=" | "^" | "~")
}

/// Check whether a string is a syntactically valid dist-tag name.
///
/// Tags share the package-name character set: alphanumerics plus `-`, `_`
/// and `.`, not starting with a dot.
fn is_valid_tag(tag: &str) -> bool {
    !tag.starts_with('.')
        && tag
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}
