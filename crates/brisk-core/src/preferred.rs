//! Preferred-version hints derived from a project's declared dependencies.
//!
//! These bias the resolver toward specifiers already in use across the
//! workspace. Derivation is best-effort: specifiers that do not classify as
//! a version, range, or tag are silently skipped.

use crate::manifest::{Dependencies, ProjectManifest};
use crate::selector::{parse_version_selector, SelectorKind};
use std::collections::HashMap;

/// Real package name mapped to the normalized specifiers in use, each
/// annotated with its selector kind. A normalized specifier appears at most
/// once per name; kinds may mix for the same name.
pub type PreferredVersions = HashMap<String, HashMap<String, SelectorKind>>;

/// Derive preferred versions from a manifest's combined dependency map.
#[must_use]
pub fn get_preferred_versions(manifest: &ProjectManifest) -> PreferredVersions {
    version_specs_by_real_names(&manifest.all_dependencies())
}

/// Group classified specifiers under the real package name they refer to.
///
/// Plain specifiers are recorded under the declaring alias. `npm:` aliased
/// specifiers are unwrapped: `"bar": "npm:baz@^2.0.0"` records `^2.0.0`
/// under `baz`, not `bar`. Any other protocol is not a version preference.
#[must_use]
pub fn version_specs_by_real_names(deps: &Dependencies) -> PreferredVersions {
    let mut acc = PreferredVersions::new();
    for (alias, specifier) in deps {
        if let Some(aliased) = specifier.strip_prefix("npm:") {
            // The version part follows the last '@'; an '@' at position 0
            // would be a scoped name with no version at all.
            let Some(at) = aliased.rfind('@').filter(|at| *at > 0) else {
                continue;
            };
            if let Some(selector) = parse_version_selector(&aliased[at + 1..]) {
                acc.entry(aliased[..at].to_string())
                    .or_default()
                    .insert(selector.normalized, selector.kind);
            }
        } else if !specifier.contains(':') {
            if let Some(selector) = parse_version_selector(specifier) {
                acc.entry(alias.clone())
                    .or_default()
                    .insert(selector.normalized, selector.kind);
            }
        }
    }
    acc
}
