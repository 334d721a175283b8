//! Wanted dependencies: the per-dependency resolution requests.

use crate::manifest::ProjectManifest;

/// A single dependency request with its resolution policy flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantedDependency {
    /// Name the dependency is required under (may be empty for unaliased
    /// specifiers).
    pub alias: String,
    /// The raw specifier as declared: a semver range, tag, `workspace:`,
    /// `link:`, `file:`, `npm:` alias, git URL, etc.
    pub bare_specifier: String,
    /// Declared in devDependencies (and nowhere stronger).
    pub dev: bool,
    /// Declared in optionalDependencies.
    pub optional: bool,
    /// Newly discovered in the manifest, with no prior resolution.
    pub is_new: bool,
    /// Force the specifier itself to its latest compatible form.
    pub update_spec: bool,
    /// How deep into this dependency's subtree re-evaluation is forced:
    /// `-1` resolve only if missing, `0` re-evaluate own version only,
    /// `N > 0` propagate N levels down.
    pub update_depth: i32,
}

impl WantedDependency {
    /// Create a request with default policy flags.
    #[must_use]
    pub fn new(alias: impl Into<String>, bare_specifier: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            bare_specifier: bare_specifier.into(),
            dev: false,
            optional: false,
            is_new: false,
            update_spec: false,
            update_depth: -1,
        }
    }

    /// Return the same request stamped with an update depth.
    #[must_use]
    pub fn with_update_depth(mut self, update_depth: i32) -> Self {
        self.update_depth = update_depth;
        self
    }
}

/// Derive the wanted dependencies declared in a manifest.
///
/// One entry per name in the combined dependency map, flagged by the
/// declaring section and marked as newly discovered. Output is name-sorted
/// (the combined map is ordered), which keeps planning deterministic.
#[must_use]
pub fn get_wanted_dependencies(manifest: &ProjectManifest) -> Vec<WantedDependency> {
    manifest
        .all_dependencies()
        .into_iter()
        .map(|(alias, bare_specifier)| {
            let optional = manifest.optional_dependencies.contains_key(&alias);
            let dev = !optional
                && !manifest.dependencies.contains_key(&alias)
                && manifest.dev_dependencies.contains_key(&alias);
            WantedDependency {
                dev,
                optional,
                is_new: true,
                ..WantedDependency::new(alias, bare_specifier)
            }
        })
        .collect()
}
