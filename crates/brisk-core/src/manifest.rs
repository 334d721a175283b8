//! The slice of an npm manifest consumed by resolution planning.
//!
//! Loading and parsing `package.json` from disk is the embedder's concern;
//! this module only defines the deserialized shape and the combined
//! dependency view over it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dependency section: package name mapped to its raw specifier.
pub type Dependencies = BTreeMap<String, String>;

/// Per-peer metadata from `peerDependenciesMeta`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerDependencyMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Declared dependency sets of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: Dependencies,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: Dependencies,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_dependencies: Dependencies,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub peer_dependencies: Dependencies,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub peer_dependencies_meta: BTreeMap<String, PeerDependencyMeta>,
}

impl ProjectManifest {
    /// Combine the regular, dev and optional sections into one map.
    ///
    /// When a name appears in several sections the precedence is
    /// devDependencies < dependencies < optionalDependencies, so the
    /// optional declaration wins.
    #[must_use]
    pub fn all_dependencies(&self) -> Dependencies {
        let mut all = Dependencies::new();
        for (name, specifier) in self
            .dev_dependencies
            .iter()
            .chain(self.dependencies.iter())
            .chain(self.optional_dependencies.iter())
        {
            all.insert(name.clone(), specifier.clone());
        }
        all
    }
}
