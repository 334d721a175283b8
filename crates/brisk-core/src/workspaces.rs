//! Workspace package registry.
//!
//! Maps package names to the locally available workspace versions. The
//! planner only consults membership; the version/directory detail rides
//! along for downstream consumers. Discovery from `workspaces` glob
//! patterns is provided as a convenience and is best-effort: candidate
//! directories that fail to read or parse are skipped.

use crate::manifest::ProjectManifest;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A locally available workspace package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePackage {
    pub name: String,
    pub version: String,
    /// Absolute path to the package directory.
    pub dir: PathBuf,
}

/// Registry of workspace packages, read-only to resolution planning.
#[derive(Debug, Clone, Default)]
pub struct WorkspacePackages {
    packages: HashMap<String, BTreeMap<String, WorkspacePackage>>,
}

impl WorkspacePackages {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: WorkspacePackage) {
        self.packages
            .entry(package.name.clone())
            .or_default()
            .insert(package.version.clone(), package);
    }

    /// Whether any version of `name` is available in the workspace.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// All known versions of `name`, ordered by version string.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BTreeMap<String, WorkspacePackage>> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }
}

/// Discover workspace packages by expanding glob patterns under a root.
///
/// Each matching directory with a readable, named `package.json` becomes an
/// entry. Unreadable or nameless candidates are skipped.
#[must_use]
pub fn discover_workspace_packages(root: &Path, patterns: &[String]) -> WorkspacePackages {
    let mut packages = WorkspacePackages::new();

    for pattern in patterns {
        let full_pattern = root.join(pattern);
        let Ok(entries) = glob::glob(&full_pattern.to_string_lossy()) else {
            continue;
        };
        for dir in entries.flatten() {
            if let Some(package) = read_workspace_package(&dir) {
                packages.insert(package);
            }
        }
    }

    packages
}

/// Read name/version from a candidate workspace directory.
fn read_workspace_package(dir: &Path) -> Option<WorkspacePackage> {
    if !dir.is_dir() {
        return None;
    }

    let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
    let manifest: ProjectManifest = serde_json::from_str(&content).ok()?;

    Some(WorkspacePackage {
        name: manifest.name?,
        version: manifest.version.unwrap_or_else(|| "0.0.0".to_string()),
        dir: dir.to_path_buf(),
    })
}
