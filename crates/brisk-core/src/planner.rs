//! Importer resolution planning.
//!
//! For each project in the workspace this derives the exact set of
//! dependency requests to feed into version resolution: which declared
//! dependencies still need resolving, how deep their subtrees must be
//! re-evaluated, and which version preferences should bias resolution
//! toward workspace-wide consistency. The output record is consumed by the
//! graph-resolution engine and then discarded; nothing here persists.

use crate::error::PlanError;
use crate::links::{partition_linked_packages, PartitionOptions};
use crate::manifest::ProjectManifest;
use crate::peers::validate_peer_dependencies;
use crate::preferred::{get_preferred_versions, PreferredVersions};
use crate::wanted::{get_wanted_dependencies, WantedDependency};
use crate::workspaces::WorkspacePackages;
use std::path::PathBuf;

/// A project being prepared for resolution.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    pub root_dir: PathBuf,
    pub modules_dir: PathBuf,
    /// Absent for a virtual project driven purely by prior (lockfile) state.
    pub manifest: Option<ProjectManifest>,
    /// Prior, already-known dependency requests.
    pub wanted_dependencies: Vec<WantedDependency>,
    /// Force version re-evaluation for this project.
    pub update: bool,
    /// Per-package update selector patterns. Presence alone switches the
    /// update-depth policy here; the patterns are consumed downstream.
    pub update_matching: Option<Vec<String>>,
    /// Aliases being deliberately removed this run.
    pub remove_packages: Vec<String>,
}

/// Global planning options shared across importers.
#[derive(Debug, Clone, Default)]
pub struct ResolveImporterOptions {
    /// Update depth applied when a project's update policy is active.
    pub default_update_depth: i32,
    /// Lockfile-only runs do not touch `node_modules`, so alien modules are
    /// left visible to the link probes.
    pub lockfile_only: bool,
    /// Caller-supplied preference hints; derived from the manifest if absent.
    pub preferred_versions: Option<PreferredVersions>,
    pub virtual_store_dir: PathBuf,
    pub workspace_packages: WorkspacePackages,
    /// A global "update everything to latest" request is in effect.
    pub update_to_latest: bool,
    /// The caller passed no per-package dependency selectors.
    pub no_dependency_selectors: bool,
}

/// The per-importer input handed to the graph-resolution engine.
#[derive(Debug, Clone)]
pub struct ResolveImporter {
    pub root_dir: PathBuf,
    pub modules_dir: PathBuf,
    pub update: bool,
    pub update_matching: Option<Vec<String>>,
    /// Final, deduplicated, update-depth-stamped requests. At most one entry
    /// per alias; prior entries win over manifest rediscovery.
    pub wanted_dependencies: Vec<WantedDependency>,
    pub preferred_versions: PreferredVersions,
    pub has_removed_dependencies: bool,
}

/// Prepare one importer for resolution.
///
/// # Errors
/// Fails on a structurally invalid peer declaration (aborts this importer)
/// or an unexpected I/O error while probing links (aborts the run).
pub async fn to_resolve_importer(
    opts: &ResolveImporterOptions,
    project: Importer,
) -> Result<ResolveImporter, PlanError> {
    validate_peer_dependencies(&project)?;

    let all_deps = project
        .manifest
        .as_ref()
        .map(get_wanted_dependencies)
        .unwrap_or_default();
    let partitioned = partition_linked_packages(
        all_deps,
        &PartitionOptions {
            project_dir: &project.root_dir,
            modules_dir: &project.modules_dir,
            virtual_store_dir: &opts.virtual_store_dir,
            workspace_packages: &opts.workspace_packages,
            lockfile_only: opts.lockfile_only,
        },
    )
    .await?;

    let default_update_depth = if project.update || project.update_matching.is_some() {
        opts.default_update_depth
    } else {
        -1
    };

    // Genuinely new additions: non-linked deps whose alias has no prior entry.
    let mut existing_deps: Vec<WantedDependency> = partitioned
        .non_linked
        .into_iter()
        .filter(|dep| {
            !project
                .wanted_dependencies
                .iter()
                .any(|wanted| wanted.alias == dep.alias)
        })
        .collect();

    if opts.update_to_latest && opts.no_dependency_selectors {
        for dep in &mut existing_deps {
            dep.update_spec = true;
        }
    }

    let wanted_dependencies = if project.manifest.is_none() {
        project
            .wanted_dependencies
            .iter()
            .cloned()
            .chain(existing_deps)
            .map(|dep| dep.with_update_depth(default_update_depth))
            .collect()
    } else {
        let has_update_matching = project.update_matching.is_some();
        // Direct local tarballs are always checked, so their update depth
        // must be at least 0 — unless an explicit update-matching regime
        // takes precedence.
        let update_local_tarballs = move |dep: WantedDependency| {
            let depth = if has_update_matching || !is_local_tarball(&dep.bare_specifier) {
                default_update_depth
            } else {
                0
            };
            dep.with_update_depth(depth)
        };

        let prior = project.wanted_dependencies.iter().cloned().map(|dep| {
            if default_update_depth < 0 {
                update_local_tarballs(dep)
            } else {
                dep.with_update_depth(default_update_depth)
            }
        });
        let fresh = existing_deps.into_iter().map(|dep| {
            if opts.no_dependency_selectors && has_update_matching {
                update_local_tarballs(dep)
            } else {
                dep.with_update_depth(-1)
            }
        });
        prior.chain(fresh).collect()
    };

    let preferred_versions = opts
        .preferred_versions
        .clone()
        .or_else(|| project.manifest.as_ref().map(get_preferred_versions))
        .unwrap_or_default();

    Ok(ResolveImporter {
        root_dir: project.root_dir,
        modules_dir: project.modules_dir,
        update: project.update,
        update_matching: project.update_matching,
        wanted_dependencies,
        preferred_versions,
        has_removed_dependencies: !project.remove_packages.is_empty(),
    })
}

/// A `file:` reference to a local tarball. Tarball contents can change
/// without a version bump, so these stay eligible for re-inspection.
fn is_local_tarball(bare_specifier: &str) -> bool {
    bare_specifier.starts_with("file:") && bare_specifier.ends_with(".tgz")
}
