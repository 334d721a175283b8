#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Resolution-preparation core for brisk.
//!
//! Provides utilities for:
//! - Classifying version specifiers (version / range / dist-tag)
//! - Deriving wanted dependencies from a project manifest
//! - Deriving preferred-version hints for workspace consistency
//! - Classifying dependencies satisfied by existing filesystem links
//! - Planning the per-importer input to the graph-resolution engine

pub mod error;
pub mod links;
pub mod manifest;
pub mod peers;
pub mod planner;
pub mod preferred;
pub mod selector;
pub mod wanted;
pub mod workspaces;

pub use error::{codes as plan_codes, PlanError};
pub use links::{
    partition_linked_packages, safe_is_inner_link, InnerLinkOptions, LinkStatus,
    PartitionOptions, PartitionedDependencies,
};
pub use manifest::{Dependencies, PeerDependencyMeta, ProjectManifest};
pub use peers::validate_peer_dependencies;
pub use planner::{to_resolve_importer, Importer, ResolveImporter, ResolveImporterOptions};
pub use preferred::{get_preferred_versions, version_specs_by_real_names, PreferredVersions};
pub use selector::{parse_version_selector, SelectorKind, VersionSelector};
pub use wanted::{get_wanted_dependencies, WantedDependency};
pub use workspaces::{discover_workspace_packages, WorkspacePackage, WorkspacePackages};
