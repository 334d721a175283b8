//! Resolution-planning error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stable machine-readable error codes.
pub mod codes {
    pub const PEER_DEP_INVALID: &str = "PEER_DEP_INVALID";
    pub const LINK_PROBE_FAILED: &str = "LINK_PROBE_FAILED";
}

/// Error raised while preparing an importer for resolution.
///
/// Every variant is fatal for the planning call that produced it: a peer
/// declaration problem aborts that importer, a probe failure aborts the run.
/// "No link found" is a normal probe outcome, never an error.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A peer dependency declaration is structurally invalid.
    #[error("invalid peer dependency '{name}' in {}: {reason}", .project_dir.display())]
    PeerDependencyInvalid {
        name: String,
        project_dir: PathBuf,
        reason: String,
    },

    /// A link probe failed with an unexpected I/O error.
    #[error("failed to probe link for '{alias}' in {}: {source}", .modules_dir.display())]
    LinkProbe {
        alias: String,
        modules_dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PlanError {
    /// Get the stable error code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PeerDependencyInvalid { .. } => codes::PEER_DEP_INVALID,
            Self::LinkProbe { .. } => codes::LINK_PROBE_FAILED,
        }
    }

    pub(crate) fn peer_dep_invalid(
        name: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PeerDependencyInvalid {
            name: name.into(),
            project_dir: project_dir.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn link_probe(
        alias: impl Into<String>,
        modules_dir: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::LinkProbe {
            alias: alias.into(),
            modules_dir: modules_dir.into(),
            source,
        }
    }
}
