//! Structural validation of peer dependency declarations.

use crate::error::PlanError;
use crate::planner::Importer;

/// Validate the peer dependency declarations of an importer's manifest.
///
/// Checked shapes: empty peer names, empty peer specifiers, and
/// `peerDependenciesMeta` entries naming packages that are not declared
/// under `peerDependencies`. A virtual importer (no manifest) has nothing
/// to validate.
///
/// # Errors
/// Returns [`PlanError::PeerDependencyInvalid`] on the first violation;
/// planning for this importer must not continue.
pub fn validate_peer_dependencies(importer: &Importer) -> Result<(), PlanError> {
    let Some(manifest) = &importer.manifest else {
        return Ok(());
    };

    for (name, specifier) in &manifest.peer_dependencies {
        if name.trim().is_empty() {
            return Err(PlanError::peer_dep_invalid(
                name.clone(),
                &importer.root_dir,
                "peer dependency name is empty",
            ));
        }
        if specifier.trim().is_empty() {
            return Err(PlanError::peer_dep_invalid(
                name.clone(),
                &importer.root_dir,
                "peer dependency specifier is empty",
            ));
        }
    }

    for name in manifest.peer_dependencies_meta.keys() {
        if !manifest.peer_dependencies.contains_key(name) {
            return Err(PlanError::peer_dep_invalid(
                name.clone(),
                &importer.root_dir,
                "peerDependenciesMeta entry has no matching peerDependencies declaration",
            ));
        }
    }

    Ok(())
}
