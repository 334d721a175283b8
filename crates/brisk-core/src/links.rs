//! Link classification for wanted dependencies.
//!
//! Before anything is sent to version resolution, each wanted dependency is
//! checked against the project's modules directory: a dependency whose alias
//! already resolves to a filesystem link *outside* the managed virtual store
//! is considered satisfied by that link and excluded from resolution work.
//! Links *inside* the virtual store (and missing entries) go through normal
//! resolution.
//!
//! Probes are read-only filesystem operations and run concurrently, one
//! in-flight probe per dependency, merged at a join barrier. Unexpected I/O
//! failures abort planning; "no link found" is a normal outcome.

use crate::error::PlanError;
use crate::wanted::WantedDependency;
use crate::workspaces::WorkspacePackages;
use brisk_util::paths::{is_within, resolve_link_target};
use futures::future;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of probing a modules-directory entry for one alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// No entry exists for the alias.
    NotFound,
    /// The entry links into the manager's own virtual store.
    Inner,
    /// The entry links outside the managed area; the resolved target path.
    External(PathBuf),
}

/// Options for a single link probe.
#[derive(Debug, Clone, Copy)]
pub struct InnerLinkOptions<'a> {
    pub project_dir: &'a Path,
    pub virtual_store_dir: &'a Path,
    /// Treat a plain (non-symlink) directory under the alias as absent
    /// instead of as manager-controlled state.
    pub hide_alien_modules: bool,
}

/// Probe whether `alias` resolves through the modules directory to an inner
/// link.
///
/// # Errors
/// Returns [`PlanError::LinkProbe`] on any I/O failure other than the entry
/// simply not existing.
pub async fn safe_is_inner_link(
    modules_dir: &Path,
    alias: &str,
    opts: &InnerLinkOptions<'_>,
) -> Result<LinkStatus, PlanError> {
    let link_path = modules_dir.join(alias);

    let metadata = match tokio::fs::symlink_metadata(&link_path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LinkStatus::NotFound),
        Err(e) => return Err(PlanError::link_probe(alias, modules_dir, e)),
    };

    if !metadata.file_type().is_symlink() {
        // Something other than a link occupies the alias. When alien modules
        // are hidden this counts as absent; otherwise it is treated as
        // manager-controlled state and resolved normally.
        return Ok(if opts.hide_alien_modules {
            LinkStatus::NotFound
        } else {
            LinkStatus::Inner
        });
    }

    let target = tokio::fs::read_link(&link_path)
        .await
        .map_err(|e| PlanError::link_probe(alias, modules_dir, e))?;
    let resolved = resolve_link_target(&link_path, &target);

    if is_within(opts.virtual_store_dir, &resolved) {
        Ok(LinkStatus::Inner)
    } else {
        Ok(LinkStatus::External(resolved))
    }
}

/// Options for partitioning a project's wanted dependencies.
#[derive(Debug, Clone, Copy)]
pub struct PartitionOptions<'a> {
    pub project_dir: &'a Path,
    pub modules_dir: &'a Path,
    pub virtual_store_dir: &'a Path,
    pub workspace_packages: &'a WorkspacePackages,
    /// Lockfile-only runs leave alien modules alone, so they are not hidden.
    pub lockfile_only: bool,
}

/// Result of link classification: the working set that still needs version
/// resolution, and the aliases satisfied by existing external links.
#[derive(Debug, Default)]
pub struct PartitionedDependencies {
    pub non_linked: Vec<WantedDependency>,
    pub linked_aliases: HashSet<String>,
}

enum Classified {
    NonLinked(WantedDependency),
    Linked(String),
}

async fn classify_dependency(
    dependency: WantedDependency,
    opts: &PartitionOptions<'_>,
    probe_opts: &InnerLinkOptions<'_>,
) -> Result<Classified, PlanError> {
    if dependency.alias.is_empty()
        || opts.workspace_packages.contains(&dependency.alias)
        || dependency.bare_specifier.starts_with("workspace:")
    {
        return Ok(Classified::NonLinked(dependency));
    }

    match safe_is_inner_link(opts.modules_dir, &dependency.alias, probe_opts).await? {
        LinkStatus::NotFound | LinkStatus::Inner => Ok(Classified::NonLinked(dependency)),
        LinkStatus::External(target) => {
            if !dependency.bare_specifier.starts_with("link:") {
                info!(
                    alias = %dependency.alias,
                    target = %target.display(),
                    project_dir = %opts.project_dir.display(),
                    "dependency is satisfied by an existing link, skipping resolution"
                );
            }
            Ok(Classified::Linked(dependency.alias))
        }
    }
}

/// Partition wanted dependencies into non-linked and linked sets.
///
/// Unaliased dependencies, workspace packages, and `workspace:` specifiers
/// skip probing entirely: they go through normal resolution, where workspace
/// handling happens downstream. Everything else is probed concurrently.
///
/// # Errors
/// Propagates the first probe failure; no partial result is produced.
pub async fn partition_linked_packages(
    dependencies: Vec<WantedDependency>,
    opts: &PartitionOptions<'_>,
) -> Result<PartitionedDependencies, PlanError> {
    let probe_opts = InnerLinkOptions {
        project_dir: opts.project_dir,
        virtual_store_dir: opts.virtual_store_dir,
        hide_alien_modules: !opts.lockfile_only,
    };

    let checks = dependencies
        .into_iter()
        .map(|dependency| classify_dependency(dependency, opts, &probe_opts));

    // Fan out, then merge at the join: the output sets are unordered by
    // identity, entries are looked up by alias downstream.
    let classified = future::try_join_all(checks).await?;

    let mut partitioned = PartitionedDependencies::default();
    for entry in classified {
        match entry {
            Classified::NonLinked(dependency) => partitioned.non_linked.push(dependency),
            Classified::Linked(alias) => {
                partitioned.linked_aliases.insert(alias);
            }
        }
    }
    Ok(partitioned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspaces::WorkspacePackage;
    use std::fs;
    use tempfile::tempdir;

    fn probe_opts<'a>(project_dir: &'a Path, store: &'a Path) -> InnerLinkOptions<'a> {
        InnerLinkOptions {
            project_dir,
            virtual_store_dir: store,
            hide_alien_modules: true,
        }
    }

    #[tokio::test]
    async fn test_probe_missing_entry() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let status = safe_is_inner_link(
            &modules,
            "react",
            &probe_opts(project.path(), store.path()),
        )
        .await
        .unwrap();

        assert_eq!(status, LinkStatus::NotFound);
    }

    #[tokio::test]
    async fn test_probe_missing_modules_dir_is_not_found() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");

        let status = safe_is_inner_link(
            &modules,
            "react",
            &probe_opts(project.path(), store.path()),
        )
        .await
        .unwrap();

        assert_eq!(status, LinkStatus::NotFound);
    }

    #[tokio::test]
    async fn test_probe_alien_dir_hidden() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(modules.join("react")).unwrap();

        let status = safe_is_inner_link(
            &modules,
            "react",
            &probe_opts(project.path(), store.path()),
        )
        .await
        .unwrap();

        assert_eq!(status, LinkStatus::NotFound);
    }

    #[tokio::test]
    async fn test_probe_alien_dir_kept_when_not_hidden() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(modules.join("react")).unwrap();

        let opts = InnerLinkOptions {
            hide_alien_modules: false,
            ..probe_opts(project.path(), store.path())
        };
        let status = safe_is_inner_link(&modules, "react", &opts).await.unwrap();

        assert_eq!(status, LinkStatus::Inner);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_inner_link() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let store_pkg = store.path().join("react@18.2.0").join("node_modules").join("react");
        fs::create_dir_all(&store_pkg).unwrap();
        std::os::unix::fs::symlink(&store_pkg, modules.join("react")).unwrap();

        let status = safe_is_inner_link(
            &modules,
            "react",
            &probe_opts(project.path(), store.path()),
        )
        .await
        .unwrap();

        assert_eq!(status, LinkStatus::Inner);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_external_link() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let external = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let target = external.path().join("my-lib");
        fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&target, modules.join("my-lib")).unwrap();

        let status = safe_is_inner_link(
            &modules,
            "my-lib",
            &probe_opts(project.path(), store.path()),
        )
        .await
        .unwrap();

        match status {
            LinkStatus::External(path) => assert!(path.ends_with("my-lib")),
            other => panic!("expected external link, got {other:?}"),
        }
    }

    fn partition_opts<'a>(
        project_dir: &'a Path,
        modules_dir: &'a Path,
        store: &'a Path,
        workspace_packages: &'a WorkspacePackages,
    ) -> PartitionOptions<'a> {
        PartitionOptions {
            project_dir,
            modules_dir,
            virtual_store_dir: store,
            workspace_packages,
            lockfile_only: false,
        }
    }

    #[tokio::test]
    async fn test_partition_no_links() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        let workspace = WorkspacePackages::new();

        let deps = vec![
            WantedDependency::new("react", "^18.0.0"),
            WantedDependency::new("lodash", "^4.0.0"),
        ];
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .await
        .unwrap();

        assert_eq!(partitioned.non_linked.len(), 2);
        assert!(partitioned.linked_aliases.is_empty());
    }

    #[tokio::test]
    async fn test_partition_workspace_member_skips_probe() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        // Modules dir deliberately absent: if the workspace member were
        // probed, classification would still succeed, but an alien dir
        // at its alias must not matter either.
        let modules = project.path().join("node_modules");

        let mut workspace = WorkspacePackages::new();
        workspace.insert(WorkspacePackage {
            name: "@myorg/my-lib".to_string(),
            version: "1.0.0".to_string(),
            dir: project.path().join("packages").join("my-lib"),
        });

        let deps = vec![
            WantedDependency::new("@myorg/my-lib", "workspace:^"),
            WantedDependency::new("", "file:./vendored.tgz"),
        ];
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .await
        .unwrap();

        assert_eq!(partitioned.non_linked.len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_partition_excludes_external_link() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let external = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let target = external.path().join("my-lib");
        fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&target, modules.join("my-lib")).unwrap();

        let workspace = WorkspacePackages::new();
        let deps = vec![
            WantedDependency::new("my-lib", "^1.0.0"),
            WantedDependency::new("react", "^18.0.0"),
        ];
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .await
        .unwrap();

        assert_eq!(partitioned.non_linked.len(), 1);
        assert_eq!(partitioned.non_linked[0].alias, "react");
        assert!(partitioned.linked_aliases.contains("my-lib"));
    }

    /// Counts informational events dispatched while a future runs.
    #[cfg(unix)]
    struct InfoCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    #[cfg(unix)]
    impl tracing::Subscriber for InfoCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }
        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &tracing::span::Id) {}
        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_partition_external_link_emits_one_notice() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::instrument::WithSubscriber;

        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let external = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let target = external.path().join("my-lib");
        fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&target, modules.join("my-lib")).unwrap();

        let workspace = WorkspacePackages::new();
        let deps = vec![
            WantedDependency::new("my-lib", "^1.0.0"),
            WantedDependency::new("react", "^18.0.0"),
        ];
        let notices = Arc::new(AtomicUsize::new(0));
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .with_subscriber(InfoCounter(Arc::clone(&notices)))
        .await
        .unwrap();

        assert!(partitioned.linked_aliases.contains("my-lib"));
        assert_eq!(notices.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_partition_link_protocol_emits_no_notice() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::instrument::WithSubscriber;

        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let external = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let target = external.path().join("my-lib");
        fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&target, modules.join("my-lib")).unwrap();

        let workspace = WorkspacePackages::new();
        let deps = vec![WantedDependency::new("my-lib", "link:../my-lib")];
        let notices = Arc::new(AtomicUsize::new(0));
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .with_subscriber(InfoCounter(Arc::clone(&notices)))
        .await
        .unwrap();

        assert!(partitioned.linked_aliases.contains("my-lib"));
        assert_eq!(notices.load(Ordering::SeqCst), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_partition_link_protocol_excluded_silently() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let external = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let target = external.path().join("my-lib");
        fs::create_dir_all(&target).unwrap();
        std::os::unix::fs::symlink(&target, modules.join("my-lib")).unwrap();

        let workspace = WorkspacePackages::new();
        let deps = vec![WantedDependency::new("my-lib", "link:../my-lib")];
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .await
        .unwrap();

        // Still excluded from resolution, just without the notice.
        assert!(partitioned.non_linked.is_empty());
        assert!(partitioned.linked_aliases.contains("my-lib"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_partition_inner_link_stays_in_working_set() {
        let project = tempdir().unwrap();
        let store = tempdir().unwrap();
        let modules = project.path().join("node_modules");
        fs::create_dir_all(&modules).unwrap();

        let store_pkg = store.path().join("react@18.2.0").join("node_modules").join("react");
        fs::create_dir_all(&store_pkg).unwrap();
        std::os::unix::fs::symlink(&store_pkg, modules.join("react")).unwrap();

        let workspace = WorkspacePackages::new();
        let deps = vec![WantedDependency::new("react", "^18.0.0")];
        let partitioned = partition_linked_packages(
            deps,
            &partition_opts(project.path(), &modules, store.path(), &workspace),
        )
        .await
        .unwrap();

        assert_eq!(partitioned.non_linked.len(), 1);
        assert!(partitioned.linked_aliases.is_empty());
    }
}
