use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: resolve `.` and `..` components without
/// touching the filesystem.
///
/// `..` at the root is dropped rather than preserved, which is the right
/// behavior for containment checks on absolute paths.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // pop() refuses to remove the root, which keeps "/.." at "/"
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Check whether `path` is located inside `base` (or is `base` itself).
///
/// Both paths are normalized lexically first; no symlinks are followed.
#[must_use]
pub fn is_within(base: &Path, path: &Path) -> bool {
    let base = normalize(base);
    let path = normalize(path);
    path.starts_with(&base)
}

/// Resolve a symlink target to an absolute path.
///
/// Relative targets are interpreted relative to the directory containing the
/// link, which is how the OS resolves them.
#[must_use]
pub fn resolve_link_target(link_path: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        normalize(target)
    } else {
        let parent = link_path.parent().unwrap_or(Path::new("."));
        normalize(&parent.join(target))
    }
}
