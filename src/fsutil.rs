//! POSIX filesystem and path helpers shared by the synchronizer.
use anyhow::{Context as _, Result};
use std::path::{Component, Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether two stat results refer to the same underlying file.
///
/// Compares device and inode numbers, so a symlink chain that resolves to
/// the file, a hard link to it, and the file itself all count as the same.
#[must_use]
pub fn is_same(a: &std::fs::Metadata, b: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt as _;
    a.dev() == b.dev() && a.ino() == b.ino()
}

/// Lexically normalize a path: drop `.` components and resolve `..`
/// against preceding normal components, without touching the filesystem.
///
/// `..` at the root of an absolute path is dropped (`/..` is `/`); leading
/// `..` components of a relative path are kept.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Compute the relative path that reaches `target` from the directory
/// `base`.  Both paths must be absolute and lexically normalized.
///
/// Used to build relocation-safe link targets: a link created from this
/// offset stays valid if the source and destination trees move together.
#[must_use]
pub fn relative_from(target: &Path, base: &Path) -> PathBuf {
    let mut target_parts = target.components().peekable();
    let mut base_parts = base.components().peekable();
    while let (Some(t), Some(b)) = (target_parts.peek(), base_parts.peek()) {
        if t == b {
            target_parts.next();
            base_parts.next();
        } else {
            break;
        }
    }
    let mut out = PathBuf::new();
    for _ in base_parts {
        out.push("..");
    }
    for component in target_parts {
        out.push(component.as_os_str());
    }
    out
}

/// Make `path` absolute against the current working directory and
/// lexically normalize it.  The path does not need to exist.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(normalize(&cwd.join(path)))
}
