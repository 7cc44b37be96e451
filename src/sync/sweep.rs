use std::path::{Path, PathBuf};

use anyhow::Result;

use super::ChangeSet;
use super::context::Context;
use super::matcher::PathMatcher;
use crate::error::SyncError;
use crate::fsutil;

/// Remove stale links from the destination directories visited by the
/// walker, never from the destination tree at large.
///
/// A link is removed only when it resolves into the source tree (it was
/// created by this tool for this package) and either is dangling or
/// `delete_valid` is set (uninstall).  Link targets are resolved one
/// level only: a relative target is resolved against the entry's own
/// directory and lexically normalized, but chains of links are never
/// followed, so a link-to-link chain into the source tree is not
/// recognized as stale.  That narrowing keeps the sweep from reasoning
/// about unrelated trees.
///
/// # Errors
///
/// Fails when a candidate directory cannot be listed.  Individual
/// removal failures are logged and skipped.
pub fn sweep_orphans(
    ctx: &Context,
    dst_ignore: &PathMatcher,
    scope: &[PathBuf],
    delete_valid: bool,
) -> Result<ChangeSet> {
    let mut removed = ChangeSet::new();
    for dir in scope {
        let rel = dir.strip_prefix(&ctx.dest_root).unwrap_or(dir.as_path());
        if dst_ignore.matches_rel(rel) {
            ctx.log
                .debug(&format!("sweep: skipping ignored directory {}", dir.display()));
            continue;
        }
        if !dir.is_dir() {
            continue;
        }
        sweep_dir(ctx, dst_ignore, dir, delete_valid, &mut removed)?;
    }
    Ok(removed)
}

fn sweep_dir(
    ctx: &Context,
    dst_ignore: &PathMatcher,
    dir: &Path,
    delete_valid: bool,
    removed: &mut ChangeSet,
) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| SyncError::ListDir {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::ListDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let rel = path.strip_prefix(&ctx.dest_root).unwrap_or(&path);
        if dst_ignore.matches_rel(rel) {
            continue;
        }
        let Ok(meta) = path.symlink_metadata() else {
            continue;
        };
        if !meta.file_type().is_symlink() {
            continue;
        }
        // exists() follows the link, so a false result means dangling.
        if !delete_valid && path.exists() {
            continue;
        }
        let Ok(target) = std::fs::read_link(&path) else {
            continue;
        };
        let resolved = if target.is_absolute() {
            fsutil::normalize(&target)
        } else {
            fsutil::normalize(&dir.join(target))
        };
        if !resolved.starts_with(&ctx.source_root) || resolved == ctx.source_root {
            ctx.log.debug(&format!(
                "sweep: leaving foreign link {} -> {}",
                path.display(),
                resolved.display()
            ));
            continue;
        }
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would remove link {}", path.display()));
        } else if let Err(e) = std::fs::remove_file(&path) {
            ctx.log
                .warn(&format!("cannot remove link {}: {e}", path.display()));
            continue;
        } else {
            ctx.log.info(&format!("removed link {}", path.display()));
        }
        removed.insert(path);
    }
    Ok(())
}
