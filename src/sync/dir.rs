use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::context::Context;
use super::matcher::PathMatcher;
use crate::error::SyncError;
use crate::fsutil;

/// Decision taken for one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// No link is made; the caller must descend into the directory.
    Traverse,
    /// A source ignore rule matched; the entry (and any subtree) is skipped.
    Ignored,
    /// The destination already refers to the source entry; nothing to do.
    AlreadyInstalled,
    /// A relative symlink was created (or would be, under dry-run).
    Created,
}

/// Per-directory synchronization unit.
///
/// Constructed fresh for each visited source directory and read-only
/// afterwards.  Holds the directory's mapping into the destination tree
/// and the relative offset from the destination directory back to the
/// source directory, from which relocation-safe link targets are built.
#[derive(Debug)]
pub struct DirSync<'a> {
    ctx: &'a Context,
    src_ignore: &'a PathMatcher,
    source_dir: PathBuf,
    rel: PathBuf,
    dest_dir: PathBuf,
    back_offset: PathBuf,
}

impl<'a> DirSync<'a> {
    /// Build the unit for the source directory at `rel` below the source
    /// root (empty for the root itself).
    #[must_use]
    pub fn new(ctx: &'a Context, src_ignore: &'a PathMatcher, rel: &Path) -> Self {
        let source_dir = fsutil::normalize(&ctx.source_root.join(rel));
        let dest_dir = fsutil::normalize(&ctx.dest_root.join(rel));
        let back_offset = fsutil::relative_from(&source_dir, &dest_dir);
        Self {
            ctx,
            src_ignore,
            source_dir,
            rel: rel.to_path_buf(),
            dest_dir,
            back_offset,
        }
    }

    /// The mapped destination directory for this source directory.
    #[must_use]
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Decide and, when appropriate, install the link for one entry of
    /// this directory.  Returns the entry's destination path and the
    /// decision taken.
    ///
    /// # Errors
    ///
    /// Fails with [`SyncError::Conflict`] when the destination exists and
    /// is not the same underlying file as the source entry, and with an
    /// I/O error when stat or link creation fails.  Existing unrelated
    /// filesystem objects are never replaced.
    pub fn sync_entry(&self, name: &OsStr, is_dir: bool) -> Result<(PathBuf, LinkOutcome)> {
        let source = self.source_dir.join(name);
        let dest = self.dest_dir.join(name);
        let rel_entry = self.rel.join(name);

        if self.src_ignore.matches_rel(&rel_entry) {
            self.ctx
                .log
                .debug(&format!("ignoring source entry {}", rel_entry.display()));
            return Ok((dest, LinkOutcome::Ignored));
        }

        if is_dir {
            let link_as_unit = match self.ctx.config.symlink_dir(&rel_entry) {
                Ok(value) => value,
                Err(e) => {
                    self.ctx.log.warn(&format!(
                        "{e}; mirroring {} instead of linking it",
                        rel_entry.display()
                    ));
                    false
                }
            };
            if !link_as_unit {
                return Ok((dest, LinkOutcome::Traverse));
            }
        }

        match std::fs::metadata(&dest) {
            Ok(dest_meta) => {
                let source_meta = std::fs::metadata(&source)
                    .with_context(|| format!("stat {}", source.display()))?;
                if fsutil::is_same(&dest_meta, &source_meta) {
                    self.ctx
                        .log
                        .debug(&format!("already installed: {}", dest.display()));
                    Ok((dest, LinkOutcome::AlreadyInstalled))
                } else {
                    Err(SyncError::Conflict { dest, src: source }.into())
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // A dangling symlink still occupies the destination name.
                if dest.symlink_metadata().is_ok() {
                    return Err(SyncError::Conflict { dest, src: source }.into());
                }
                let link_target = self.back_offset.join(name);
                if self.ctx.dry_run {
                    self.ctx.log.dry_run(&format!(
                        "would link {} -> {}",
                        dest.display(),
                        link_target.display()
                    ));
                } else {
                    fsutil::ensure_parent_dir(&dest)?;
                    std::os::unix::fs::symlink(&link_target, &dest).with_context(|| {
                        format!("create link {} -> {}", dest.display(), link_target.display())
                    })?;
                    self.ctx.log.info(&format!(
                        "link {} -> {}",
                        dest.display(),
                        link_target.display()
                    ));
                }
                Ok((dest, LinkOutcome::Created))
            }
            Err(e) => Err(e).with_context(|| format!("stat {}", dest.display())),
        }
    }
}
