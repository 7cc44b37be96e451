use std::path::{Path, PathBuf};

use anyhow::Result;

use super::dir::{DirSync, LinkOutcome};
use super::matcher::PathMatcher;
use super::{ChangeSet, Context, perms, sweep};
use crate::error::{ConfigError, SyncError};

/// Depth-first, pre-order traversal of the package's source tree.
///
/// For each visited directory a [`DirSync`] decides every entry's fate;
/// ignored and linked-as-unit subtrees are pruned from recursion.  After
/// the walk the orphan sweep runs over the visited destination
/// directories, then (unless uninstalling) the permission pass.  The
/// run's sole result besides filesystem side effects is the union set of
/// changed destination paths.
#[derive(Debug)]
pub struct Walker<'a> {
    ctx: &'a Context,
    uninstall: bool,
    src_ignore: PathMatcher,
}

impl<'a> Walker<'a> {
    /// Build a walker, compiling the source-tree ignore rules once.
    ///
    /// # Errors
    ///
    /// Returns an error if an ignore pattern does not compile.
    pub fn new(ctx: &'a Context, uninstall: bool) -> Result<Self, ConfigError> {
        let src_ignore = PathMatcher::new(ctx.config.ignore_rules("src_ignore")?);
        Ok(Self {
            ctx,
            uninstall,
            src_ignore,
        })
    }

    /// Execute the run and return the set of changed destination paths.
    ///
    /// # Errors
    ///
    /// Fatal conditions abort the run: the package directory missing, a
    /// directory listing failing mid-traversal, or a destination conflict.
    pub fn run(&self) -> Result<ChangeSet> {
        if !self.ctx.source_root.is_dir() {
            return Err(SyncError::MissingPackage(self.ctx.source_root.clone()).into());
        }

        let mut changes = ChangeSet::new();
        let mut visited = Vec::new();
        self.walk_dir(Path::new(""), &mut changes, &mut visited)?;

        let sweep_enabled = match self
            .ctx
            .config
            .global()
            .get_bool("remove_broken_dest_links", true)
        {
            Ok(value) => value,
            Err(e) => {
                self.ctx.log.warn(&format!("{e}; sweeping anyway"));
                true
            }
        };
        // The sweep always runs when uninstalling.
        if self.uninstall || sweep_enabled {
            let dst_ignore = PathMatcher::new(self.ctx.config.ignore_rules("dst_ignore")?);
            changes.extend(sweep::sweep_orphans(
                self.ctx,
                &dst_ignore,
                &visited,
                self.uninstall,
            )?);
        }

        if !self.uninstall {
            changes.extend(perms::reconcile_modes(self.ctx)?);
        }

        Ok(changes)
    }

    /// Visit the source directory at `rel`: record its destination
    /// directory for the sweep scope, sync its entries (unless
    /// uninstalling), then recurse into the subdirectories selected for
    /// descent.
    fn walk_dir(
        &self,
        rel: &Path,
        changes: &mut ChangeSet,
        visited: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let sync = DirSync::new(self.ctx, &self.src_ignore, rel);
        visited.push(sync.dest_dir().to_path_buf());

        let source_dir = self.ctx.source_root.join(rel);
        let entries = std::fs::read_dir(&source_dir).map_err(|e| SyncError::ListDir {
            path: source_dir.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SyncError::ListDir {
                path: source_dir.clone(),
                source: e,
            })?;
            let name = entry.file_name();
            // is_dir() follows symlinks, so a source link to a directory
            // is mirrored like a directory.
            if source_dir.join(&name).is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        files.sort();
        dirs.sort();

        // Build the recursion list before descending anywhere.
        let mut descend = Vec::new();
        if self.uninstall {
            // No entries are synced; the walk only collects sweep scope.
            descend = dirs;
        } else {
            for name in &files {
                let (dest, outcome) = sync.sync_entry(name, false)?;
                if outcome == LinkOutcome::Created {
                    changes.insert(dest);
                }
            }
            for name in dirs {
                let (dest, outcome) = sync.sync_entry(&name, true)?;
                match outcome {
                    LinkOutcome::Traverse => descend.push(name),
                    LinkOutcome::Created => {
                        changes.insert(dest);
                    }
                    LinkOutcome::Ignored | LinkOutcome::AlreadyInstalled => {}
                }
            }
        }

        for name in descend {
            self.walk_dir(&rel.join(name), changes, visited)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::logging::Logger;
    use std::sync::Arc;

    struct Fixture {
        _dir: tempfile::TempDir,
        ctx: Context,
    }

    fn fixture(config: &str, dry_run: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source_root = dir.path().join("pkg");
        let dest_root = dir.path().join("target");
        std::fs::create_dir_all(&source_root).unwrap();
        std::fs::create_dir_all(&dest_root).unwrap();
        let config = ConfigStore::parse(config, &Logger::new()).unwrap();
        let ctx = Context::new(
            config,
            Arc::new(Logger::new()),
            dry_run,
            source_root,
            dest_root,
        );
        Fixture { _dir: dir, ctx }
    }

    fn write(f: &Fixture, rel: &str, content: &str) {
        let path = f.ctx.source_root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_package_is_fatal() {
        let f = fixture("", false);
        std::fs::remove_dir(&f.ctx.source_root).unwrap();

        let err = Walker::new(&f.ctx, false).unwrap().run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::MissingPackage(_))
        ));
    }

    #[test]
    fn mirrors_nested_tree_with_relative_links() {
        let f = fixture("", false);
        write(&f, "a.txt", "a");
        write(&f, "etc/app/conf", "c");

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        let file_link = f.ctx.dest_root.join("a.txt");
        let nested_link = f.ctx.dest_root.join("etc/app/conf");
        assert!(changes.contains(&file_link));
        assert!(changes.contains(&nested_link));
        assert_eq!(changes.len(), 2);
        // Directories are mirrored, not linked.
        assert!(f.ctx.dest_root.join("etc").is_dir());
        assert!(
            !f.ctx
                .dest_root
                .join("etc")
                .symlink_metadata()
                .unwrap()
                .file_type()
                .is_symlink()
        );
        assert_eq!(std::fs::read_to_string(&nested_link).unwrap(), "c");
    }

    #[test]
    fn ignored_directory_subtree_is_never_traversed() {
        let f = fixture("[global]\nsrc_ignore = ^/skip\n", false);
        write(&f, "skip/inner/file", "x");
        write(&f, "kept.txt", "x");

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        assert_eq!(changes.len(), 1);
        assert!(f.ctx.dest_root.join("skip").symlink_metadata().is_err());
    }

    #[test]
    fn symlink_dir_links_whole_directory_without_descending() {
        let f = fixture("[path bundle]\nsymlink_dir = yes\n", false);
        write(&f, "bundle/one", "1");
        write(&f, "bundle/two", "2");

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        let unit = f.ctx.dest_root.join("bundle");
        assert_eq!(changes.len(), 1);
        assert!(changes.contains(&unit));
        assert!(unit.symlink_metadata().unwrap().file_type().is_symlink());
        // Contents are reachable through the unit link, not linked one by one.
        assert_eq!(std::fs::read_to_string(unit.join("one")).unwrap(), "1");
    }

    #[test]
    fn second_run_changes_nothing() {
        let f = fixture("", false);
        write(&f, "a.txt", "a");
        write(&f, "etc/conf", "c");

        let first = Walker::new(&f.ctx, false).unwrap().run().unwrap();
        assert_eq!(first.len(), 2);

        let second = Walker::new(&f.ctx, false).unwrap().run().unwrap();
        assert!(second.is_empty(), "re-sync must be idempotent: {second:?}");
    }

    #[test]
    fn conflict_aborts_the_run() {
        let f = fixture("", false);
        write(&f, "a.txt", "a");
        std::fs::write(f.ctx.dest_root.join("a.txt"), "unrelated").unwrap();

        let err = Walker::new(&f.ctx, false).unwrap().run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Conflict { .. })
        ));
    }

    #[test]
    fn sweep_removes_dangling_link_in_visited_directory() {
        let f = fixture("", false);
        write(&f, "etc/conf", "c");
        std::fs::create_dir_all(f.ctx.dest_root.join("etc")).unwrap();
        let stale = f.ctx.dest_root.join("etc/gone");
        std::os::unix::fs::symlink("../../pkg/etc/gone", &stale).unwrap();

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        assert!(changes.contains(&stale));
        assert!(stale.symlink_metadata().is_err());
    }

    #[test]
    fn sweep_can_be_disabled_for_install() {
        let f = fixture("[global]\nremove_broken_dest_links = no\n", false);
        write(&f, "a.txt", "a");
        let stale = f.ctx.dest_root.join("gone");
        std::os::unix::fs::symlink("../pkg/gone", &stale).unwrap();

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        assert!(!changes.contains(&stale));
        assert!(stale.symlink_metadata().is_ok());
    }

    #[test]
    fn uninstall_ignores_the_disable_flag() {
        let f = fixture("[global]\nremove_broken_dest_links = no\n", false);
        write(&f, "a.txt", "a");
        Walker::new(&f.ctx, false).unwrap().run().unwrap();

        let removed = Walker::new(&f.ctx, true).unwrap().run().unwrap();
        assert!(removed.contains(&f.ctx.dest_root.join("a.txt")));
    }

    #[test]
    fn uninstall_removes_only_our_links() {
        let f = fixture("", false);
        write(&f, "a.txt", "a");
        write(&f, "etc/conf", "c");
        let installed = Walker::new(&f.ctx, false).unwrap().run().unwrap();
        assert_eq!(installed.len(), 2);

        // A foreign link and a plain file in the same tree survive.
        let foreign = f.ctx.dest_root.join("foreign");
        std::os::unix::fs::symlink("/somewhere/else", &foreign).unwrap();
        std::fs::write(f.ctx.dest_root.join("plain.txt"), "keep").unwrap();

        let removed = Walker::new(&f.ctx, true).unwrap().run().unwrap();

        assert_eq!(removed, installed);
        assert!(f.ctx.dest_root.join("a.txt").symlink_metadata().is_err());
        assert!(foreign.symlink_metadata().is_ok());
        assert!(f.ctx.dest_root.join("plain.txt").exists());
    }

    #[test]
    fn dry_run_produces_same_changes_without_mutation() {
        let f = fixture("[path etc]\nmode = 0750\n", true);
        write(&f, "a.txt", "a");
        write(&f, "etc/conf", "c");

        let preview = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        assert!(preview.contains(&f.ctx.dest_root.join("a.txt")));
        assert!(preview.contains(&f.ctx.dest_root.join("etc/conf")));
        assert!(
            f.ctx.dest_root.join("a.txt").symlink_metadata().is_err(),
            "dry-run must not create links"
        );
        assert!(f.ctx.dest_root.join("etc").symlink_metadata().is_err());
    }

    #[test]
    fn permission_pass_runs_after_install() {
        use std::os::unix::fs::PermissionsExt as _;

        let f = fixture("[path etc]\nmode = 0700\n", false);
        write(&f, "etc/conf", "c");

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        let etc = f.ctx.dest_root.join("etc");
        assert!(changes.contains(&etc));
        let mode = std::fs::metadata(&etc).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn source_ignore_applies_to_files_and_directories() {
        let f = fixture("[global]\nsrc_ignore =\n    b\\.txt$\n    ^/secret\n", false);
        write(&f, "a.txt", "a");
        write(&f, "b.txt", "b");
        write(&f, "secret/key", "k");

        let changes = Walker::new(&f.ctx, false).unwrap().run().unwrap();

        assert_eq!(changes.len(), 1);
        assert!(f.ctx.dest_root.join("b.txt").symlink_metadata().is_err());
        assert!(f.ctx.dest_root.join("secret").symlink_metadata().is_err());
    }
}
