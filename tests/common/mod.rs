// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed package root and target tree so
// each integration test can set up an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lnsync::config::{CONFIG_FILE, ConfigStore};
use lnsync::logging::{Log, Logger};
use lnsync::sync::{ChangeSet, Context, Walker};

/// Package name used by every fixture.
pub const PACKAGE: &str = "web";

/// An isolated package root + target tree backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `pkgs/` — the package root (holds `lnsync.ini` when written)
/// - `pkgs/web/` — the package's source tree
/// - `target/` — the destination tree links are installed into
///
/// The directory is automatically deleted when dropped.
pub struct SyncFixture {
    /// Temporary directory containing the whole layout.
    pub dir: tempfile::TempDir,
}

impl SyncFixture {
    /// Create a fixture with an empty package and an empty target.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("pkgs").join(PACKAGE))
            .expect("create package dir");
        std::fs::create_dir_all(dir.path().join("target")).expect("create target dir");
        Self { dir }
    }

    /// The package root directory.
    pub fn package_root(&self) -> PathBuf {
        self.dir.path().join("pkgs")
    }

    /// The package's source tree.
    pub fn source_root(&self) -> PathBuf {
        self.package_root().join(PACKAGE)
    }

    /// The destination tree.
    pub fn target(&self) -> PathBuf {
        self.dir.path().join("target")
    }

    /// Write `lnsync.ini` at the package root.
    pub fn write_config(&self, content: &str) {
        std::fs::write(self.package_root().join(CONFIG_FILE), content)
            .expect("write config file");
    }

    /// Write a file inside the package's source tree, creating parents.
    pub fn write_source(&self, rel: &str, content: &str) {
        let path = self.source_root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create source parents");
        }
        std::fs::write(path, content).expect("write source file");
    }

    /// Create a (possibly empty) directory inside the source tree.
    pub fn make_source_dir(&self, rel: &str) {
        std::fs::create_dir_all(self.source_root().join(rel)).expect("create source dir");
    }

    /// Build a run context from the on-disk config.
    pub fn context(&self, dry_run: bool) -> Context {
        let log: Arc<dyn Log> = Arc::new(Logger::new());
        let config = ConfigStore::load(&self.package_root().join(CONFIG_FILE), log.as_ref())
            .expect("load config");
        Context::new(config, log, dry_run, self.source_root(), self.target())
    }

    /// Run a full sync into the target.
    pub fn install(&self) -> anyhow::Result<ChangeSet> {
        run(&self.context(false), false)
    }

    /// Run a dry-run sync.
    pub fn install_dry(&self) -> anyhow::Result<ChangeSet> {
        run(&self.context(true), false)
    }

    /// Run an uninstall against the target.
    pub fn uninstall(&self) -> anyhow::Result<ChangeSet> {
        run(&self.context(false), true)
    }

    /// Run a dry-run uninstall.
    pub fn uninstall_dry(&self) -> anyhow::Result<ChangeSet> {
        run(&self.context(true), true)
    }
}

fn run(ctx: &Context, uninstall: bool) -> anyhow::Result<ChangeSet> {
    Ok(Walker::new(ctx, uninstall)?.run()?)
}

/// Recursively describe a tree as sorted `"rel kind"` lines, where kind
/// is `dir`, `file:<content>`, or `link:<target>`.  Used to assert that
/// dry-run leaves the filesystem untouched.
pub fn snapshot(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect(root, root, &mut out);
    out.sort();
    out
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in std::fs::read_dir(dir).expect("read_dir in snapshot") {
        let entry = entry.expect("entry in snapshot");
        let path = entry.path();
        let rel = path
            .strip_prefix(root)
            .expect("entry below root")
            .display()
            .to_string();
        let meta = path.symlink_metadata().expect("symlink_metadata in snapshot");
        if meta.file_type().is_symlink() {
            let target = std::fs::read_link(&path).expect("read_link in snapshot");
            out.push(format!("{rel} link:{}", target.display()));
        } else if meta.is_dir() {
            out.push(format!("{rel} dir"));
            collect(root, &path, out);
        } else {
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            out.push(format!("{rel} file:{content}"));
        }
    }
}
