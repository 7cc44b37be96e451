use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::fsutil;
use crate::logging::Log;

/// Shared, read-only context for one synchronization run.
pub struct Context {
    /// Configuration loaded from the package root's INI file.
    pub config: ConfigStore,
    /// Injected logging sink.
    pub log: Arc<dyn Log>,
    /// Whether to preview changes without applying them.
    pub dry_run: bool,
    /// Absolute, normalized root of the package's source tree.
    pub source_root: PathBuf,
    /// Absolute, normalized root of the destination tree.
    pub dest_root: PathBuf,
}

impl Context {
    /// Create a run context.  Both roots are lexically normalized; they
    /// are expected to be absolute already (see [`fsutil::absolutize`]).
    #[must_use]
    pub fn new(
        config: ConfigStore,
        log: Arc<dyn Log>,
        dry_run: bool,
        source_root: PathBuf,
        dest_root: PathBuf,
    ) -> Self {
        Self {
            config,
            log,
            dry_run,
            source_root: fsutil::normalize(&source_root),
            dest_root: fsutil::normalize(&dest_root),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("source_root", &self.source_root)
            .field("dest_root", &self.dest_root)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use std::path::Path;

    #[test]
    fn new_normalizes_roots() {
        let ctx = Context::new(
            ConfigStore::default(),
            Arc::new(Logger::new()),
            false,
            PathBuf::from("/srv/./pkgs/web"),
            PathBuf::from("/etc/app/../app"),
        );
        assert_eq!(ctx.source_root, Path::new("/srv/pkgs/web"));
        assert_eq!(ctx.dest_root, Path::new("/etc/app"));
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = Context::new(
            ConfigStore::default(),
            Arc::new(Logger::new()),
            true,
            PathBuf::from("/a"),
            PathBuf::from("/b"),
        );
        let debug = format!("{ctx:?}");
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("source_root"));
    }
}
