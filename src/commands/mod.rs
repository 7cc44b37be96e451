//! Top-level subcommand orchestration.
pub mod install;
pub mod uninstall;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};

use crate::cli::GlobalOpts;
use crate::config::{CONFIG_FILE, ConfigStore};
use crate::fsutil;
use crate::logging::Log;
use crate::sync::Context;

/// Resolve roots, load the per-package-root config and assemble the run
/// context for `package`.
///
/// # Errors
///
/// Returns an error if a root cannot be determined or the config file
/// cannot be parsed.
pub(crate) fn build_context(
    global: &GlobalOpts,
    package: &str,
    log: &Arc<dyn Log>,
) -> Result<Context> {
    let package_root = resolve_package_root(global)?;
    let dest_root = resolve_target(global)?;
    let config = ConfigStore::load(&package_root.join(CONFIG_FILE), log.as_ref())?;
    let source_root = package_root.join(package);
    Ok(Context::new(
        config,
        Arc::clone(log),
        global.dry_run,
        source_root,
        dest_root,
    ))
}

/// Resolve the package root from CLI arguments, the `LNSYNC_ROOT`
/// environment variable, or the current directory.
fn resolve_package_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(root) = &global.package_root {
        return fsutil::absolutize(root);
    }
    if let Ok(root) = std::env::var("LNSYNC_ROOT") {
        return fsutil::absolutize(Path::new(&root));
    }
    std::env::current_dir().context("cannot determine current directory")
}

/// Resolve the target root from CLI arguments or `$HOME`.
fn resolve_target(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(target) = &global.target {
        return fsutil::absolutize(target);
    }
    if let Ok(home) = std::env::var("HOME") {
        return fsutil::absolutize(Path::new(&home));
    }
    bail!("cannot determine target root. Use --target or set HOME");
}
