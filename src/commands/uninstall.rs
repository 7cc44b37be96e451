//! Uninstall command implementation.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Log;
use crate::sync::{ChangeSet, Walker};

/// Run the uninstall command: remove the links under the target that
/// point back into the package's source tree.  Returns the set of
/// removed destination paths.
///
/// # Errors
///
/// Returns an error if root resolution, configuration loading, or the
/// synchronization run fails.
pub fn run(global: &GlobalOpts, opts: &UninstallOpts, log: &Arc<dyn Log>) -> Result<ChangeSet> {
    let ctx = super::build_context(global, &opts.package, log)?;
    log.info(&format!(
        "removing links under {} into {}",
        ctx.dest_root.display(),
        ctx.source_root.display()
    ));

    let changes = Walker::new(&ctx, true)?.run()?;

    if ctx.dry_run {
        log.info(&format!("{} links would be removed", changes.len()));
    } else {
        log.info(&format!("{} links removed", changes.len()));
    }
    Ok(changes)
}
