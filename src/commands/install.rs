//! Install command implementation.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Log;
use crate::sync::{ChangeSet, Walker};

/// Run the install command and return the set of changed destination
/// paths.
///
/// # Errors
///
/// Returns an error if root resolution, configuration loading, or the
/// synchronization run fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<dyn Log>) -> Result<ChangeSet> {
    let ctx = super::build_context(global, &opts.package, log)?;
    log.info(&format!(
        "syncing {} -> {}",
        ctx.source_root.display(),
        ctx.dest_root.display()
    ));

    let changes = Walker::new(&ctx, false)?.run()?;

    if ctx.dry_run {
        log.info(&format!("{} paths would change", changes.len()));
    } else {
        log.info(&format!("{} paths changed", changes.len()));
    }
    Ok(changes)
}
