use anyhow::{Context as _, Result};

use super::ChangeSet;
use super::context::Context;

/// Apply configured permission bits to destination paths after a sync.
///
/// Every `[path <rel>]` section declaring a `mode` option is visited in
/// file order.  Sections naming an absolute path are rejected so the
/// pass cannot act outside the destination root; a path that cannot be
/// stat'ed is skipped (it typically was never installed, e.g. ignored).
/// Changed paths are recorded even under dry-run, reporting intent while
/// the chmod itself is suppressed.
///
/// # Errors
///
/// Fails when applying a mode change fails.  Misconfigured sections and
/// stat failures are logged and skipped.
pub fn reconcile_modes(ctx: &Context) -> Result<ChangeSet> {
    use std::os::unix::fs::PermissionsExt as _;

    let mut changed = ChangeSet::new();
    for section in ctx.config.path_sections() {
        if section.options.get("mode").is_none() {
            continue;
        }
        if section.rel.is_absolute() {
            ctx.log.warn(&format!(
                "mode for absolute path {} ignored; only paths below the target root may be configured",
                section.rel.display()
            ));
            continue;
        }
        let mode = match section.options.get_int("mode") {
            Ok(value) => value,
            Err(e) => {
                ctx.log.warn(&format!("{e}; skipping"));
                continue;
            }
        };
        let Some(mode) = u32::try_from(mode).ok().filter(|m| *m <= 0o7777) else {
            ctx.log.warn(&format!(
                "mode {mode:#o} for {} is out of range; skipping",
                section.rel.display()
            ));
            continue;
        };

        let dest = ctx.dest_root.join(&section.rel);
        let meta = match std::fs::metadata(&dest) {
            Ok(meta) => meta,
            Err(e) => {
                ctx.log
                    .debug(&format!("skipping mode for {}: {e}", dest.display()));
                continue;
            }
        };
        let current = meta.permissions().mode() & 0o7777;
        if current == mode {
            ctx.log.debug(&format!(
                "mode already {current:04o}: {}",
                dest.display()
            ));
            continue;
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would chmod {mode:04o} {} (currently {current:04o})",
                dest.display()
            ));
        } else {
            std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("chmod {mode:04o} {}", dest.display()))?;
            ctx.log
                .info(&format!("chmod {mode:04o} {}", dest.display()));
        }
        changed.insert(dest);
    }
    Ok(changed)
}
