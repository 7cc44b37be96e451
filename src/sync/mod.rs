//! The synchronization engine.
//!
//! A run walks the package's source tree top-down, deciding per entry
//! whether to ignore, descend, or install a relative symlink; stale links
//! are then swept from the visited destination directories and configured
//! permission bits applied.  Everything is synchronous and single-pass:
//! the run either completes or aborts on the first fatal condition.
mod context;
mod dir;
mod matcher;
mod perms;
mod sweep;
mod walker;

use std::collections::BTreeSet;
use std::path::PathBuf;

pub use context::Context;
pub use dir::{DirSync, LinkOutcome};
pub use matcher::PathMatcher;
pub use walker::Walker;

/// Absolute destination paths changed (or, under dry-run, that would
/// change) during a run.  The sole externally observable result besides
/// filesystem side effects.
pub type ChangeSet = BTreeSet<PathBuf>;
