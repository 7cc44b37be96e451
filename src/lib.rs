//! Declarative symlink tree synchronizer.
//!
//! Mirrors a package's source directory into a destination tree using
//! relative symbolic links, governed by per-path INI configuration:
//! ignore patterns, link-whole-directory overrides, and permission
//! enforcement.  Re-syncing is idempotent, an uninstall mode removes
//! only links pointing back into the source tree, and dry-run previews
//! the exact change set without touching the filesystem.
//!
//! The public API is organised into three layers:
//!
//! - **[`config`]** — parse the per-package-root INI into a typed store
//! - **[`sync`]** — the synchronization engine (walk, link, sweep, chmod)
//! - **[`commands`]** — top-level subcommand orchestration (`install`, `uninstall`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod logging;
pub mod sync;
