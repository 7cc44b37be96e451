//! Domain-specific error types for the synchronizer.
//!
//! Internal modules return typed errors ([`ConfigError`], [`SyncError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.  Fatal synchronizer
//! conditions (conflicts, unreadable directories, a missing package) are
//! always carried as [`SyncError`] so callers and tests can match on them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from configuration lookup and value parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required option is absent and no default was supplied.
    #[error("missing option '{key}' in section [{section}]")]
    MissingKey {
        /// Section the lookup targeted.
        section: String,
        /// Option name that was requested.
        key: String,
    },

    /// An option value could not be parsed as the requested type.
    #[error("invalid {expected} '{value}' for option '{key}' in section [{section}]")]
    InvalidValue {
        /// Section the lookup targeted.
        section: String,
        /// Option name that was requested.
        key: String,
        /// The raw value as found in the file.
        value: String,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },

    /// An ignore-pattern line failed to compile as a regular expression.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern line as found in the file.
        pattern: String,
        /// Underlying regex compilation error.
        source: regex::Error,
    },
}

/// Fatal conditions that abort a synchronization run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The package directory under the package root does not exist.
    #[error("package directory does not exist: {}", .0.display())]
    MissingPackage(PathBuf),

    /// A directory could not be listed during traversal.  Partial listings
    /// are never treated as safe to reason about, so this aborts the run.
    #[error("cannot list directory {}: {}", .path.display(), .source)]
    ListDir {
        /// Directory whose listing failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A destination path exists and is not the same file as its intended
    /// link target.  The synchronizer never replaces unrelated files.
    #[error(
        "destination {} exists and is not the same file as {}; refusing to replace it",
        .dest.display(),
        .src.display()
    )]
    Conflict {
        /// The occupied destination path.
        dest: PathBuf,
        /// The source entry the destination was supposed to refer to.
        src: PathBuf,
    },
}
