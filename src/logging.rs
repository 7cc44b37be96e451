//! Logging sink injected into the synchronizer components.
//!
//! Components receive an explicit [`Log`] trait object instead of calling
//! the global `tracing` macros directly, so verbosity wiring stays at the
//! binary boundary and library code stays silent under test (the `tracing`
//! macros are no-ops when no subscriber is installed).

/// Abstraction over logging backends.
pub trait Log: Send + Sync {
    /// Log an informational message (created links, removed links, mode changes).
    fn info(&self, msg: &str);
    /// Log a debug message (no-op decisions; may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message (misconfigured sections, non-fatal failures).
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a mutation that was suppressed because dry-run is enabled.
    fn dry_run(&self, msg: &str);
}

/// Logger that forwards to the installed [`tracing`] subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Log for Logger {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!("(dry-run) {msg}");
    }
}

/// Install the global subscriber for console output.
///
/// The filter honours the `LNSYNC_LOG` environment variable when set;
/// otherwise `verbose` selects between `debug` and `info`.  Safe to call
/// more than once; only the first call installs a subscriber.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("LNSYNC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_methods_do_not_panic_without_subscriber() {
        let log = Logger::new();
        log.info("info");
        log.debug("debug");
        log.warn("warn");
        log.error("error");
        log.dry_run("dry run");
    }

    #[test]
    fn logger_usable_as_trait_object() {
        let log: &dyn Log = &Logger::new();
        log.info("through the trait");
    }

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
