use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use lnsync::cli::{Cli, Command};
use lnsync::logging::{self, Log, Logger};
use lnsync::{commands, sync};

fn main() -> ExitCode {
    let args = Cli::parse();
    logging::init(args.verbose);
    let log: Arc<dyn Log> = Arc::new(Logger::new());

    let outcome: anyhow::Result<sync::ChangeSet> = match &args.command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Uninstall(opts) => commands::uninstall::run(&args.global, opts, &log),
        Command::Version => {
            let version = option_env!("LNSYNC_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("lnsync {version}");
            return ExitCode::SUCCESS;
        }
    };

    // The exit status encodes only whether anything changed; fatal
    // conditions surface as a plain failure status.
    match outcome {
        Ok(changes) if changes.is_empty() => ExitCode::from(args.global.unchanged_status),
        Ok(_) => ExitCode::from(args.global.changed_status),
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
